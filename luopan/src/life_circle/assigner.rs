//! Role recommendation with memoization and caller overrides.

use std::collections::HashMap;

use moka::sync::Cache;
use parking_lot::Mutex;

use super::connection::{activate, ActivationError, LifeCircle};
use super::{KeywordSets, PointRole, RoleAssignment, SurveyPoint};

/// Default number of point sets whose recommendations are remembered.
pub const DEFAULT_CACHE_CAPACITY: u64 = 256;

/// Recommend a role for each point from its name.
///
/// Pass one walks the points in input order. A point takes its best-scoring
/// role among those still free, but only when that score is non-zero and
/// strictly beats every other free role; the role then leaves the pool.
/// Pass two hands the remaining roles, in `Home, Work, Leisure` order, to
/// the points pass one left unassigned. With more than three points the
/// surplus stays unassigned.
pub fn recommend_roles(points: &[SurveyPoint], keywords: &KeywordSets) -> RoleAssignment {
    let mut available: Vec<PointRole> = PointRole::ALL.to_vec();
    let mut chosen: Vec<Option<PointRole>> = vec![None; points.len()];

    for (slot, point) in chosen.iter_mut().zip(points) {
        let scores = keywords.score(&point.name);

        let mut ranked: Vec<(PointRole, usize)> =
            available.iter().map(|role| (*role, scores.get(*role))).collect();
        // Stable sort keeps enumeration order among equal scores
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        if let Some(&(best, score)) = ranked.first() {
            let runner_up = ranked.get(1).map_or(0, |(_, s)| *s);
            if score > 0 && score > runner_up {
                *slot = Some(best);
                available.retain(|role| *role != best);
            }
        }
    }

    let mut remaining = available.into_iter();
    for slot in chosen.iter_mut().filter(|slot| slot.is_none()) {
        match remaining.next() {
            Some(role) => *slot = Some(role),
            None => break,
        }
    }

    points
        .iter()
        .zip(chosen)
        .filter_map(|(point, role)| role.map(|role| (point.id.clone(), role)))
        .collect()
}

/// Recommends roles for point sets, remembering results per set of ids.
///
/// The cache is not authoritative: roles set with [`set_override`] are
/// applied on top of every recommendation.
///
/// [`set_override`]: LifeCircleAssigner::set_override
pub struct LifeCircleAssigner {
    keywords: KeywordSets,
    cache: Cache<Vec<String>, RoleAssignment>,
    overrides: Mutex<HashMap<String, PointRole>>,
}

impl std::fmt::Debug for LifeCircleAssigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifeCircleAssigner")
            .field("keywords", &self.keywords)
            .field("cached_sets", &self.cache.entry_count())
            .field("overrides", &self.overrides.lock().len())
            .finish()
    }
}

impl Default for LifeCircleAssigner {
    fn default() -> Self {
        Self::new()
    }
}

impl LifeCircleAssigner {
    /// Create an assigner with the built-in keyword sets.
    pub fn new() -> Self {
        Self::with_keywords(KeywordSets::default())
    }

    /// Create an assigner with custom keyword sets.
    pub fn with_keywords(keywords: KeywordSets) -> Self {
        Self {
            keywords,
            cache: Cache::new(DEFAULT_CACHE_CAPACITY),
            overrides: Mutex::new(HashMap::new()),
        }
    }

    pub fn keywords(&self) -> &KeywordSets {
        &self.keywords
    }

    /// Role assignment for `points`: the (cached) recommendation with caller
    /// overrides applied.
    ///
    /// When an override gives a point a role another point was recommended,
    /// that other point takes over the overridden point's previous role.
    pub fn assignment_for(&self, points: &[SurveyPoint]) -> RoleAssignment {
        let key = cache_key(points);
        let mut assignment = match self.cache.get(&key) {
            Some(cached) => {
                tracing::trace!(points = key.len(), "Life circle: recommendation cache hit");
                cached
            }
            None => {
                let fresh = recommend_roles(points, &self.keywords);
                tracing::debug!(
                    points = key.len(),
                    assigned = fresh.len(),
                    "Life circle: recommended roles"
                );
                self.cache.insert(key, fresh.clone());
                fresh
            }
        };

        let overrides = self.overrides.lock();
        for point in points {
            let Some(&role) = overrides.get(&point.id) else {
                continue;
            };
            let previous = assignment.role_of(&point.id);
            if previous == Some(role) {
                continue;
            }

            let displaced: Vec<String> = assignment
                .iter()
                .filter(|(id, r)| *r == role && *id != point.id && !overrides.contains_key(*id))
                .map(|(id, _)| id.to_string())
                .collect();
            for id in displaced {
                match previous {
                    Some(prev) => assignment.set(id, prev),
                    None => {
                        assignment.remove(&id);
                    }
                }
            }
            assignment.set(point.id.clone(), role);
        }

        assignment
    }

    /// Pin a point to a role, taking precedence over recommendations.
    pub fn set_override(&self, id: impl Into<String>, role: PointRole) {
        let id = id.into();
        tracing::debug!(id = %id, role = %role, "Life circle: role override set");
        self.overrides.lock().insert(id, role);
    }

    /// Remove a point's override.
    pub fn clear_override(&self, id: &str) -> Option<PointRole> {
        self.overrides.lock().remove(id)
    }

    /// Remove all overrides.
    pub fn clear_overrides(&self) {
        self.overrides.lock().clear();
    }

    /// Forget every cached recommendation.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Recommend (or reuse) roles for `points`, apply overrides and activate.
    pub fn activate(&self, points: &[SurveyPoint]) -> Result<LifeCircle, ActivationError> {
        let assignment = self.assignment_for(points);
        activate(points, &assignment)
    }
}

/// Cache key: the sorted set of point ids.
fn cache_key(points: &[SurveyPoint]) -> Vec<String> {
    let mut ids: Vec<String> = points.iter().map(|p| p.id.clone()).collect();
    ids.sort();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    fn point(id: &str, name: &str) -> SurveyPoint {
        SurveyPoint::new(id, name, GeoPoint::new(39.9, 116.4))
    }

    #[test]
    fn test_clear_signals() {
        let points = vec![
            point("p1", "天通苑小区"),
            point("p2", "中关村科技园区"),
            point("p3", "奥林匹克公园"),
        ];
        let assignment = recommend_roles(&points, &KeywordSets::default());
        assert_eq!(assignment.role_of("p1"), Some(PointRole::Home));
        assert_eq!(assignment.role_of("p2"), Some(PointRole::Work));
        assert_eq!(assignment.role_of("p3"), Some(PointRole::Leisure));
    }

    #[test]
    fn test_no_signal_falls_back_to_enumeration_order() {
        let points = vec![point("x", "甲"), point("y", "乙"), point("z", "丙")];
        let assignment = recommend_roles(&points, &KeywordSets::default());
        assert_eq!(assignment.role_of("x"), Some(PointRole::Home));
        assert_eq!(assignment.role_of("y"), Some(PointRole::Work));
        assert_eq!(assignment.role_of("z"), Some(PointRole::Leisure));
    }

    #[test]
    fn test_tie_is_not_assigned_in_first_pass() {
        // "office park": work 1, leisure 1 -> ambiguous; later points decide
        let points = vec![point("a", "office park"), point("b", "my home"), point("c", "gym")];
        let assignment = recommend_roles(&points, &KeywordSets::default());
        assert_eq!(assignment.role_of("b"), Some(PointRole::Home));
        assert_eq!(assignment.role_of("c"), Some(PointRole::Leisure));
        assert_eq!(assignment.role_of("a"), Some(PointRole::Work));
    }

    #[test]
    fn test_taken_role_is_not_reassigned() {
        // Both look like homes; the second falls back to the next free role
        let points = vec![point("a", "阳光小区"), point("b", "幸福家园"), point("c", "无名")];
        let assignment = recommend_roles(&points, &KeywordSets::default());
        assert_eq!(assignment.role_of("a"), Some(PointRole::Home));
        assert_eq!(assignment.role_of("b"), Some(PointRole::Work));
        assert_eq!(assignment.role_of("c"), Some(PointRole::Leisure));
    }

    #[test]
    fn test_two_points_leave_one_role_free() {
        let points = vec![point("a", "咖啡馆"), point("b", "无名")];
        let assignment = recommend_roles(&points, &KeywordSets::default());
        assert_eq!(assignment.len(), 2);
        assert_eq!(assignment.role_of("a"), Some(PointRole::Leisure));
        assert_eq!(assignment.role_of("b"), Some(PointRole::Home));
    }

    #[test]
    fn test_surplus_points_stay_unassigned() {
        let points = vec![point("a", "1"), point("b", "2"), point("c", "3"), point("d", "4")];
        let assignment = recommend_roles(&points, &KeywordSets::default());
        assert_eq!(assignment.len(), 3);
        assert_eq!(assignment.role_of("d"), None);
    }

    #[test]
    fn test_cache_reuses_recommendation_for_same_id_set() {
        let assigner = LifeCircleAssigner::new();
        let points = vec![point("a", "公司"), point("b", "家"), point("c", "公园")];
        let first = assigner.assignment_for(&points);

        // Same ids, different order: cached by id set
        let reordered = vec![points[2].clone(), points[0].clone(), points[1].clone()];
        assert_eq!(assigner.assignment_for(&reordered), first);
    }

    #[test]
    fn test_override_takes_precedence_and_swaps() {
        let assigner = LifeCircleAssigner::new();
        let points = vec![point("a", "公司"), point("b", "家"), point("c", "公园")];
        assert_eq!(assigner.assignment_for(&points).role_of("a"), Some(PointRole::Work));

        assigner.set_override("a", PointRole::Home);
        let assignment = assigner.assignment_for(&points);
        assert_eq!(assignment.role_of("a"), Some(PointRole::Home));
        assert_eq!(assignment.role_of("b"), Some(PointRole::Work));
        assert_eq!(assignment.role_of("c"), Some(PointRole::Leisure));

        assigner.clear_override("a");
        assert_eq!(assigner.assignment_for(&points).role_of("a"), Some(PointRole::Work));
    }

    #[test]
    fn test_activate_through_assigner() {
        let assigner = LifeCircleAssigner::new();
        let points = vec![point("a", "公司"), point("b", "家"), point("c", "公园")];
        let circle = assigner.activate(&points).unwrap();
        assert_eq!(circle.point(PointRole::Home).id, "b");

        let pair = vec![point("a", "公司"), point("b", "家")];
        assert!(assigner.activate(&pair).is_err());
    }
}
