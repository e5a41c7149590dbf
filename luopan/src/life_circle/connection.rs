//! Activated life circles and the connections between their points.

use serde::Serialize;
use thiserror::Error;

use super::{PointRole, RoleAssignment, SurveyPoint};
use crate::geo::{haversine_distance_meters, rhumb_bearing};
use crate::shan::{classify, ShanInfo};

/// Why a role assignment could not be activated.
///
/// Expected during normal use (the user has not finished picking roles), so
/// callers typically show it rather than treat it as a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    /// Some roles have no point.
    #[error("no point assigned to: {}", format_roles(.0))]
    MissingRoles(Vec<PointRole>),

    /// More than one point holds the same role.
    #[error("role '{0}' is assigned to more than one point")]
    DuplicateRole(PointRole),

    /// The assignment names a point that is not in the point set.
    #[error("assignment refers to unknown point '{0}'")]
    UnknownPoint(String),
}

fn format_roles(roles: &[PointRole]) -> String {
    roles
        .iter()
        .map(PointRole::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A complete home / work / leisure triad.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifeCircle {
    home: SurveyPoint,
    work: SurveyPoint,
    leisure: SurveyPoint,
}

impl LifeCircle {
    /// The point holding `role`.
    pub fn point(&self, role: PointRole) -> &SurveyPoint {
        match role {
            PointRole::Home => &self.home,
            PointRole::Work => &self.work,
            PointRole::Leisure => &self.leisure,
        }
    }

    /// All six directed connections of this circle.
    pub fn connections(&self) -> Vec<Connection> {
        build_connections(self)
    }
}

/// Identifies one end of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointRef {
    pub id: String,
    pub name: String,
    pub role: PointRole,
}

/// Directed relationship from one life-circle point to another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub from: PointRef,
    pub to: PointRef,
    pub bearing_degrees: f64,
    pub distance_meters: f64,
    pub shan: ShanInfo,
}

/// Validate that `assignment` gives each role to exactly one of `points`.
pub fn activate(
    points: &[SurveyPoint],
    assignment: &RoleAssignment,
) -> Result<LifeCircle, ActivationError> {
    if let Some((id, _)) = assignment
        .iter()
        .find(|(id, _)| !points.iter().any(|p| p.id == *id))
    {
        return Err(ActivationError::UnknownPoint(id.to_string()));
    }

    let mut missing = Vec::new();
    let mut holders: Vec<&SurveyPoint> = Vec::with_capacity(PointRole::ALL.len());
    for role in PointRole::ALL {
        let mut matching = points
            .iter()
            .filter(|p| assignment.role_of(&p.id) == Some(role));
        match (matching.next(), matching.next()) {
            (Some(point), None) => holders.push(point),
            (Some(_), Some(_)) => return Err(ActivationError::DuplicateRole(role)),
            (None, _) => missing.push(role),
        }
    }

    if !missing.is_empty() {
        return Err(ActivationError::MissingRoles(missing));
    }

    Ok(LifeCircle {
        home: holders[0].clone(),
        work: holders[1].clone(),
        leisure: holders[2].clone(),
    })
}

/// Build every ordered pair of the circle: each point connects to each of
/// the other two, so every destination sees all sources pointing at it.
pub fn build_connections(circle: &LifeCircle) -> Vec<Connection> {
    let mut connections = Vec::with_capacity(6);
    for from_role in PointRole::ALL {
        for to_role in PointRole::ALL {
            if from_role == to_role {
                continue;
            }
            let from = circle.point(from_role);
            let to = circle.point(to_role);
            let bearing = rhumb_bearing(from.position, to.position);
            connections.push(Connection {
                from: point_ref(from, from_role),
                to: point_ref(to, to_role),
                bearing_degrees: bearing,
                distance_meters: haversine_distance_meters(from.position, to.position),
                shan: classify(bearing),
            });
        }
    }
    connections
}

/// Connections whose destination is `role`.
pub fn connections_into(connections: &[Connection], role: PointRole) -> impl Iterator<Item = &Connection> {
    connections.iter().filter(move |c| c.to.role == role)
}

fn point_ref(point: &SurveyPoint, role: PointRole) -> PointRef {
    PointRef {
        id: point.id.clone(),
        name: point.name.clone(),
        role,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::angle::angular_difference;
    use crate::geo::GeoPoint;

    fn triad() -> (Vec<SurveyPoint>, RoleAssignment) {
        let points = vec![
            SurveyPoint::new("h", "home", GeoPoint::new(39.99, 116.47)),
            SurveyPoint::new("w", "work", GeoPoint::new(39.91, 116.46)),
            SurveyPoint::new("l", "leisure", GeoPoint::new(39.94, 116.52)),
        ];
        let assignment: RoleAssignment = [
            ("h".to_string(), PointRole::Home),
            ("w".to_string(), PointRole::Work),
            ("l".to_string(), PointRole::Leisure),
        ]
        .into_iter()
        .collect();
        (points, assignment)
    }

    #[test]
    fn test_activate_complete_triad() {
        let (points, assignment) = triad();
        let circle = activate(&points, &assignment).unwrap();
        assert_eq!(circle.point(PointRole::Work).id, "w");
    }

    #[test]
    fn test_activate_missing_role() {
        let (points, mut assignment) = triad();
        assignment.remove("l");
        assert_eq!(
            activate(&points, &assignment),
            Err(ActivationError::MissingRoles(vec![PointRole::Leisure]))
        );
    }

    #[test]
    fn test_activate_duplicate_role() {
        let (points, mut assignment) = triad();
        assignment.set("l", PointRole::Home);
        assert_eq!(
            activate(&points, &assignment),
            Err(ActivationError::DuplicateRole(PointRole::Home))
        );
    }

    #[test]
    fn test_activate_unknown_point() {
        let (points, mut assignment) = triad();
        assignment.set("ghost", PointRole::Home);
        assert_eq!(
            activate(&points, &assignment),
            Err(ActivationError::UnknownPoint("ghost".to_string()))
        );
    }

    #[test]
    fn test_error_message_lists_roles() {
        let err = ActivationError::MissingRoles(vec![PointRole::Work, PointRole::Leisure]);
        assert_eq!(err.to_string(), "no point assigned to: work, leisure");
    }

    #[test]
    fn test_six_connections_with_reverse_pairs() {
        let (points, assignment) = triad();
        let connections = activate(&points, &assignment).unwrap().connections();
        assert_eq!(connections.len(), 6);

        for c in &connections {
            assert_ne!(c.from.id, c.to.id);
            let reverse = connections
                .iter()
                .find(|r| r.from.id == c.to.id && r.to.id == c.from.id)
                .expect("reverse connection present");
            let diff = angular_difference(c.bearing_degrees, reverse.bearing_degrees);
            assert!((diff - 180.0).abs() < 0.5, "diff {}", diff);
            assert!((c.distance_meters - reverse.distance_meters).abs() < 1e-6);
            assert_eq!(c.shan, classify(c.bearing_degrees));
        }
    }

    #[test]
    fn test_connections_into_destination() {
        let (points, assignment) = triad();
        let connections = activate(&points, &assignment).unwrap().connections();
        let into_home: Vec<_> = connections_into(&connections, PointRole::Home).collect();
        assert_eq!(into_home.len(), 2);
        assert!(into_home.iter().all(|c| c.to.id == "h"));
    }
}
