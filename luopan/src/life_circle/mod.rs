//! Life circle: the home / work / leisure triad.
//!
//! Users mark two or three places they frequent. The assigner recommends a
//! role for each from its name, the caller confirms (or overrides) the
//! roles, and an activated circle yields the six directed connections
//! between its points, each with bearing, distance and shan sector.
//!
//! # Flow
//!
//! ```text
//! points ──► LifeCircleAssigner::assignment_for ──► RoleAssignment
//!                  (keyword heuristic, memoized)          │  caller overrides
//!                                                         ▼
//!                                         activate ──► LifeCircle ──► build_connections
//! ```
//!
//! # Example
//!
//! ```
//! use luopan::geo::GeoPoint;
//! use luopan::life_circle::{LifeCircleAssigner, SurveyPoint, PointRole};
//!
//! let points = vec![
//!     SurveyPoint::new("a", "望京花园", GeoPoint::new(39.99, 116.47)),
//!     SurveyPoint::new("b", "国贸写字楼", GeoPoint::new(39.91, 116.46)),
//!     SurveyPoint::new("c", "朝阳公园", GeoPoint::new(39.94, 116.48)),
//! ];
//!
//! let assigner = LifeCircleAssigner::new();
//! let assignment = assigner.assignment_for(&points);
//! assert_eq!(assignment.role_of("b"), Some(PointRole::Work));
//!
//! let circle = luopan::life_circle::activate(&points, &assignment).unwrap();
//! assert_eq!(circle.connections().len(), 6);
//! ```

mod assigner;
mod connection;
mod keywords;

pub use assigner::{recommend_roles, LifeCircleAssigner, DEFAULT_CACHE_CAPACITY};
pub use connection::{
    activate, build_connections, connections_into, ActivationError, Connection, LifeCircle, PointRef,
};
pub use keywords::{
    KeywordSets, RoleScores, DEFAULT_HOME_KEYWORDS, DEFAULT_LEISURE_KEYWORDS, DEFAULT_WORK_KEYWORDS,
};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, Located};

/// Role of a point in the life circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PointRole {
    Home,
    Work,
    Leisure,
}

impl PointRole {
    /// All roles in fallback order.
    pub const ALL: [PointRole; 3] = [PointRole::Home, PointRole::Work, PointRole::Leisure];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PointRole::Home => "home",
            PointRole::Work => "work",
            PointRole::Leisure => "leisure",
        }
    }
}

impl fmt::Display for PointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(PointRole::Home),
            "work" => Ok(PointRole::Work),
            "leisure" => Ok(PointRole::Leisure),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A named point the user has marked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyPoint {
    pub id: String,
    pub name: String,
    pub position: GeoPoint,
}

impl SurveyPoint {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: GeoPoint) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
        }
    }
}

impl Located for SurveyPoint {
    fn position(&self) -> GeoPoint {
        self.position
    }
}

/// Mapping from point id to role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    roles: BTreeMap<String, PointRole>,
}

impl RoleAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role_of(&self, id: &str) -> Option<PointRole> {
        self.roles.get(id).copied()
    }

    pub fn set(&mut self, id: impl Into<String>, role: PointRole) {
        self.roles.insert(id.into(), role);
    }

    pub fn remove(&mut self, id: &str) -> Option<PointRole> {
        self.roles.remove(id)
    }

    /// Id of the point holding `role`, if exactly one does.
    pub fn holder_of(&self, role: PointRole) -> Option<&str> {
        let mut holders = self.roles.iter().filter(|(_, r)| **r == role);
        match (holders.next(), holders.next()) {
            (Some((id, _)), None) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, PointRole)> {
        self.roles.iter().map(|(id, role)| (id.as_str(), *role))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<(String, PointRole)> for RoleAssignment {
    fn from_iter<I: IntoIterator<Item = (String, PointRole)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}
