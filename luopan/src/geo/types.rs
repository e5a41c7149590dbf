//! Core geographic value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::frame::{gcj_to_wgs, wgs_to_gcj};

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// A geographic position in decimal degrees.
///
/// The engine trusts its inputs: range checking is the job of whoever
/// produces the point. [`GeoPoint::is_valid`] is available for that purpose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (MIN_LAT..=MAX_LAT).contains(&self.latitude)
            && (MIN_LON..=MAX_LON).contains(&self.longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Error returned when a `lat,lon` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParsePointError {
    /// The string was not two comma-separated components.
    #[error("expected 'lat,lon', got '{0}'")]
    Format(String),

    /// A component was not a number.
    #[error("invalid coordinate component '{0}'")]
    Number(String),

    /// The parsed point is outside the valid latitude/longitude ranges.
    #[error("coordinate out of range: {0}")]
    OutOfRange(String),
}

impl FromStr for GeoPoint {
    type Err = ParsePointError;

    /// Parses `"lat,lon"` (whitespace around components is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| ParsePointError::Format(s.to_string()))?;

        let parse = |part: &str| -> Result<f64, ParsePointError> {
            part.trim()
                .parse::<f64>()
                .map_err(|_| ParsePointError::Number(part.trim().to_string()))
        };

        let point = GeoPoint::new(parse(lat)?, parse(lon)?);
        if !point.is_valid() {
            return Err(ParsePointError::OutOfRange(s.to_string()));
        }
        Ok(point)
    }
}

/// Geodetic reference frame of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordFrame {
    /// WGS-84, as reported by GPS receivers and used outside China.
    Wgs84,
    /// GCJ-02, the offset frame mandated for map display in mainland China.
    Gcj02,
}

impl CoordFrame {
    /// Short lowercase name used in configuration and CLI arguments.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordFrame::Wgs84 => "wgs",
            CoordFrame::Gcj02 => "gcj",
        }
    }
}

impl fmt::Display for CoordFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wgs" | "wgs84" | "wgs-84" => Ok(CoordFrame::Wgs84),
            "gcj" | "gcj02" | "gcj-02" => Ok(CoordFrame::Gcj02),
            other => Err(format!("unknown coordinate frame '{}'", other)),
        }
    }
}

/// A point tagged with the frame it was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FramedPoint {
    pub point: GeoPoint,
    pub frame: CoordFrame,
}

impl FramedPoint {
    pub const fn new(point: GeoPoint, frame: CoordFrame) -> Self {
        Self { point, frame }
    }

    pub const fn wgs(point: GeoPoint) -> Self {
        Self::new(point, CoordFrame::Wgs84)
    }

    pub const fn gcj(point: GeoPoint) -> Self {
        Self::new(point, CoordFrame::Gcj02)
    }

    /// Express this point in `frame`, converting only if the frames differ.
    pub fn to_frame(self, frame: CoordFrame) -> FramedPoint {
        let point = match (self.frame, frame) {
            (CoordFrame::Wgs84, CoordFrame::Gcj02) => wgs_to_gcj(self.point),
            (CoordFrame::Gcj02, CoordFrame::Wgs84) => gcj_to_wgs(self.point),
            _ => self.point,
        };
        FramedPoint { point, frame }
    }
}

/// Anything that has a geographic position.
///
/// Lets the sector filter and life-circle code work directly on caller types
/// (search results, survey points) without copying them into `GeoPoint`s.
pub trait Located {
    fn position(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn position(&self) -> GeoPoint {
        *self
    }
}

impl<T: Located> Located for &T {
    fn position(&self) -> GeoPoint {
        (**self).position()
    }
}
