//! Sector-and-radius filtering of candidate points.
//!
//! A sector search asks: which of these points lie in the wedge between two
//! compass bearings, no further than some distance from the origin? The
//! wedge may straddle north (`start_angle > end_angle`).
//!
//! # Example
//!
//! ```
//! use luopan::geo::GeoPoint;
//! use luopan::sector::{filter_in_sector, SectorQuery};
//!
//! let origin = GeoPoint::new(39.9042, 116.4074);
//! let query = SectorQuery::new(origin, 340.0, 20.0, 5_000.0);
//!
//! let north = GeoPoint::new(39.92, 116.4074);
//! let south = GeoPoint::new(39.89, 116.4074);
//! let hits = filter_in_sector(&[north, south], &query);
//! assert_eq!(hits, vec![north]);
//! ```

use serde::{Deserialize, Serialize};

use crate::geo::angle::{in_range, normalize};
use crate::geo::{destination_point, haversine_distance_meters, rhumb_bearing, GeoPoint, Located};

/// Default number of arc vertices in [`SectorQuery::outline`].
pub const DEFAULT_OUTLINE_STEPS: usize = 32;

/// A wedge-shaped search region around an origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorQuery {
    pub origin: GeoPoint,
    /// Clockwise start of the wedge, degrees.
    pub start_angle: f64,
    /// Clockwise end of the wedge, degrees. May be numerically below
    /// `start_angle`, meaning the wedge wraps through 0°.
    pub end_angle: f64,
    pub max_distance_meters: f64,
    /// Widening applied to both edges of the wedge.
    pub angle_tolerance_degrees: f64,
    /// Added to every computed bearing before the range test (e.g. magnetic
    /// declination when the wedge was read off a compass).
    pub bearing_offset_degrees: f64,
}

impl SectorQuery {
    /// Create a query with no tolerance and no bearing offset.
    pub fn new(origin: GeoPoint, start_angle: f64, end_angle: f64, max_distance_meters: f64) -> Self {
        Self {
            origin,
            start_angle,
            end_angle,
            max_distance_meters,
            angle_tolerance_degrees: 0.0,
            bearing_offset_degrees: 0.0,
        }
    }

    /// Set the edge tolerance.
    pub fn with_tolerance(mut self, degrees: f64) -> Self {
        self.angle_tolerance_degrees = degrees;
        self
    }

    /// Set the bearing offset.
    pub fn with_bearing_offset(mut self, degrees: f64) -> Self {
        self.bearing_offset_degrees = degrees;
        self
    }

    /// Clockwise angular width of the wedge before tolerance, in `[0, 360]`.
    ///
    /// A raw span of 360° or more (e.g. `0..360`) is a full circle.
    pub fn span_degrees(&self) -> f64 {
        let raw = self.end_angle - self.start_angle;
        if raw >= 360.0 {
            360.0
        } else {
            normalize(raw)
        }
    }

    /// The wedge after tolerance is applied.
    pub fn effective_range(&self) -> EffectiveRange {
        let tolerance = self.angle_tolerance_degrees.max(0.0);
        if self.span_degrees() + 2.0 * tolerance >= 360.0 {
            return EffectiveRange::FullCircle;
        }
        EffectiveRange::Arc {
            start: normalize(self.start_angle - tolerance),
            end: normalize(self.end_angle + tolerance),
        }
    }

    /// Whether a single point falls inside this query.
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.matches(point, &self.effective_range())
    }

    fn matches(&self, point: GeoPoint, range: &EffectiveRange) -> bool {
        let distance = haversine_distance_meters(self.origin, point);
        if distance > self.max_distance_meters {
            return false;
        }
        let bearing = normalize(rhumb_bearing(self.origin, point) + self.bearing_offset_degrees);
        range.contains(bearing)
    }

    /// Polygon outlining the wedge on the map: origin, `steps + 1` arc
    /// vertices from start to end, origin again.
    ///
    /// Bearing offset and tolerance are not applied; the outline shows the
    /// wedge as the user drew it.
    pub fn outline(&self, steps: usize) -> Vec<GeoPoint> {
        let steps = steps.max(1);
        let span = self.span_degrees();
        let full = span >= 360.0;

        let mut polygon = Vec::with_capacity(steps + 3);
        if !full {
            polygon.push(self.origin);
        }
        for i in 0..=steps {
            let bearing = self.start_angle + span * i as f64 / steps as f64;
            polygon.push(destination_point(
                self.origin,
                normalize(bearing),
                self.max_distance_meters,
            ));
        }
        if !full {
            polygon.push(self.origin);
        }
        polygon
    }
}

/// Angular range actually tested by the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectiveRange {
    FullCircle,
    Arc { start: f64, end: f64 },
}

impl EffectiveRange {
    pub fn contains(&self, bearing: f64) -> bool {
        match *self {
            EffectiveRange::FullCircle => true,
            EffectiveRange::Arc { start, end } => in_range(bearing, start, end),
        }
    }
}

/// Keep the points inside the query's wedge and radius, preserving order.
///
/// A point at distance exactly `max_distance_meters` is kept, so a point
/// coincident with the origin survives even a zero radius (its degenerate
/// bearing is 0°).
pub fn filter_in_sector<T>(points: &[T], query: &SectorQuery) -> Vec<T>
where
    T: Located + Clone,
{
    let range = query.effective_range();
    points
        .iter()
        .filter(|item| query.matches(item.position(), &range))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: GeoPoint = GeoPoint::new(39.9042, 116.4074);

    fn at(bearing: f64, distance: f64) -> GeoPoint {
        destination_point(ORIGIN, bearing, distance)
    }

    #[test]
    fn test_origin_point_inside_wraparound_sector() {
        let query = SectorQuery::new(ORIGIN, 350.0, 10.0, 100.0);
        assert_eq!(filter_in_sector(&[ORIGIN], &query), vec![ORIGIN]);
    }

    #[test]
    fn test_origin_point_with_zero_radius_is_included() {
        let query = SectorQuery::new(ORIGIN, 350.0, 10.0, 0.0);
        assert_eq!(filter_in_sector(&[ORIGIN], &query), vec![ORIGIN]);
    }

    #[test]
    fn test_radius_excludes_far_points() {
        let near = at(0.0, 900.0);
        let far = at(0.0, 1_100.0);
        let query = SectorQuery::new(ORIGIN, 350.0, 10.0, 1_000.0);
        assert_eq!(filter_in_sector(&[near, far], &query), vec![near]);
    }

    #[test]
    fn test_wraparound_sector() {
        let points = [at(355.0, 500.0), at(5.0, 500.0), at(20.0, 500.0), at(180.0, 500.0)];
        let query = SectorQuery::new(ORIGIN, 340.0, 10.0, 1_000.0);
        let hits = filter_in_sector(&points, &query);
        assert_eq!(hits, vec![points[0], points[1]]);
    }

    #[test]
    fn test_preserves_input_order() {
        let points = [at(100.0, 300.0), at(95.0, 200.0), at(92.0, 100.0)];
        let query = SectorQuery::new(ORIGIN, 90.0, 110.0, 1_000.0);
        assert_eq!(filter_in_sector(&points, &query), points.to_vec());
    }

    #[test]
    fn test_tolerance_widens_both_edges() {
        let points = [at(27.0, 500.0), at(63.0, 500.0)];
        let strict = SectorQuery::new(ORIGIN, 30.0, 60.0, 1_000.0);
        assert!(filter_in_sector(&points, &strict).is_empty());

        let tolerant = strict.with_tolerance(5.0);
        assert_eq!(filter_in_sector(&points, &tolerant), points.to_vec());
    }

    #[test]
    fn test_tolerance_can_wrap_through_north() {
        let query = SectorQuery::new(ORIGIN, 2.0, 30.0, 1_000.0).with_tolerance(5.0);
        assert_eq!(
            query.effective_range(),
            EffectiveRange::Arc {
                start: 357.0,
                end: 35.0
            }
        );
        assert!(query.contains(at(359.0, 500.0)));
    }

    #[test]
    fn test_bearing_offset_rotates_bearings() {
        let point = at(85.0, 500.0);
        let query = SectorQuery::new(ORIGIN, 90.0, 100.0, 1_000.0);
        assert!(!query.contains(point));
        assert!(query.with_bearing_offset(10.0).contains(point));
    }

    #[test]
    fn test_full_circle_queries() {
        let query = SectorQuery::new(ORIGIN, 0.0, 360.0, 1_000.0);
        assert_eq!(query.effective_range(), EffectiveRange::FullCircle);
        assert!(query.contains(at(123.0, 500.0)));

        let wide = SectorQuery::new(ORIGIN, 10.0, 350.0, 1_000.0).with_tolerance(10.0);
        assert_eq!(wide.effective_range(), EffectiveRange::FullCircle);
    }

    #[test]
    fn test_outline_shape() {
        let query = SectorQuery::new(ORIGIN, 350.0, 10.0, 1_000.0);
        let outline = query.outline(4);
        assert_eq!(outline.len(), 7);
        assert_eq!(outline.first(), Some(&ORIGIN));
        assert_eq!(outline.last(), Some(&ORIGIN));
        for vertex in &outline[1..6] {
            let d = haversine_distance_meters(ORIGIN, *vertex);
            assert!((d - 1_000.0).abs() < 0.01);
        }
        assert!((rhumb_bearing(ORIGIN, outline[3]) - 0.0).abs() < 0.1
            || (rhumb_bearing(ORIGIN, outline[3]) - 360.0).abs() < 0.1);
    }
}
