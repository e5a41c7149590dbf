//! Bearing and distance between geographic points.
//!
//! Survey bearings follow the rhumb line (constant compass heading), which is
//! what a luopan laid flat on a map actually reads. Distances use the
//! haversine great-circle formula; at survey scale the rhumb and great-circle
//! lengths are indistinguishable.

use std::f64::consts::{FRAC_PI_4, PI};

use serde::Serialize;

use super::angle::normalize;
use super::GeoPoint;
use crate::shan::{classify, ShanInfo};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Below this difference in projected latitude the rhumb line is treated as
/// an east-west line.
const RHUMB_EPSILON: f64 = 1e-12;

/// Rhumb-line bearing from `from` to `to`, in degrees `[0, 360)`.
///
/// 0 = north, 90 = east. The longitude difference is folded into `(-π, π]`
/// so that lines crossing the antimeridian take the short way round.
/// Coincident points return `0.0`.
pub fn rhumb_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_lambda = wrap_longitude_delta((to.longitude - from.longitude).to_radians());

    let d_psi = projected_latitude_delta(phi1, phi2);
    let theta = d_lambda.atan2(d_psi);

    if theta.is_finite() {
        normalize(theta.to_degrees())
    } else {
        0.0
    }
}

/// Great-circle distance in metres (haversine formula).
pub fn haversine_distance_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    let distance = EARTH_RADIUS_METERS * c;
    if distance.is_finite() {
        distance
    } else {
        0.0
    }
}

/// Distance in metres along the rhumb line between two points.
pub fn rhumb_distance_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = wrap_longitude_delta((to.longitude - from.longitude).to_radians());

    let d_psi = projected_latitude_delta(phi1, phi2);
    // East-west lines have no projected stretch; fall back to the parallel's scale
    let q = if d_psi.abs() > RHUMB_EPSILON {
        d_phi / d_psi
    } else {
        phi1.cos()
    };

    let distance = (d_phi * d_phi + q * q * d_lambda * d_lambda).sqrt() * EARTH_RADIUS_METERS;
    if distance.is_finite() {
        distance
    } else {
        0.0
    }
}

/// Point reached by travelling `distance_meters` from `origin` along the
/// great circle with initial bearing `bearing_degrees`.
///
/// Longitude of the result is folded into `[-180, 180]`.
pub fn destination_point(origin: GeoPoint, bearing_degrees: f64, distance_meters: f64) -> GeoPoint {
    let phi1 = origin.latitude.to_radians();
    let lambda1 = origin.longitude.to_radians();
    let theta = bearing_degrees.to_radians();
    let delta = distance_meters / EARTH_RADIUS_METERS;

    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

    let longitude = normalize(lambda2.to_degrees() + 180.0) - 180.0;
    GeoPoint::new(phi2.to_degrees(), longitude)
}

/// Origin → destination report: bearing, distance and shan sector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub bearing_degrees: f64,
    pub distance_meters: f64,
    pub shan: ShanInfo,
}

/// Measure from `from` to `to` in one call.
pub fn measure(from: GeoPoint, to: GeoPoint) -> Measurement {
    let bearing_degrees = rhumb_bearing(from, to);
    Measurement {
        bearing_degrees,
        distance_meters: haversine_distance_meters(from, to),
        shan: classify(bearing_degrees),
    }
}

/// Difference of Mercator-projected latitudes, `ln(tan(π/4+φ2/2) / tan(π/4+φ1/2))`.
#[inline]
fn projected_latitude_delta(phi1: f64, phi2: f64) -> f64 {
    ((FRAC_PI_4 + phi2 / 2.0).tan() / (FRAC_PI_4 + phi1 / 2.0).tan()).ln()
}

/// Fold a longitude difference in radians into `(-π, π]`.
#[inline]
fn wrap_longitude_delta(d_lambda: f64) -> f64 {
    if d_lambda > PI {
        d_lambda - 2.0 * PI
    } else if d_lambda <= -PI {
        d_lambda + 2.0 * PI
    } else {
        d_lambda
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shan::Trigram;

    const BEIJING: GeoPoint = GeoPoint::new(39.9042, 116.4074);

    #[test]
    fn test_cardinal_bearings() {
        let o = GeoPoint::new(30.0, 110.0);
        assert!((rhumb_bearing(o, GeoPoint::new(31.0, 110.0)) - 0.0).abs() < 1e-9);
        assert!((rhumb_bearing(o, GeoPoint::new(30.0, 111.0)) - 90.0).abs() < 1e-9);
        assert!((rhumb_bearing(o, GeoPoint::new(29.0, 110.0)) - 180.0).abs() < 1e-9);
        assert!((rhumb_bearing(o, GeoPoint::new(30.0, 109.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_coincident_points() {
        let bearing = rhumb_bearing(BEIJING, BEIJING);
        assert!(bearing.is_finite());
        assert!((0.0..360.0).contains(&bearing));
        assert_eq!(haversine_distance_meters(BEIJING, BEIJING), 0.0);
        assert_eq!(rhumb_distance_meters(BEIJING, BEIJING), 0.0);
    }

    #[test]
    fn test_antimeridian_takes_short_way() {
        let west = GeoPoint::new(0.0, 179.5);
        let east = GeoPoint::new(0.0, -179.5);
        assert!((rhumb_bearing(west, east) - 90.0).abs() < 1e-9);
        assert!((rhumb_bearing(east, west) - 270.0).abs() < 1e-9);
        let d = rhumb_distance_meters(west, east);
        assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    }

    #[test]
    fn test_beijing_survey_example() {
        let destination = GeoPoint::new(39.9163, 116.3972);
        let m = measure(BEIJING, destination);

        assert!(
            (m.bearing_degrees - 327.11).abs() < 0.01,
            "bearing {:.2}",
            m.bearing_degrees
        );
        assert!(
            (m.distance_meters - 1_602.2).abs() < 0.5,
            "distance {:.1}",
            m.distance_meters
        );
        assert_eq!(m.shan.index, 22);
        assert_eq!(m.shan.trigram, Trigram::Qian);
    }

    #[test]
    fn test_haversine_known_value() {
        // One degree of latitude on a 6371km sphere
        let d = haversine_distance_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111_194.93).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_rhumb_and_great_circle_agree_at_survey_scale() {
        let destination = GeoPoint::new(39.95, 116.45);
        let gc = haversine_distance_meters(BEIJING, destination);
        let rl = rhumb_distance_meters(BEIJING, destination);
        assert!((gc - rl).abs() < 0.5, "gc {} vs rhumb {}", gc, rl);
    }

    #[test]
    fn test_destination_point_roundtrip() {
        let target = destination_point(BEIJING, 45.0, 2_000.0);
        let d = haversine_distance_meters(BEIJING, target);
        assert!((d - 2_000.0).abs() < 0.01, "got {}", d);
        let b = rhumb_bearing(BEIJING, target);
        assert!((b - 45.0).abs() < 0.1, "got {}", b);
    }

    #[test]
    fn test_destination_point_wraps_longitude() {
        let target = destination_point(GeoPoint::new(0.0, 179.9), 90.0, 50_000.0);
        assert!(target.longitude < -179.0 && target.longitude >= -180.0);
    }

    #[test]
    fn test_reverse_bearing_is_opposite() {
        let a = GeoPoint::new(31.2304, 121.4737);
        let b = GeoPoint::new(31.2400, 121.4900);
        let forward = rhumb_bearing(a, b);
        let back = rhumb_bearing(b, a);
        let diff = crate::geo::angle::angular_difference(forward, back);
        assert!((diff - 180.0).abs() < 1e-6, "diff {}", diff);
    }
}
