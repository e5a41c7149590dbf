//! WGS-84 ⇄ GCJ-02 conversion.
//!
//! GCJ-02 shifts WGS-84 coordinates by an empirical, position-dependent
//! offset of a few hundred metres. The forward transform is a polynomial
//! plus sine series on `(lon - 105, lat - 35)`, scaled onto the Krasovsky
//! ellipsoid. Points outside mainland China's bounding envelope are never
//! shifted.
//!
//! The inverse has no closed form. [`gcj_to_wgs`] subtracts the forward delta
//! evaluated at the GCJ point, which is accurate to roughly 1-2 m.
//! [`gcj_to_wgs_precise`] iterates that step until the residual vanishes.

use std::f64::consts::PI;

use super::GeoPoint;

/// Semi-major axis of the Krasovsky 1940 ellipsoid, in metres.
const KRASOVSKY_A: f64 = 6_378_245.0;

/// First eccentricity squared of the Krasovsky 1940 ellipsoid.
const KRASOVSKY_EE: f64 = 0.006_693_421_622_965_943_23;

// Mainland China bounding envelope.
const CHINA_MIN_LON: f64 = 72.004;
const CHINA_MAX_LON: f64 = 137.8347;
const CHINA_MIN_LAT: f64 = 0.8293;
const CHINA_MAX_LAT: f64 = 55.8271;

/// Residual (degrees) below which the precise inverse stops iterating.
const PRECISE_THRESHOLD_DEG: f64 = 1e-7;

/// Iteration cap for the precise inverse.
const PRECISE_MAX_ITERATIONS: usize = 30;

/// Whether the point lies outside the envelope where GCJ-02 applies.
#[inline]
pub fn is_outside_china(point: GeoPoint) -> bool {
    point.longitude < CHINA_MIN_LON
        || point.longitude > CHINA_MAX_LON
        || point.latitude < CHINA_MIN_LAT
        || point.latitude > CHINA_MAX_LAT
}

/// Convert a WGS-84 point to GCJ-02.
///
/// Returns the input unchanged outside mainland China.
pub fn wgs_to_gcj(point: GeoPoint) -> GeoPoint {
    if is_outside_china(point) {
        return point;
    }
    let (d_lat, d_lon) = offset(point);
    GeoPoint::new(point.latitude + d_lat, point.longitude + d_lon)
}

/// Convert a GCJ-02 point to WGS-84 (single-step approximation).
///
/// Returns the input unchanged outside mainland China. Do not expect
/// round-trip precision below 1-2 metres.
pub fn gcj_to_wgs(point: GeoPoint) -> GeoPoint {
    if is_outside_china(point) {
        return point;
    }
    let (d_lat, d_lon) = offset(point);
    GeoPoint::new(point.latitude - d_lat, point.longitude - d_lon)
}

/// Convert a GCJ-02 point to WGS-84 by fixed-point iteration.
///
/// Converges to sub-centimetre agreement (`wgs_to_gcj(result) ≈ point`)
/// within a handful of iterations.
pub fn gcj_to_wgs_precise(point: GeoPoint) -> GeoPoint {
    if is_outside_china(point) {
        return point;
    }

    let mut wgs = gcj_to_wgs(point);
    for _ in 0..PRECISE_MAX_ITERATIONS {
        let forward = wgs_to_gcj(wgs);
        let d_lat = forward.latitude - point.latitude;
        let d_lon = forward.longitude - point.longitude;

        if d_lat.abs() < PRECISE_THRESHOLD_DEG && d_lon.abs() < PRECISE_THRESHOLD_DEG {
            break;
        }

        wgs = GeoPoint::new(wgs.latitude - d_lat, wgs.longitude - d_lon);
    }
    wgs
}

/// GCJ-02 offset `(d_lat, d_lon)` in degrees at the given point.
fn offset(point: GeoPoint) -> (f64, f64) {
    let x = point.longitude - 105.0;
    let y = point.latitude - 35.0;

    let d_lat = transform_lat(x, y);
    let d_lon = transform_lon(x, y);

    let rad_lat = point.latitude.to_radians();
    let magic = 1.0 - KRASOVSKY_EE * rad_lat.sin() * rad_lat.sin();
    let sqrt_magic = magic.sqrt();

    let d_lat = (d_lat * 180.0) / ((KRASOVSKY_A * (1.0 - KRASOVSKY_EE)) / (magic * sqrt_magic) * PI);
    let d_lon = (d_lon * 180.0) / (KRASOVSKY_A / sqrt_magic * rad_lat.cos() * PI);

    (d_lat, d_lon)
}

fn transform_lat(x: f64, y: f64) -> f64 {
    let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y + 0.1 * x * y + 0.2 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
    ret
}

fn transform_lon(x: f64, y: f64) -> f64 {
    let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x + 0.1 * x * y + 0.1 * x.abs().sqrt();
    ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
    ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
    ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::haversine_distance_meters;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_wgs_to_gcj_reference_points() {
        // Beijing, Tiananmen
        let gcj = wgs_to_gcj(GeoPoint::new(39.904179, 116.407387));
        assert!((gcj.longitude - 116.413629).abs() < EPSILON);
        assert!((gcj.latitude - 39.905582).abs() < EPSILON);

        // Wuhan
        let gcj = wgs_to_gcj(GeoPoint::new(30.593354, 114.304569));
        assert!((gcj.longitude - 114.310012).abs() < EPSILON);
        assert!((gcj.latitude - 30.590943).abs() < EPSILON);
    }

    #[test]
    fn test_outside_china_is_exact_pass_through() {
        let london = GeoPoint::new(51.5074, -0.1278);
        assert_eq!(wgs_to_gcj(london), london);
        assert_eq!(gcj_to_wgs(london), london);
        assert_eq!(gcj_to_wgs_precise(london), london);

        // West of the envelope (Kabul area)
        let west = GeoPoint::new(31.998164, 61.972426);
        assert_eq!(wgs_to_gcj(west), west);
    }

    #[test]
    fn test_envelope_edges() {
        assert!(is_outside_china(GeoPoint::new(30.0, 72.0)));
        assert!(!is_outside_china(GeoPoint::new(30.0, 72.004)));
        assert!(is_outside_china(GeoPoint::new(55.9, 120.0)));
        assert!(is_outside_china(GeoPoint::new(0.8, 120.0)));
    }

    #[test]
    fn test_single_step_roundtrip_within_tolerance() {
        let samples = [
            GeoPoint::new(39.9042, 116.4074),
            GeoPoint::new(31.2304, 121.4737),
            GeoPoint::new(22.5431, 114.0579),
            GeoPoint::new(43.8256, 87.6168),
        ];
        for p in samples {
            let back = wgs_to_gcj(gcj_to_wgs(p));
            let err = haversine_distance_meters(p, back);
            assert!(err < 3.0, "roundtrip error {:.3}m at {}", err, p);
        }
    }

    #[test]
    fn test_precise_inverse_is_tighter() {
        let gcj = GeoPoint::new(31.2304, 121.4737);
        let wgs = gcj_to_wgs_precise(gcj);
        let back = wgs_to_gcj(wgs);
        let err = haversine_distance_meters(gcj, back);
        assert!(err < 0.05, "precise roundtrip error {:.4}m", err);
    }

    #[test]
    fn test_offset_magnitude_is_hundreds_of_metres() {
        let wgs = GeoPoint::new(39.9042, 116.4074);
        let shift = haversine_distance_meters(wgs, wgs_to_gcj(wgs));
        assert!(shift > 100.0 && shift < 1000.0, "shift {:.1}m", shift);
    }
}
