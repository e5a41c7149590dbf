//! Angle helpers in degrees.
//!
//! Every angular range in the engine (shan sectors, search sectors) may
//! straddle north, so all containment tests go through [`in_range`].

/// Normalize an angle to the `[0, 360)` range.
///
/// Non-finite input normalizes to `0.0` so that NaN never reaches the
/// classifier.
#[inline]
pub fn normalize(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let normalized = ((angle % 360.0) + 360.0) % 360.0;
    // -1e-15 % 360 + 360 rounds to exactly 360.0
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Test whether `angle` lies in the closed range `[start, end]`.
///
/// When `start > end` the range wraps through 0°: `in_range(350, 340, 10)`
/// is true, `in_range(20, 340, 10)` is false.
#[inline]
pub fn in_range(angle: f64, start: f64, end: f64) -> bool {
    if start <= end {
        angle >= start && angle <= end
    } else {
        angle >= start || angle <= end
    }
}

/// Shortest absolute separation between two headings, in `[0, 180]`.
///
/// Handles wraparound (350° to 10° is 20°, not 340°).
#[inline]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (normalize(a) - normalize(b)).abs();
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}
