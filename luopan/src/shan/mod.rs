//! 24-mountain (二十四山) classification of compass bearings.
//!
//! The ring is divided into 24 sectors of 15°, with sector 0 (子) centred on
//! due north, so sector `i` covers `[i*15 - 7.5, i*15 + 7.5)`. Each run of
//! three consecutive sectors forms a trigram, and each sector carries one of
//! five elements by a fixed traditional table.
//!
//! # Example
//!
//! ```
//! use luopan::shan::{classify, opposite, Shan, Trigram};
//!
//! let info = classify(180.0);
//! assert_eq!(info.shan, Shan::Wu);
//! assert_eq!(info.trigram, Trigram::Li);
//! assert_eq!(opposite(info.index), 0);
//! ```

mod types;

pub use types::{Element, Shan, ShanInfo, Trigram, SHAN_COUNT, SHAN_WIDTH_DEG};

use serde::Serialize;

use crate::geo::angle::normalize;

/// Sector index for a bearing in degrees.
///
/// Total over all inputs: any real angle is normalized first, and
/// non-finite input is treated as 0°.
#[inline]
pub fn index_of(angle: f64) -> usize {
    let shifted = normalize(normalize(angle) + SHAN_WIDTH_DEG / 2.0);
    (shifted / SHAN_WIDTH_DEG).floor() as usize % SHAN_COUNT
}

/// Classify a bearing into its shan sector, trigram and element.
pub fn classify(angle: f64) -> ShanInfo {
    ShanInfo::for_index(index_of(angle))
}

/// Index of the antipodal sector.
#[inline]
pub fn opposite(index: usize) -> usize {
    (index + SHAN_COUNT / 2) % SHAN_COUNT
}

/// Sitting (坐) and facing (向) sectors of a building or grave.
///
/// The facing sector is the one the heading points into; the sitting sector
/// is directly behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SittingFacing {
    pub heading_degrees: f64,
    pub sitting: ShanInfo,
    pub facing: ShanInfo,
}

impl SittingFacing {
    /// Conventional label, e.g. "子山午向".
    pub fn label(&self) -> String {
        format!("{}山{}向", self.sitting.shan, self.facing.shan)
    }
}

/// Resolve the sitting/facing pair for a facing heading.
pub fn sitting_facing(facing_heading: f64) -> SittingFacing {
    let facing = classify(facing_heading);
    SittingFacing {
        heading_degrees: normalize(facing_heading),
        sitting: ShanInfo::for_index(opposite(facing.index)),
        facing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_north_is_zi() {
        assert_eq!(classify(0.0).shan, Shan::Zi);
        assert_eq!(classify(359.0).shan, Shan::Zi);
        assert_eq!(classify(352.5).shan, Shan::Zi, "start is inclusive");
        assert_eq!(classify(7.4999).shan, Shan::Zi);
        assert_eq!(classify(7.5).shan, Shan::Gui, "end is exclusive");
    }

    #[test]
    fn test_cardinal_sectors() {
        assert_eq!(classify(90.0).shan, Shan::Mao);
        assert_eq!(classify(180.0).shan, Shan::Wu);
        assert_eq!(classify(270.0).shan, Shan::You);
        assert_eq!(classify(315.0).shan, Shan::Qian);
    }

    #[test]
    fn test_negative_and_large_angles() {
        assert_eq!(classify(-90.0).shan, Shan::You);
        assert_eq!(classify(720.0 + 45.0).shan, Shan::Gen);
    }

    #[test]
    fn test_non_finite_is_north() {
        assert_eq!(classify(f64::NAN).index, 0);
        assert_eq!(classify(f64::NEG_INFINITY).index, 0);
    }

    #[test]
    fn test_opposite() {
        assert_eq!(opposite(0), 12);
        assert_eq!(opposite(12), 0);
        assert_eq!(opposite(23), 11);
    }

    #[test]
    fn test_classification_consistency() {
        let info = classify(326.5);
        assert_eq!(info.shan, Shan::Hai);
        assert_eq!(info.trigram, Trigram::Qian);
        assert_eq!(info.element, Element::Water);
    }

    #[test]
    fn test_sitting_facing() {
        let sf = sitting_facing(180.0);
        assert_eq!(sf.facing.shan, Shan::Wu);
        assert_eq!(sf.sitting.shan, Shan::Zi);
        assert_eq!(sf.label(), "子山午向");
    }

    proptest! {
        #[test]
        fn prop_periodic(angle in -10_000.0f64..10_000.0) {
            prop_assert_eq!(classify(angle).index, classify(angle + 360.0).index);
        }

        #[test]
        fn prop_opposite_is_half_turn(angle in 0.0f64..360.0) {
            let flipped = normalize(angle + 180.0);
            prop_assert_eq!(opposite(classify(angle).index), classify(flipped).index);
        }

        #[test]
        fn prop_angle_inside_its_sector(angle in 0.0f64..360.0) {
            let info = classify(angle);
            let end = info.sector_end_degree();
            prop_assert!(crate::geo::angle::in_range(angle, info.sector_start_degree, end));
        }
    }
}
