//! Geographic primitives for the survey engine
//!
//! Provides angle arithmetic, the WGS-84 ⇄ GCJ-02 frame conversion used by
//! domestic Chinese map tiles, and rhumb-line bearing / great-circle distance
//! between two points.
//!
//! # Frames
//!
//! Coordinates from a GPS receiver are WGS-84; coordinates picked on a
//! domestic map SDK are GCJ-02. Bearings and distances are only meaningful
//! between points of the same frame, so callers convert explicitly with
//! [`FramedPoint::to_frame`] before measuring.

pub mod angle;
pub mod bearing;
pub mod frame;
mod types;

pub use bearing::{
    destination_point, haversine_distance_meters, measure, rhumb_bearing, rhumb_distance_meters,
    Measurement, EARTH_RADIUS_METERS,
};
pub use frame::{gcj_to_wgs, gcj_to_wgs_precise, is_outside_china, wgs_to_gcj};
pub use types::{CoordFrame, FramedPoint, GeoPoint, Located, ParsePointError};
