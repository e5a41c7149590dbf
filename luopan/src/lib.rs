//! Luopan - geospatial engine for feng-shui field surveys
//!
//! Turns coordinates and compass headings into feng-shui semantics: the
//! 24-mountain (shan) sector, trigram and element of a bearing, distances
//! and bearings between marked points, sector-restricted POI search, and
//! the home / work / leisure "life circle".
//!
//! # Modules
//!
//! - [`geo`] - angles, WGS-84 / GCJ-02 conversion, rhumb bearing, haversine
//! - [`shan`] - the 24-shan ring
//! - [`sector`] - wedge-and-radius filtering
//! - [`life_circle`] - role recommendation and triad connections
//! - [`camera`] - arbitration of competing camera moves
//! - [`search`] - POI provider fallback chain
//! - [`config`] - INI configuration
//! - [`logging`] - tracing setup
//!
//! # Example
//!
//! ```
//! use luopan::geo::{measure, GeoPoint};
//! use luopan::shan::Trigram;
//!
//! let origin = GeoPoint::new(39.9042, 116.4074);
//! let target = GeoPoint::new(39.9163, 116.3972);
//! let m = measure(origin, target);
//! assert_eq!(m.shan.trigram, Trigram::Qian);
//! assert!((m.distance_meters - 1_602.0).abs() < 5.0);
//! ```

pub mod camera;
pub mod config;
pub mod geo;
pub mod life_circle;
pub mod logging;
pub mod search;
pub mod sector;
pub mod shan;
