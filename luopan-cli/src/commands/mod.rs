//! CLI command implementations.

pub mod config;
pub mod geo;
pub mod life_circle;
pub mod search;
