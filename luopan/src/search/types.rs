//! Core types for POI search.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::{CoordFrame, GeoPoint, Located};

/// A point of interest returned by a provider.
///
/// Coordinates are in the frame of whoever produced the record; the
/// orchestrator converts them to the caller's frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiRecord {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

impl PoiRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: GeoPoint,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude: position.latitude,
            longitude: position.longitude,
            address: address.into(),
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Copy of this record with its coordinates replaced.
    pub fn with_point(&self, point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            ..self.clone()
        }
    }
}

impl Located for PoiRecord {
    fn position(&self) -> GeoPoint {
        self.point()
    }
}

/// A keyword search around a centre point, as sent to one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiSearchRequest {
    pub keyword: String,
    /// Centre, in the provider's frame.
    pub center: GeoPoint,
    pub radius_meters: f64,
    /// Upper bound on records wanted from the provider.
    pub limit: usize,
}

/// Errors from POI search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Network or HTTP-level failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered but the body could not be understood.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// The provider answered with an application-level error.
    #[error("{provider} returned an error: {message}")]
    Provider { provider: String, message: String },

    #[error("{provider} did not answer within {secs}s")]
    Timeout { provider: String, secs: u64 },

    #[error("{0} requires an API key")]
    MissingApiKey(String),

    #[error("Unknown POI provider '{0}'")]
    UnknownProvider(String),

    #[error("No POI providers configured")]
    NoProviders,

    /// Every provider in the chain failed.
    #[error("All POI providers failed: {0}")]
    AllProvidersFailed(String),

    /// A newer search replaced this one before it finished.
    #[error("Search superseded by a newer request")]
    Superseded,
}

/// A POI search backend.
///
/// Implementations report the coordinate frame they expect request centres
/// in and return records in.
pub trait AsyncPoiProvider: Send + Sync {
    /// Run a keyword search around `request.center`.
    fn search(
        &self,
        request: &PoiSearchRequest,
    ) -> impl Future<Output = Result<Vec<PoiRecord>, SearchError>> + Send;

    /// Short provider name for logs and results.
    fn name(&self) -> &str;

    /// Frame of request centres and returned coordinates.
    fn frame(&self) -> CoordFrame;

    /// Largest radius the backend honours, if it caps requests.
    fn max_radius_meters(&self) -> Option<f64> {
        None
    }
}
