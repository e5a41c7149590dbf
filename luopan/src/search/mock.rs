//! Canned-response provider for tests and offline use.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::types::{AsyncPoiProvider, PoiRecord, PoiSearchRequest, SearchError};
use crate::geo::CoordFrame;

/// A provider that returns a fixed result, optionally after a delay.
///
/// ```
/// use luopan::geo::{CoordFrame, GeoPoint};
/// use luopan::search::{MockPoiProvider, PoiRecord};
///
/// let provider = MockPoiProvider::returning(
///     "fixture",
///     CoordFrame::Wgs84,
///     vec![PoiRecord::new("1", "Cafe", GeoPoint::new(1.0, 2.0), "")],
/// );
/// assert_eq!(provider.call_count(), 0);
/// ```
pub struct MockPoiProvider {
    name: String,
    frame: CoordFrame,
    response: Result<Vec<PoiRecord>, SearchError>,
    delay: Option<Duration>,
    max_radius_meters: Option<f64>,
    calls: AtomicUsize,
    last_request: Mutex<Option<PoiSearchRequest>>,
}

impl MockPoiProvider {
    /// A provider that answers with `records`.
    pub fn returning(name: impl Into<String>, frame: CoordFrame, records: Vec<PoiRecord>) -> Self {
        Self::with_response(name, frame, Ok(records))
    }

    /// A provider that always fails with `error`.
    pub fn failing(name: impl Into<String>, error: SearchError) -> Self {
        Self::with_response(name, CoordFrame::Wgs84, Err(error))
    }

    fn with_response(
        name: impl Into<String>,
        frame: CoordFrame,
        response: Result<Vec<PoiRecord>, SearchError>,
    ) -> Self {
        Self {
            name: name.into(),
            frame,
            response,
            delay: None,
            max_radius_meters: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report a backend radius cap of `meters`.
    pub fn with_max_radius_meters(mut self, meters: f64) -> Self {
        self.max_radius_meters = Some(meters);
        self
    }

    /// Number of searches received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request received.
    pub fn last_request(&self) -> Option<PoiSearchRequest> {
        self.last_request.lock().clone()
    }
}

impl AsyncPoiProvider for MockPoiProvider {
    async fn search(&self, request: &PoiSearchRequest) -> Result<Vec<PoiRecord>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn frame(&self) -> CoordFrame {
        self.frame
    }

    fn max_radius_meters(&self) -> Option<f64> {
        self.max_radius_meters
    }
}
