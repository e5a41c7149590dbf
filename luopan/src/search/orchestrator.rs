//! Sector search: provider fallback chain feeding the sector filter.
//!
//! # Flow
//!
//! ```text
//! SectorSearchRequest
//!   │ clamp radius to ceiling (flag)
//!   ▼
//! provider 1 ──error/empty──► provider 2 ──error/empty──► provider N
//!   │ first non-empty answer
//!   ▼
//! convert to caller frame ──► filter_in_sector ──► truncate to max_results
//! ```
//!
//! Only one search runs at a time per [`SectorSearch`]: starting a new one
//! cancels the previous one, which resolves to [`SearchError::Superseded`].

use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::types::{AsyncPoiProvider, PoiRecord, PoiSearchRequest, SearchError};
use crate::config::{SearchSettings, DEFAULT_MAX_RADIUS_KM, DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_TIMEOUT_SECS};
use crate::geo::{CoordFrame, FramedPoint};
use crate::sector::{filter_in_sector, SectorQuery};

/// Minimum number of records asked of a provider; the sector filter
/// discards some, so ask for more than will be returned.
const MIN_FETCH_LIMIT: usize = 100;

/// A keyword search restricted to a sector.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorSearchRequest {
    pub keyword: String,
    /// Sector and radius; the origin is in `frame`.
    pub sector: SectorQuery,
    /// Frame of the origin and of the returned records.
    pub frame: CoordFrame,
}

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Records inside the sector, in provider order, in the request frame.
    pub results: Vec<PoiRecord>,
    /// Provider that answered, `None` when every provider came back empty.
    pub provider: Option<String>,
    /// Whether the requested radius exceeded the ceiling or the answering
    /// provider's own cap.
    pub radius_clamped: bool,
    /// Radius actually searched: the clamped request, further limited by the
    /// answering provider's cap.
    pub radius_meters: f64,
}

/// Clamp a requested radius to `[0, ceiling]`, reporting whether the
/// ceiling was hit. Non-finite requests become 0.
pub fn clamp_radius(requested_meters: f64, ceiling_meters: f64) -> (f64, bool) {
    if !requested_meters.is_finite() || requested_meters <= 0.0 {
        return (0.0, false);
    }
    if requested_meters > ceiling_meters {
        (ceiling_meters, true)
    } else {
        (requested_meters, false)
    }
}

#[derive(Debug, Default)]
struct InFlight {
    next_generation: u64,
    current: Option<(u64, CancellationToken)>,
}

/// Runs sector searches over an ordered provider chain.
pub struct SectorSearch<P: AsyncPoiProvider> {
    providers: Vec<P>,
    max_results: usize,
    max_radius_meters: f64,
    provider_timeout: Duration,
    in_flight: Mutex<InFlight>,
}

impl<P: AsyncPoiProvider> SectorSearch<P> {
    /// Create with default limits (50 results, 250 km, 10 s per provider).
    pub fn new(providers: Vec<P>) -> Self {
        Self {
            providers,
            max_results: DEFAULT_MAX_RESULTS,
            max_radius_meters: DEFAULT_MAX_RADIUS_KM * 1_000.0,
            provider_timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    /// Create with limits taken from the `[search]` config section.
    pub fn from_settings(providers: Vec<P>, settings: &SearchSettings) -> Self {
        Self::new(providers)
            .with_max_results(settings.max_results)
            .with_max_radius_meters(settings.max_radius_meters())
            .with_provider_timeout(settings.timeout())
    }

    /// Lower the result cap. Values above the default cap are ignored.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.min(DEFAULT_MAX_RESULTS);
        self
    }

    /// Lower the radius ceiling. Values above the default ceiling (or not
    /// finite) are ignored.
    pub fn with_max_radius_meters(mut self, meters: f64) -> Self {
        let hard_ceiling = DEFAULT_MAX_RADIUS_KM * 1_000.0;
        self.max_radius_meters = if meters.is_finite() {
            meters.min(hard_ceiling)
        } else {
            hard_ceiling
        };
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn providers(&self) -> &[P] {
        &self.providers
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn max_radius_meters(&self) -> f64 {
        self.max_radius_meters
    }

    /// Cancel the in-flight search, if any.
    pub fn cancel_in_flight(&self) {
        if let Some((generation, token)) = self.in_flight.lock().current.take() {
            tracing::debug!(generation, "Sector search cancelled");
            token.cancel();
        }
    }

    /// Run a search, superseding any search still in flight.
    pub async fn search(&self, request: &SectorSearchRequest) -> Result<SearchOutcome, SearchError> {
        let (generation, token) = self.begin();

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(SearchError::Superseded),
            outcome = self.run(request) => outcome,
        };

        self.finish(generation);

        if token.is_cancelled() {
            tracing::debug!(generation, "Sector search superseded, dropping results");
            return Err(SearchError::Superseded);
        }
        result
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let mut in_flight = self.in_flight.lock();
        in_flight.next_generation += 1;
        let generation = in_flight.next_generation;

        if let Some((previous, old)) = in_flight.current.replace((generation, token.clone())) {
            tracing::debug!(previous, generation, "Superseding in-flight sector search");
            old.cancel();
        }
        (generation, token)
    }

    fn finish(&self, generation: u64) {
        let mut in_flight = self.in_flight.lock();
        if matches!(in_flight.current, Some((current, _)) if current == generation) {
            in_flight.current = None;
        }
    }

    async fn run(&self, request: &SectorSearchRequest) -> Result<SearchOutcome, SearchError> {
        if self.providers.is_empty() {
            return Err(SearchError::NoProviders);
        }

        let (radius, radius_clamped) =
            clamp_radius(request.sector.max_distance_meters, self.max_radius_meters);
        if radius_clamped {
            tracing::info!(
                requested = request.sector.max_distance_meters,
                clamped = radius,
                "Search radius clamped"
            );
        }
        let sector = SectorQuery {
            max_distance_meters: radius,
            ..request.sector
        };
        let origin = FramedPoint::new(sector.origin, request.frame);

        let mut failures: Vec<String> = Vec::new();
        let mut answered = false;

        for provider in &self.providers {
            let provider_request = PoiSearchRequest {
                keyword: request.keyword.clone(),
                center: origin.to_frame(provider.frame()).point,
                radius_meters: radius,
                limit: self.max_results.max(MIN_FETCH_LIMIT),
            };

            let records = match tokio::time::timeout(
                self.provider_timeout,
                provider.search(&provider_request),
            )
            .await
            {
                Ok(Ok(records)) => records,
                Ok(Err(e)) => {
                    tracing::warn!(provider = provider.name(), error = %e, "POI provider failed, trying next");
                    failures.push(format!("{}: {}", provider.name(), e));
                    continue;
                }
                Err(_) => {
                    let e = SearchError::Timeout {
                        provider: provider.name().to_string(),
                        secs: self.provider_timeout.as_secs(),
                    };
                    tracing::warn!(provider = provider.name(), error = %e, "POI provider timed out, trying next");
                    failures.push(e.to_string());
                    continue;
                }
            };

            answered = true;
            if records.is_empty() {
                tracing::debug!(provider = provider.name(), "POI provider returned nothing, trying next");
                continue;
            }

            let raw = records.len();
            let converted: Vec<PoiRecord> = records
                .into_iter()
                .map(|record| {
                    let point = FramedPoint::new(record.point(), provider.frame())
                        .to_frame(request.frame)
                        .point;
                    record.with_point(point)
                })
                .collect();

            let mut results = filter_in_sector(&converted, &sector);
            results.truncate(self.max_results);

            tracing::info!(
                provider = provider.name(),
                keyword = %request.keyword,
                raw,
                kept = results.len(),
                "Sector search complete"
            );

            let (searched, provider_capped) = match provider.max_radius_meters() {
                Some(cap) if cap < radius => (cap, true),
                _ => (radius, false),
            };
            if provider_capped {
                tracing::info!(
                    provider = provider.name(),
                    requested = radius,
                    searched,
                    "Provider capped search radius"
                );
            }

            return Ok(SearchOutcome {
                results,
                provider: Some(provider.name().to_string()),
                radius_clamped: radius_clamped || provider_capped,
                radius_meters: searched,
            });
        }

        if !answered {
            return Err(SearchError::AllProvidersFailed(failures.join("; ")));
        }

        tracing::info!(keyword = %request.keyword, "Sector search found nothing");
        Ok(SearchOutcome {
            results: Vec::new(),
            provider: None,
            radius_clamped,
            radius_meters: radius,
        })
    }
}
