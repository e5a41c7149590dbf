//! Provider construction from configuration.

use super::amap::AmapProvider;
use super::mock::MockPoiProvider;
use super::overpass::OverpassProvider;
use super::tianditu::TiandituProvider;
use super::types::{AsyncPoiProvider, PoiRecord, PoiSearchRequest, SearchError};
use super::{AsyncHttpClient, AsyncReqwestClient};
use crate::config::SearchSettings;
use crate::geo::CoordFrame;

/// Enum dispatch over the concrete providers.
///
/// Keeps the fallback chain a plain `Vec` without boxing futures.
pub enum PoiProviderType<C: AsyncHttpClient = AsyncReqwestClient> {
    Amap(AmapProvider<C>),
    Tianditu(TiandituProvider<C>),
    Overpass(OverpassProvider<C>),
    Mock(MockPoiProvider),
}

impl<C: AsyncHttpClient> AsyncPoiProvider for PoiProviderType<C> {
    async fn search(&self, request: &PoiSearchRequest) -> Result<Vec<PoiRecord>, SearchError> {
        match self {
            PoiProviderType::Amap(p) => p.search(request).await,
            PoiProviderType::Tianditu(p) => p.search(request).await,
            PoiProviderType::Overpass(p) => p.search(request).await,
            PoiProviderType::Mock(p) => p.search(request).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            PoiProviderType::Amap(p) => p.name(),
            PoiProviderType::Tianditu(p) => p.name(),
            PoiProviderType::Overpass(p) => p.name(),
            PoiProviderType::Mock(p) => p.name(),
        }
    }

    fn frame(&self) -> CoordFrame {
        match self {
            PoiProviderType::Amap(p) => p.frame(),
            PoiProviderType::Tianditu(p) => p.frame(),
            PoiProviderType::Overpass(p) => p.frame(),
            PoiProviderType::Mock(p) => p.frame(),
        }
    }

    fn max_radius_meters(&self) -> Option<f64> {
        match self {
            PoiProviderType::Amap(p) => p.max_radius_meters(),
            PoiProviderType::Tianditu(p) => p.max_radius_meters(),
            PoiProviderType::Overpass(p) => p.max_radius_meters(),
            PoiProviderType::Mock(p) => p.max_radius_meters(),
        }
    }
}

impl<C: AsyncHttpClient> From<MockPoiProvider> for PoiProviderType<C> {
    fn from(provider: MockPoiProvider) -> Self {
        PoiProviderType::Mock(provider)
    }
}

/// Builds providers that share one HTTP client.
pub struct PoiProviderFactory<C: AsyncHttpClient + Clone> {
    http_client: C,
}

impl<C: AsyncHttpClient + Clone> PoiProviderFactory<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    /// Create one provider by name.
    pub fn create(
        &self,
        name: &str,
        settings: &SearchSettings,
    ) -> Result<PoiProviderType<C>, SearchError> {
        let client = self.http_client.clone();
        match name.trim().to_ascii_lowercase().as_str() {
            "amap" => {
                let key = settings
                    .amap_key
                    .clone()
                    .ok_or_else(|| SearchError::MissingApiKey("amap".to_string()))?;
                Ok(PoiProviderType::Amap(AmapProvider::new(client, key)))
            }
            "tianditu" => {
                let token = settings
                    .tianditu_key
                    .clone()
                    .ok_or_else(|| SearchError::MissingApiKey("tianditu".to_string()))?;
                Ok(PoiProviderType::Tianditu(TiandituProvider::new(client, token)))
            }
            "overpass" => Ok(PoiProviderType::Overpass(OverpassProvider::new(client))),
            _ => Err(SearchError::UnknownProvider(name.to_string())),
        }
    }

    /// Create the configured fallback chain.
    ///
    /// Providers missing their API key are skipped with a warning; an
    /// unknown name is an error, as is ending up with no provider at all.
    pub fn create_chain(
        &self,
        settings: &SearchSettings,
    ) -> Result<Vec<PoiProviderType<C>>, SearchError> {
        let mut chain = Vec::with_capacity(settings.providers.len());
        for name in &settings.providers {
            match self.create(name, settings) {
                Ok(provider) => chain.push(provider),
                Err(SearchError::MissingApiKey(provider)) => {
                    tracing::warn!(provider = %provider, "POI provider skipped: no API key configured");
                }
                Err(e) => return Err(e),
            }
        }

        if chain.is_empty() {
            return Err(SearchError::NoProviders);
        }
        Ok(chain)
    }
}
