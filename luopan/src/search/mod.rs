//! POI search restricted to a compass sector.
//!
//! Providers are queried in a configured fallback order; the first one that
//! returns anything wins. Its records are converted into the caller's
//! coordinate frame, filtered to the sector and capped.
//!
//! | Provider   | Frame  | Key      |
//! |------------|--------|----------|
//! | `amap`     | GCJ-02 | required |
//! | `tianditu` | WGS-84 | required |
//! | `overpass` | WGS-84 | none     |
//!
//! # Example
//!
//! ```ignore
//! use luopan::config::ConfigFile;
//! use luopan::search::{AsyncReqwestClient, PoiProviderFactory, SectorSearch};
//!
//! let config = ConfigFile::load()?;
//! let factory = PoiProviderFactory::new(AsyncReqwestClient::with_timeout(config.search.timeout_secs)?);
//! let search = SectorSearch::from_settings(factory.create_chain(&config.search)?, &config.search);
//! let outcome = search.search(&request).await?;
//! ```

mod amap;
mod factory;
mod http;
mod mock;
mod orchestrator;
mod overpass;
mod tianditu;
mod types;

pub use amap::AmapProvider;
pub use factory::{PoiProviderFactory, PoiProviderType};
pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use mock::MockPoiProvider;
pub use orchestrator::{clamp_radius, SearchOutcome, SectorSearch, SectorSearchRequest};
pub use overpass::{OverpassProvider, DEFAULT_OVERPASS_URL};
pub use tianditu::TiandituProvider;
pub use types::{AsyncPoiProvider, PoiRecord, PoiSearchRequest, SearchError};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
