//! AMap (Gaode) place-around search.
//!
//! # Endpoint
//!
//! `https://restapi.amap.com/v3/place/around?key=..&location={lon},{lat}&keywords=..&radius=..`
//!
//! # Coordinate System
//!
//! AMap works in GCJ-02 for both the request centre and returned locations.
//!
//! # Response
//!
//! ```json
//! {"status":"1","info":"OK","pois":[
//!   {"id":"B000A7BD6C","name":"国贸大厦","location":"116.458,39.909","address":"建国门外大街1号"}
//! ]}
//! ```
//!
//! Empty string fields come back as `[]`, so `address` is read loosely.

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use super::types::{AsyncPoiProvider, PoiRecord, PoiSearchRequest, SearchError};
use super::AsyncHttpClient;
use crate::geo::{CoordFrame, GeoPoint};

const AMAP_AROUND_URL: &str = "https://restapi.amap.com/v3/place/around";

/// AMap caps place-around radius at 50 km.
const MAX_RADIUS_METERS: f64 = 50_000.0;

/// AMap caps page size at 25.
const MAX_PAGE_SIZE: usize = 25;

const NAME: &str = "amap";

/// AMap POI provider (GCJ-02, API key required).
pub struct AmapProvider<C: AsyncHttpClient> {
    http_client: C,
    api_key: String,
}

impl<C: AsyncHttpClient> AmapProvider<C> {
    /// Creates a new AMap provider.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client for making requests
    /// * `api_key` - AMap Web Service key
    pub fn new(http_client: C, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
        }
    }

    fn build_url(&self, request: &PoiSearchRequest) -> Result<Url, SearchError> {
        let location = format!(
            "{:.6},{:.6}",
            request.center.longitude, request.center.latitude
        );
        let radius = request.radius_meters.clamp(0.0, MAX_RADIUS_METERS).round() as u64;
        let offset = request.limit.clamp(1, MAX_PAGE_SIZE);

        Url::parse_with_params(
            AMAP_AROUND_URL,
            &[
                ("key", self.api_key.as_str()),
                ("location", location.as_str()),
                ("keywords", request.keyword.as_str()),
                ("radius", radius.to_string().as_str()),
                ("offset", offset.to_string().as_str()),
                ("page", "1"),
                ("extensions", "base"),
            ],
        )
        .map_err(|e| SearchError::Http(format!("Invalid AMap URL: {}", e)))
    }
}

impl<C: AsyncHttpClient> AsyncPoiProvider for AmapProvider<C> {
    async fn search(&self, request: &PoiSearchRequest) -> Result<Vec<PoiRecord>, SearchError> {
        let url = self.build_url(request)?;
        let body = self.http_client.get(url.as_str()).await?;
        parse_response(&body)
    }

    fn name(&self) -> &str {
        NAME
    }

    fn frame(&self) -> CoordFrame {
        CoordFrame::Gcj02
    }

    fn max_radius_meters(&self) -> Option<f64> {
        Some(MAX_RADIUS_METERS)
    }
}

#[derive(Debug, Deserialize)]
struct AmapResponse {
    status: String,
    #[serde(default)]
    info: String,
    #[serde(default)]
    pois: Vec<AmapPoi>,
}

#[derive(Debug, Deserialize)]
struct AmapPoi {
    id: String,
    name: String,
    location: String,
    #[serde(default)]
    address: Value,
}

fn parse_response(body: &[u8]) -> Result<Vec<PoiRecord>, SearchError> {
    let response: AmapResponse =
        serde_json::from_slice(body).map_err(|e| SearchError::InvalidResponse {
            provider: NAME.to_string(),
            message: e.to_string(),
        })?;

    if response.status != "1" {
        return Err(SearchError::Provider {
            provider: NAME.to_string(),
            message: response.info,
        });
    }

    let mut records = Vec::with_capacity(response.pois.len());
    for poi in response.pois {
        let Some(position) = parse_lon_lat(&poi.location) else {
            tracing::debug!(id = %poi.id, location = %poi.location, "AMap: skipping POI without location");
            continue;
        };
        let address = match poi.address {
            Value::String(s) => s,
            _ => String::new(),
        };
        records.push(PoiRecord::new(poi.id, poi.name, position, address));
    }
    Ok(records)
}

/// Parse a `"lon,lat"` pair.
pub(crate) fn parse_lon_lat(text: &str) -> Option<GeoPoint> {
    let (lon, lat) = text.split_once(',')?;
    let point = GeoPoint::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?);
    point.is_valid().then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MockAsyncHttpClient;

    const SAMPLE: &str = r#"{
        "status": "1", "info": "OK", "count": "2",
        "pois": [
            {"id": "B000A7BD6C", "name": "国贸大厦", "location": "116.458,39.909", "address": "建国门外大街1号"},
            {"id": "B0FFG", "name": "无地址", "location": "116.460,39.910", "address": []},
            {"id": "BAD", "name": "坏坐标", "location": "", "address": "x"}
        ]
    }"#;

    fn request() -> PoiSearchRequest {
        PoiSearchRequest {
            keyword: "大厦".to_string(),
            center: GeoPoint::new(39.909, 116.397),
            radius_meters: 120_000.0,
            limit: 50,
        }
    }

    #[test]
    fn test_reports_radius_cap() {
        let provider = AmapProvider::new(MockAsyncHttpClient::ok("{}"), "key");
        assert_eq!(provider.max_radius_meters(), Some(50_000.0));
    }

    #[test]
    fn test_provider_name_and_frame() {
        let provider = AmapProvider::new(MockAsyncHttpClient::ok("{}"), "k");
        assert_eq!(provider.name(), "amap");
        assert_eq!(provider.frame(), CoordFrame::Gcj02);
    }

    #[test]
    fn test_url_construction() {
        let provider = AmapProvider::new(MockAsyncHttpClient::ok("{}"), "my-key");
        let url = provider.build_url(&request()).unwrap();
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        let get = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(url.host_str(), Some("restapi.amap.com"));
        assert_eq!(get("key"), "my-key");
        assert_eq!(get("location"), "116.397000,39.909000");
        assert_eq!(get("keywords"), "大厦");
        assert_eq!(get("radius"), "50000");
        assert_eq!(get("offset"), "25");
    }

    #[tokio::test]
    async fn test_search_parses_pois() {
        let provider = AmapProvider::new(MockAsyncHttpClient::ok(SAMPLE), "k");
        let records = provider.search(&request()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "国贸大厦");
        assert_eq!(records[0].latitude, 39.909);
        assert_eq!(records[0].longitude, 116.458);
        assert_eq!(records[0].address, "建国门外大街1号");
        assert_eq!(records[1].address, "");
    }

    #[tokio::test]
    async fn test_search_reports_api_error() {
        let body = r#"{"status":"0","info":"INVALID_USER_KEY","infocode":"10001"}"#;
        let provider = AmapProvider::new(MockAsyncHttpClient::ok(body), "bad");
        match provider.search(&request()).await {
            Err(SearchError::Provider { provider, message }) => {
                assert_eq!(provider, "amap");
                assert_eq!(message, "INVALID_USER_KEY");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_rejects_garbage() {
        let provider = AmapProvider::new(MockAsyncHttpClient::ok("<html>"), "k");
        assert!(matches!(
            provider.search(&request()).await,
            Err(SearchError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_parse_lon_lat() {
        assert_eq!(
            parse_lon_lat("116.4,39.9"),
            Some(GeoPoint::new(39.9, 116.4))
        );
        assert_eq!(parse_lon_lat("116.4"), None);
        assert_eq!(parse_lon_lat("200,39.9"), None);
    }
}
