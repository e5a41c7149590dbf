//! Tianditu (天地图) nearby search.
//!
//! # Endpoint
//!
//! `https://api.tianditu.gov.cn/v2/search?postStr={json}&type=query&tk=..`
//!
//! `postStr` carries the query as JSON; `queryType: 3` selects a radius
//! search around `pointLonlat`.
//!
//! # Coordinate System
//!
//! CGCS2000, which agrees with WGS-84 well below survey precision, so the
//! provider is treated as WGS-84.

use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use super::types::{AsyncPoiProvider, PoiRecord, PoiSearchRequest, SearchError};
use super::AsyncHttpClient;
use crate::geo::{CoordFrame, GeoPoint};

const TIANDITU_SEARCH_URL: &str = "https://api.tianditu.gov.cn/v2/search";

/// Tianditu's "service OK" info code.
const INFOCODE_OK: i64 = 1000;

const MAX_PAGE_SIZE: usize = 100;

const NAME: &str = "tianditu";

/// Tianditu POI provider (WGS-84, token required).
pub struct TiandituProvider<C: AsyncHttpClient> {
    http_client: C,
    token: String,
}

impl<C: AsyncHttpClient> TiandituProvider<C> {
    /// Creates a new Tianditu provider.
    pub fn new(http_client: C, token: impl Into<String>) -> Self {
        Self {
            http_client,
            token: token.into(),
        }
    }

    fn build_url(&self, request: &PoiSearchRequest) -> Result<Url, SearchError> {
        let post = json!({
            "keyWord": request.keyword,
            "level": 12,
            "queryRadius": request.radius_meters.max(0.0).round() as u64,
            "pointLonlat": format!("{:.6},{:.6}", request.center.longitude, request.center.latitude),
            "queryType": 3,
            "start": 0,
            "count": request.limit.clamp(1, MAX_PAGE_SIZE),
        });

        Url::parse_with_params(
            TIANDITU_SEARCH_URL,
            &[
                ("postStr", post.to_string().as_str()),
                ("type", "query"),
                ("tk", self.token.as_str()),
            ],
        )
        .map_err(|e| SearchError::Http(format!("Invalid Tianditu URL: {}", e)))
    }
}

impl<C: AsyncHttpClient> AsyncPoiProvider for TiandituProvider<C> {
    async fn search(&self, request: &PoiSearchRequest) -> Result<Vec<PoiRecord>, SearchError> {
        let url = self.build_url(request)?;
        let body = self.http_client.get(url.as_str()).await?;
        parse_response(&body)
    }

    fn name(&self) -> &str {
        NAME
    }

    fn frame(&self) -> CoordFrame {
        CoordFrame::Wgs84
    }
}

#[derive(Debug, Deserialize)]
struct TiandituResponse {
    #[serde(default)]
    status: Option<TiandituStatus>,
    #[serde(default)]
    pois: Vec<TiandituPoi>,
}

#[derive(Debug, Deserialize)]
struct TiandituStatus {
    infocode: i64,
    #[serde(default)]
    cndesc: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TiandituPoi {
    name: String,
    lonlat: String,
    #[serde(default)]
    address: String,
    #[serde(default, rename = "hotPointID")]
    hot_point_id: String,
}

fn parse_response(body: &[u8]) -> Result<Vec<PoiRecord>, SearchError> {
    let response: TiandituResponse =
        serde_json::from_slice(body).map_err(|e| SearchError::InvalidResponse {
            provider: NAME.to_string(),
            message: e.to_string(),
        })?;

    if let Some(status) = &response.status {
        if status.infocode != INFOCODE_OK {
            return Err(SearchError::Provider {
                provider: NAME.to_string(),
                message: format!("{} ({})", status.cndesc, status.infocode),
            });
        }
    }

    let records = response
        .pois
        .into_iter()
        .filter_map(|poi| {
            let position = parse_lonlat(&poi.lonlat)?;
            let id = if poi.hot_point_id.is_empty() {
                format!("{}@{}", poi.name, poi.lonlat)
            } else {
                poi.hot_point_id
            };
            Some(PoiRecord::new(id, poi.name, position, poi.address))
        })
        .collect();
    Ok(records)
}

/// Tianditu separates longitude and latitude with a comma or a space.
fn parse_lonlat(text: &str) -> Option<GeoPoint> {
    let mut parts = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty());
    let lon: f64 = parts.next()?.parse().ok()?;
    let lat: f64 = parts.next()?.parse().ok()?;
    let point = GeoPoint::new(lat, lon);
    point.is_valid().then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::MockAsyncHttpClient;

    const SAMPLE: &str = r#"{
        "resultType": 1, "count": "2",
        "status": {"infocode": 1000, "cndesc": "服务正常"},
        "pois": [
            {"name": "天安门", "lonlat": "116.397,39.908", "address": "东长安街", "hotPointID": "H1"},
            {"name": "故宫", "lonlat": "116.3972 39.9163"}
        ]
    }"#;

    fn request() -> PoiSearchRequest {
        PoiSearchRequest {
            keyword: "天安门".to_string(),
            center: GeoPoint::new(39.9, 116.4),
            radius_meters: 2_000.0,
            limit: 50,
        }
    }

    #[test]
    fn test_provider_name_and_frame() {
        let provider = TiandituProvider::new(MockAsyncHttpClient::ok("{}"), "tk");
        assert_eq!(provider.name(), "tianditu");
        assert_eq!(provider.frame(), CoordFrame::Wgs84);
    }

    #[test]
    fn test_url_carries_post_str() {
        let provider = TiandituProvider::new(MockAsyncHttpClient::ok("{}"), "tok");
        let url = provider.build_url(&request()).unwrap();
        let post = url
            .query_pairs()
            .find(|(k, _)| k == "postStr")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let post: serde_json::Value = serde_json::from_str(&post).unwrap();

        assert_eq!(post["keyWord"], "天安门");
        assert_eq!(post["queryRadius"], 2000);
        assert_eq!(post["pointLonlat"], "116.400000,39.900000");
        assert_eq!(post["queryType"], 3);
        assert!(url.query_pairs().any(|(k, v)| k == "tk" && v == "tok"));
    }

    #[tokio::test]
    async fn test_search_parses_pois() {
        let provider = TiandituProvider::new(MockAsyncHttpClient::ok(SAMPLE), "tk");
        let records = provider.search(&request()).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "H1");
        assert_eq!(records[0].address, "东长安街");
        assert_eq!(records[1].name, "故宫");
        assert_eq!(records[1].latitude, 39.9163);
        assert_eq!(records[1].id, "故宫@116.3972 39.9163");
    }

    #[tokio::test]
    async fn test_search_reports_bad_status() {
        let body = r#"{"status": {"infocode": 1003, "cndesc": "参数错误"}}"#;
        let provider = TiandituProvider::new(MockAsyncHttpClient::ok(body), "tk");
        assert!(matches!(
            provider.search(&request()).await,
            Err(SearchError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_pois_is_empty() {
        let body = r#"{"status": {"infocode": 1000, "cndesc": "服务正常"}, "resultType": 1}"#;
        let provider = TiandituProvider::new(MockAsyncHttpClient::ok(body), "tk");
        assert!(provider.search(&request()).await.unwrap().is_empty());
    }
}
