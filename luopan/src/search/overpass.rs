//! OpenStreetMap search through the Overpass API.
//!
//! The open-data fallback: no key, global coverage, WGS-84 coordinates.
//! The keyword is matched case-insensitively against the `name` tag of
//! nodes, ways and relations within the radius.

use std::collections::HashMap;

use reqwest::Url;
use serde::Deserialize;

use super::types::{AsyncPoiProvider, PoiRecord, PoiSearchRequest, SearchError};
use super::AsyncHttpClient;
use crate::geo::{CoordFrame, GeoPoint};

/// Public Overpass instance.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Server-side query timeout, in seconds.
const QUERY_TIMEOUT_SECS: u64 = 10;

const NAME: &str = "overpass";

/// Overpass POI provider (WGS-84, no key).
pub struct OverpassProvider<C: AsyncHttpClient> {
    http_client: C,
    endpoint: String,
}

impl<C: AsyncHttpClient> OverpassProvider<C> {
    /// Creates a provider against the public Overpass instance.
    pub fn new(http_client: C) -> Self {
        Self::with_endpoint(http_client, DEFAULT_OVERPASS_URL)
    }

    /// Creates a provider against a custom Overpass instance.
    pub fn with_endpoint(http_client: C, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    fn build_url(&self, request: &PoiSearchRequest) -> Result<Url, SearchError> {
        let query = build_query(request);
        Url::parse_with_params(&self.endpoint, &[("data", query.as_str())])
            .map_err(|e| SearchError::Http(format!("Invalid Overpass URL: {}", e)))
    }
}

impl<C: AsyncHttpClient> AsyncPoiProvider for OverpassProvider<C> {
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

/// Overpass QL for a case-insensitive name match around the centre.
fn build_query(request: &PoiSearchRequest) -> String {
    format!(
        "[out:json][timeout:{}];nwr[\"name\"~\"{}\",i](around:{},{:.6},{:.6});out center {};",
        QUERY_TIMEOUT_SECS,
        escape_regex(&request.keyword),
        request.radius_meters.max(0.0).round() as u64,
        request.center.latitude,
        request.center.longitude,
        request.limit.max(1),
    )
}

/// Escape a literal keyword for use inside an Overpass QL regex string.
fn escape_regex(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' => {
                // QL string escape of the regex escape
                escaped.push_str("\\\\");
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn position(&self) -> Option<GeoPoint> {
        let point = match (&self.center, self.lat, self.lon) {
            (_, Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
            (Some(center), _, _) => GeoPoint::new(center.lat, center.lon),
            _ => return None,
        };
        point.is_valid().then_some(point)
    }

    fn address(&self) -> String {
        if let Some(full) = self.tags.get("addr:full") {
            return full.clone();
        }
        ["addr:city", "addr:street", "addr:housenumber"]
            .iter()
            .filter_map(|key| self.tags.get(*key).map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn parse_response(body: &[u8]) -> Result<Vec<PoiRecord>, SearchError> {
    let response: OverpassResponse =
        serde_json::from_slice(body).map_err(|e| SearchError::InvalidResponse {
            provider: NAME.to_string(),
            message: e.to_string(),
        })?;

    // Overpass reports query timeouts as a remark alongside partial data
    if response.elements.is_empty() {
        if let Some(remark) = response.remark.filter(|r| r.contains("error")) {
            return Err(SearchError::Provider {
                provider: NAME.to_string(),
                message: remark,
            });
        }
    }

    let records = response
        .elements
        .iter()
        .filter_map(|element| {
            let name = element.tags.get("name")?;
            let position = element.position()?;
            Some(PoiRecord::new(
                format!("{}/{}", element.kind, element.id),
                name.clone(),
                position,
                element.address(),
            ))
        })
        .collect();
    Ok(records)
}
