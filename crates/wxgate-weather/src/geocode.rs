//! Forward and reverse geocoding against Nominatim (OpenStreetMap).
//! Free, no API key required, but a descriptive User-Agent is mandatory.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::error::UpstreamError;
use crate::types::{PlaceDetail, PlaceMatch};

/// Nominatim is always asked for this many search results.
pub const SEARCH_PAGE_SIZE: usize = 5;

const SEARCH_SERVICE: &str = "Nominatim search";
const REVERSE_SERVICE: &str = "Nominatim reverse";

#[derive(Debug, Deserialize)]
struct NominatimSearchItem {
    display_name: String,
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverseResponse {
    display_name: String,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

impl NominatimSearchItem {
    fn into_place(self) -> Result<PlaceMatch, UpstreamError> {
        Ok(PlaceMatch {
            lat: parse_coordinate(&self.lat, "lat")?,
            lon: parse_coordinate(&self.lon, "lon")?,
            name: self.display_name,
        })
    }
}

impl NominatimReverseResponse {
    fn into_detail(self) -> PlaceDetail {
        let addr = self.address.unwrap_or_default();
        PlaceDetail {
            name: self.display_name,
            // First of city > town > village wins
            city: addr.city.or(addr.town).or(addr.village),
            country: addr.country,
        }
    }
}

fn parse_coordinate(raw: &str, field: &str) -> Result<f64, UpstreamError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| UpstreamError::InvalidResponse {
            service: SEARCH_SERVICE,
            reason: format!("{} is not a number: {:?}", field, raw),
        })
}

#[derive(Debug, Clone)]
pub struct PlaceResolver {
    client: Client,
    base_url: String,
}

impl PlaceResolver {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, UpstreamError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Free-text search. Returns at most [`SEARCH_PAGE_SIZE`] matches.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, query: &str) -> Result<Vec<PlaceMatch>, UpstreamError> {
        let url = format!("{}/search", self.base_url);
        let limit = SEARCH_PAGE_SIZE.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", limit.as_str())])
            .send()
            .await?;

        let items: Vec<NominatimSearchItem> = decode(response, SEARCH_SERVICE).await?;
        tracing::debug!("Nominatim search returned {} items", items.len());

        items
            .into_iter()
            .map(NominatimSearchItem::into_place)
            .collect()
    }

    /// Coordinates to a place name with city and country where known.
    #[instrument(skip(self), level = "info")]
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<PlaceDetail, UpstreamError> {
        let url = format!("{}/reverse", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("format", "jsonv2".to_string()),
            ])
            .send()
            .await?;

        let body: NominatimReverseResponse = decode(response, REVERSE_SERVICE).await?;
        let place = body.into_detail();
        tracing::info!("Reverse geocoded to: {}", place.name);
        Ok(place)
    }
}

/// Check the status, then parse the body strictly into `T`.
async fn decode<T: DeserializeOwned>(
    response: Response,
    service: &'static str,
) -> Result<T, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        tracing::debug!("{} returned status {}", service, status);
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("{} parse error: {}", service, e);
        UpstreamError::InvalidResponse {
            service,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver_for(server: &MockServer) -> PlaceResolver {
        PlaceResolver::new(&server.uri(), "wxgate-test/1.0", None).unwrap()
    }

    fn reverse_body(address: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "display_name": "Somewhere, Earth",
            "address": address
        })
    }

    #[tokio::test]
    async fn test_search_maps_items() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Tempe"))
            .and(query_param("format", "jsonv2"))
            .and(query_param("limit", "5"))
            .and(header("User-Agent", "wxgate-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"display_name": "Tempe, Arizona, United States", "lat": "33.4255", "lon": "-111.9400", "importance": 0.6},
                {"display_name": "Tempe Town Lake", "lat": "33.43", "lon": "-111.93"}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let places = resolver_for(&mock_server).search("Tempe").await.unwrap();

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Tempe, Arizona, United States");
        assert_eq!(places[0].lat, 33.4255);
        assert_eq!(places[0].lon, -111.94);
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_shape() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"display_name": "No coordinates"}
            ])))
            .mount(&mock_server)
            .await;

        let err = resolver_for(&mock_server).search("nowhere").await.unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::InvalidResponse { service: SEARCH_SERVICE, .. }
        ));
    }

    #[tokio::test]
    async fn test_search_rejects_numeric_coordinates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"display_name": "Typed", "lat": 1.0, "lon": 2.0}
            ])))
            .mount(&mock_server)
            .await;

        let result = resolver_for(&mock_server).search("typed").await;
        assert!(matches!(result, Err(UpstreamError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_search_rejects_unparseable_coordinate() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"display_name": "Broken", "lat": "north", "lon": "2.0"}
            ])))
            .mount(&mock_server)
            .await;

        let err = resolver_for(&mock_server).search("broken").await.unwrap_err();
        assert!(err.to_string().contains("lat"));
    }

    #[tokio::test]
    async fn test_search_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let err = resolver_for(&mock_server).search("Tempe").await.unwrap_err();
        assert_eq!(err.to_string(), "Nominatim search error 429");
    }

    #[tokio::test]
    async fn test_reverse_prefers_city() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "47.6062"))
            .and(query_param("lon", "-122.3321"))
            .and(query_param("format", "jsonv2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reverse_body(
                serde_json::json!({"city": "A", "town": "B", "country": "C"}),
            )))
            .mount(&mock_server)
            .await;

        let place = resolver_for(&mock_server)
            .reverse(47.6062, -122.3321)
            .await
            .unwrap();

        assert_eq!(place.name, "Somewhere, Earth");
        assert_eq!(place.city.as_deref(), Some("A"));
        assert_eq!(place.country.as_deref(), Some("C"));
    }

    #[tokio::test]
    async fn test_reverse_falls_back_to_town() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reverse_body(
                serde_json::json!({"town": "X", "country": "Y"}),
            )))
            .mount(&mock_server)
            .await;

        let place = resolver_for(&mock_server).reverse(1.0, 2.0).await.unwrap();
        assert_eq!(place.city.as_deref(), Some("X"));
        assert_eq!(place.country.as_deref(), Some("Y"));
    }

    #[tokio::test]
    async fn test_reverse_without_address() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "display_name": "Open water"
            })))
            .mount(&mock_server)
            .await;

        let place = resolver_for(&mock_server).reverse(0.0, 0.0).await.unwrap();
        assert_eq!(place.city, None);
        assert_eq!(place.country, None);
    }

    #[tokio::test]
    async fn test_reverse_error_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        // Nominatim answers 200 with an error object when nothing is found
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Unable to geocode"
            })))
            .mount(&mock_server)
            .await;

        let err = resolver_for(&mock_server).reverse(0.0, 0.0).await.unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::InvalidResponse { service: REVERSE_SERVICE, .. }
        ));
    }

    #[tokio::test]
    async fn test_reverse_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let err = resolver_for(&mock_server).reverse(0.0, 0.0).await.unwrap_err();
        assert_eq!(err.to_string(), "Nominatim reverse error 500");
    }

    #[test]
    fn test_address_fallback_order() {
        let detail = NominatimReverseResponse {
            display_name: "n".into(),
            address: Some(NominatimAddress {
                village: Some("V".into()),
                ..Default::default()
            }),
        }
        .into_detail();
        assert_eq!(detail.city.as_deref(), Some("V"));
        assert_eq!(detail.country, None);
    }
}
