// SPDX-License-Identifier: Apache-2.0

use crate::{PlaceSource, ProviderError, ProviderResult};
use async_trait::async_trait;
use curbmap_model::{ExternalPlaceId, GeoPoint, PlaceCandidate};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
const STATUS_NOT_FOUND: &str = "NOT_FOUND";

#[derive(Debug, Clone)]
pub struct HttpPlaceSourceConfig {
    pub base_url: String,
    pub api_key: String,
    /// Appended to every textual query to keep results regional.
    pub region_keyword: String,
    pub timeout: Duration,
}

/// Reqwest-backed adapter for a Places-style JSON API.
pub struct HttpPlaceSource {
    client: reqwest::Client,
    cfg: HttpPlaceSourceConfig,
}

impl HttpPlaceSource {
    pub fn new(cfg: HttpPlaceSourceConfig) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self { client, cfg })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ProviderResult<T> {
        let url = format!("{}/{path}", self.cfg.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("key", self.cfg.api_key.as_str())])
            .send()
            .await
            .map_err(classify_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        response.json::<T>().await.map_err(classify_reqwest)
    }
}

fn classify_reqwest(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_decode() {
        ProviderError::Decode(err.to_string())
    } else {
        ProviderError::Transport(err.to_string())
    }
}

#[async_trait]
impl PlaceSource for HttpPlaceSource {
    async fn get_details(
        &self,
        external_id: &ExternalPlaceId,
    ) -> ProviderResult<Option<PlaceCandidate>> {
        let envelope: DetailsEnvelope = self
            .get_json(
                "details/json",
                &[("place_id", external_id.as_str().to_string())],
            )
            .await?;
        match envelope.status.as_str() {
            STATUS_OK => {
                let wire = envelope
                    .result
                    .ok_or_else(|| ProviderError::Decode("OK status without result".to_string()))?;
                candidate_from_wire(wire)
                    .map(Some)
                    .ok_or_else(|| ProviderError::Decode("unusable place in result".to_string()))
            }
            STATUS_NOT_FOUND | STATUS_ZERO_RESULTS => Ok(None),
            other => Err(ProviderError::Upstream(other.to_string())),
        }
    }

    async fn search_nearby(
        &self,
        center: GeoPoint,
        radius_meters: u32,
        place_type: Option<&str>,
        keyword: Option<&str>,
    ) -> ProviderResult<Vec<PlaceCandidate>> {
        let mut query: Vec<(&str, String)> = vec![
            ("location", format!("{},{}", center.lat, center.lng)),
            ("radius", radius_meters.to_string()),
        ];
        if let Some(place_type) = place_type {
            query.push(("type", place_type.to_string()));
        }
        if let Some(keyword) = keyword {
            query.push(("keyword", keyword.to_string()));
        }
        let envelope: SearchEnvelope = self.get_json("nearbysearch/json", &query).await?;
        candidates_from_envelope(envelope)
    }

    async fn search_by_text(
        &self,
        query: &str,
        near: Option<GeoPoint>,
        radius_meters: Option<u32>,
    ) -> ProviderResult<Vec<PlaceCandidate>> {
        let regional_query = format!("{query} {}", self.cfg.region_keyword);
        let mut params: Vec<(&str, String)> = vec![("query", regional_query)];
        if let Some(near) = near {
            params.push(("location", format!("{},{}", near.lat, near.lng)));
        }
        if let Some(radius) = radius_meters {
            params.push(("radius", radius.to_string()));
        }
        let envelope: SearchEnvelope = self.get_json("textsearch/json", &params).await?;
        candidates_from_envelope(envelope)
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    status: String,
    #[serde(default)]
    results: Vec<WirePlace>,
}

#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    status: String,
    result: Option<WirePlace>,
}

#[derive(Debug, Deserialize)]
struct WirePlace {
    place_id: String,
    name: String,
    #[serde(alias = "vicinity")]
    formatted_address: Option<String>,
    geometry: WireGeometry,
    #[serde(default)]
    types: Vec<String>,
    rating: Option<f64>,
    user_ratings_total: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    location: WireLocation,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    lat: f64,
    lng: f64,
}

fn candidates_from_envelope(envelope: SearchEnvelope) -> ProviderResult<Vec<PlaceCandidate>> {
    match envelope.status.as_str() {
        STATUS_OK | STATUS_ZERO_RESULTS => Ok(envelope
            .results
            .into_iter()
            .filter_map(candidate_from_wire)
            .collect()),
        other => Err(ProviderError::Upstream(other.to_string())),
    }
}

/// Converts one wire record, dropping records with ids or coordinates the
/// domain model rejects.
fn candidate_from_wire(wire: WirePlace) -> Option<PlaceCandidate> {
    let external_id = match ExternalPlaceId::parse(&wire.place_id) {
        Ok(id) => id,
        Err(e) => {
            warn!(place_id = %wire.place_id, error = %e, "skipping provider record");
            return None;
        }
    };
    let location = match GeoPoint::new(wire.geometry.location.lat, wire.geometry.location.lng) {
        Ok(point) => point,
        Err(e) => {
            warn!(place_id = %wire.place_id, error = %e, "skipping provider record");
            return None;
        }
    };
    Some(PlaceCandidate {
        external_id,
        name: wire.name,
        formatted_address: wire.formatted_address,
        location,
        categories: wire.types,
        rating: wire.rating,
        rating_count: wire.user_ratings_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_envelope_decodes_and_skips_unusable_records() {
        let body = r#"{
            "status": "OK",
            "results": [
                {
                    "place_id": "ext-1",
                    "name": "Dockside Cafe",
                    "formatted_address": "1 Dock Rd, Meervale",
                    "geometry": {"location": {"lat": -23.55, "lng": -46.63}},
                    "types": ["cafe"],
                    "rating": 4.4,
                    "user_ratings_total": 120
                },
                {
                    "place_id": "ext-2",
                    "name": "Broken",
                    "geometry": {"location": {"lat": 99.0, "lng": 0.0}}
                }
            ]
        }"#;
        let envelope: SearchEnvelope = serde_json::from_str(body).expect("decode");
        let candidates = candidates_from_envelope(envelope).expect("candidates");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].external_id.as_str(), "ext-1");
        assert_eq!(candidates[0].rating_count, Some(120));
    }

    #[test]
    fn nearby_vicinity_maps_to_formatted_address() {
        let body = r#"{
            "status": "OK",
            "results": [{
                "place_id": "ext-3",
                "name": "Corner Shop",
                "vicinity": "Meervale",
                "geometry": {"location": {"lat": -23.5, "lng": -46.6}}
            }]
        }"#;
        let envelope: SearchEnvelope = serde_json::from_str(body).expect("decode");
        let candidates = candidates_from_envelope(envelope).expect("candidates");
        assert_eq!(
            candidates[0].formatted_address.as_deref(),
            Some("Meervale")
        );
    }

    #[test]
    fn zero_results_is_an_empty_set_not_an_error() {
        let envelope: SearchEnvelope =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).expect("decode");
        assert!(candidates_from_envelope(envelope).expect("ok").is_empty());
    }

    #[test]
    fn rejecting_status_is_upstream_and_retryable() {
        let envelope: SearchEnvelope =
            serde_json::from_str(r#"{"status": "OVER_QUERY_LIMIT", "results": []}"#)
                .expect("decode");
        let err = candidates_from_envelope(envelope).expect_err("rejected");
        assert_eq!(err, ProviderError::Upstream("OVER_QUERY_LIMIT".to_string()));
        assert!(err.is_retryable());
    }
}
