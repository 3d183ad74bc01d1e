// SPDX-License-Identifier: Apache-2.0

use crate::place::{ExternalPlaceId, ParseError};
use serde::{Deserialize, Serialize};

/// A point in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self, ParseError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ParseError::OutOfRange("lat must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(ParseError::OutOfRange("lng must be within [-180, 180]"));
        }
        Ok(Self { lat, lng })
    }
}

/// A place description returned by the external provider, not yet persisted
/// locally. Input shape of the reconciliation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub external_id: ExternalPlaceId,
    pub name: String,
    pub formatted_address: Option<String>,
    pub location: GeoPoint,
    #[serde(default)]
    pub categories: Vec<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<i64>,
}

impl PlaceCandidate {
    /// Minimal candidate for tests and single-field provider payloads.
    #[must_use]
    pub fn bare(external_id: ExternalPlaceId, name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            external_id,
            name: name.into(),
            formatted_address: None,
            location,
            categories: Vec::new(),
            rating: None,
            rating_count: None,
        }
    }
}
