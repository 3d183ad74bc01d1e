// SPDX-License-Identifier: Apache-2.0

use curbmap_model::Place;
use curbmap_query::{AccessibilityStats, FieldStats, ListedPlace, ListingResponse, Pagination};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDto {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub categories: Vec<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Place> for PlaceDto {
    fn from(place: Place) -> Self {
        Self {
            id: place.id.0,
            external_id: place.external_id.as_str().to_string(),
            name: place.name,
            address: place.address,
            lat: place.lat,
            lng: place.lng,
            categories: place.categories,
            rating: place.rating,
            rating_count: place.rating_count,
            created_at: place.created_at,
            updated_at: place.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedPlaceDto {
    #[serde(flatten)]
    pub place: PlaceDto,
    pub reports_count: i64,
    pub votes_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorited_at: Option<i64>,
}

impl From<ListedPlace> for ListedPlaceDto {
    fn from(item: ListedPlace) -> Self {
        Self {
            place: item.place.into(),
            reports_count: item.reports_count,
            votes_count: item.votes_count,
            favorited_at: item.favorited_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationDto {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl From<Pagination> for PaginationDto {
    fn from(p: Pagination) -> Self {
        Self {
            page: p.page,
            limit: p.limit,
            total: p.total,
            total_pages: p.total_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPlacesResponseDto {
    pub items: Vec<ListedPlaceDto>,
    pub pagination: PaginationDto,
}

impl From<ListingResponse> for ListPlacesResponseDto {
    fn from(response: ListingResponse) -> Self {
        Self {
            items: response.items.into_iter().map(Into::into).collect(),
            pagination: response.pagination.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStatsDto {
    pub percentage: f64,
    pub has_majority: bool,
    pub positive_count: i64,
    pub total_count: i64,
}

impl From<FieldStats> for FieldStatsDto {
    fn from(f: FieldStats) -> Self {
        Self {
            percentage: f.percentage,
            has_majority: f.has_majority,
            positive_count: f.positive_count,
            total_count: f.total_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityStatsDto {
    pub place_id: i64,
    pub total_reports: i64,
    pub ramp: FieldStatsDto,
    pub accessible_restroom: FieldStatsDto,
    pub accessible_parking: FieldStatsDto,
    pub visual_aids: FieldStatsDto,
}

impl From<AccessibilityStats> for AccessibilityStatsDto {
    fn from(stats: AccessibilityStats) -> Self {
        Self {
            place_id: stats.place_id.0,
            total_reports: stats.total_reports,
            ramp: stats.ramp.into(),
            accessible_restroom: stats.accessible_restroom.into(),
            accessible_parking: stats.accessible_parking.into(),
            visual_aids: stats.visual_aids.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curbmap_model::{ExternalPlaceId, PlaceId};

    fn place() -> Place {
        Place {
            id: PlaceId(3),
            external_id: ExternalPlaceId::parse("ext-3").expect("id"),
            name: "Dockside Cafe".to_string(),
            address: None,
            lat: -23.55,
            lng: -46.63,
            categories: vec!["cafe".to_string()],
            rating: Some(4.4),
            rating_count: Some(120),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_000,
        }
    }

    #[test]
    fn listed_place_flattens_and_omits_absent_favorite() {
        let dto = ListedPlaceDto {
            place: place().into(),
            reports_count: 2,
            votes_count: 5,
            favorited_at: None,
        };
        let value = serde_json::to_value(&dto).expect("serialize");
        assert_eq!(value["external_id"], "ext-3");
        assert_eq!(value["reports_count"], 2);
        assert!(value.get("favorited_at").is_none());
    }

    #[test]
    fn favorited_at_appears_when_present() {
        let dto = ListedPlaceDto {
            place: place().into(),
            reports_count: 0,
            votes_count: 0,
            favorited_at: Some(1_700_000_900),
        };
        let value = serde_json::to_value(&dto).expect("serialize");
        assert_eq!(value["favorited_at"], 1_700_000_900);
    }
}
