// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiError;
use curbmap_query::{ListFilter, SortDirection, SortKey};
use std::collections::BTreeMap;

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;
pub const MAX_RADIUS_METERS: u32 = 50_000;
pub const MAX_SEARCH_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPlacesParams {
    pub filter: ListFilter,
    pub sort: SortKey,
    pub order: SortDirection,
    pub page: u64,
    pub limit: u64,
}

pub fn parse_list_places_params(
    query: &BTreeMap<String, String>,
) -> Result<ListPlacesParams, ApiError> {
    parse_list_places_params_with_limit(query, DEFAULT_LIMIT, MAX_LIMIT)
}

pub fn parse_list_places_params_with_limit(
    query: &BTreeMap<String, String>,
    default_limit: u64,
    max_limit: u64,
) -> Result<ListPlacesParams, ApiError> {
    let sort = match query.get("sort").map(String::as_str) {
        None | Some("created_at") => SortKey::CreatedAt,
        Some("name") => SortKey::Name,
        Some("rating") => SortKey::Rating,
        Some("reports_count") => SortKey::ReportsCount,
        Some("votes_count") => SortKey::VotesCount,
        Some(other) => return Err(ApiError::invalid_param("sort", other)),
    };
    let order = match query.get("order").map(String::as_str) {
        None | Some("desc") => SortDirection::Desc,
        Some("asc") => SortDirection::Asc,
        Some(other) => return Err(ApiError::invalid_param("order", other)),
    };

    let page = match query.get("page") {
        Some(raw) => match raw.parse::<u64>() {
            Ok(value) if value >= 1 => value,
            _ => return Err(ApiError::invalid_param("page", raw)),
        },
        None => 1,
    };
    let limit = match query.get("limit") {
        Some(raw) => match raw.parse::<u64>() {
            Ok(value) if value >= 1 && value <= max_limit => value,
            _ => return Err(ApiError::invalid_param("limit", raw)),
        },
        None => default_limit,
    };

    let search = query.get("search").cloned().filter(|s| !s.is_empty());
    if let Some(search) = &search {
        if search.len() > MAX_SEARCH_LEN {
            return Err(ApiError::invalid_param("search", search));
        }
    }
    let category = query.get("category").cloned().filter(|s| !s.is_empty());

    Ok(ListPlacesParams {
        filter: ListFilter { search, category },
        sort,
        order,
        page,
        limit,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyParams {
    pub lat: f64,
    pub lng: f64,
    pub radius_meters: u32,
    pub place_type: Option<String>,
    pub keyword: Option<String>,
}

pub fn parse_nearby_params(query: &BTreeMap<String, String>) -> Result<NearbyParams, ApiError> {
    let lat = required_f64(query, "lat", -90.0, 90.0)?;
    let lng = required_f64(query, "lng", -180.0, 180.0)?;
    let radius_meters = parse_radius(query)?.unwrap_or(1_000);
    Ok(NearbyParams {
        lat,
        lng,
        radius_meters,
        place_type: query.get("type").cloned().filter(|s| !s.is_empty()),
        keyword: query.get("keyword").cloned().filter(|s| !s.is_empty()),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchParams {
    pub query: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_meters: Option<u32>,
}

pub fn parse_text_search_params(
    query: &BTreeMap<String, String>,
) -> Result<TextSearchParams, ApiError> {
    let text = query
        .get("query")
        .cloned()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::invalid_param("query", ""))?;
    if text.len() > MAX_SEARCH_LEN {
        return Err(ApiError::invalid_param("query", &text));
    }
    let lat = optional_f64(query, "lat", -90.0, 90.0)?;
    let lng = optional_f64(query, "lng", -180.0, 180.0)?;
    // A point needs both coordinates.
    if lat.is_some() != lng.is_some() {
        return Err(ApiError::invalid_param("lat", "lat and lng come together"));
    }
    Ok(TextSearchParams {
        query: text,
        lat,
        lng,
        radius_meters: parse_radius(query)?,
    })
}

fn parse_radius(query: &BTreeMap<String, String>) -> Result<Option<u32>, ApiError> {
    match query.get("radius") {
        Some(raw) => match raw.parse::<u32>() {
            Ok(value) if value >= 1 && value <= MAX_RADIUS_METERS => Ok(Some(value)),
            _ => Err(ApiError::invalid_param("radius", raw)),
        },
        None => Ok(None),
    }
}

fn required_f64(
    query: &BTreeMap<String, String>,
    name: &str,
    min: f64,
    max: f64,
) -> Result<f64, ApiError> {
    optional_f64(query, name, min, max)?.ok_or_else(|| ApiError::invalid_param(name, ""))
}

fn optional_f64(
    query: &BTreeMap<String, String>,
    name: &str,
    min: f64,
    max: f64,
) -> Result<Option<f64>, ApiError> {
    match query.get(name) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= min && value <= max => Ok(Some(value)),
            _ => Err(ApiError::invalid_param(name, raw)),
        },
        None => Ok(None),
    }
}
