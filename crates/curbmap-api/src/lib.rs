#![forbid(unsafe_code)]
//! Wire contract for the curbmap HTTP surface: DTOs, query-parameter
//! parsing, and the error envelope with its engine-error mapping.

mod dto;
mod error_mapping;
mod errors;
mod params;

pub use dto::{
    AccessibilityStatsDto, FieldStatsDto, ListPlacesResponseDto, ListedPlaceDto, PaginationDto,
    PlaceDto,
};
pub use error_mapping::{
    map_listing_error, map_provider_error, map_reconcile_error, map_stats_error,
};
pub use errors::{ApiError, ApiErrorCode};
pub use params::{
    parse_list_places_params, parse_list_places_params_with_limit, parse_nearby_params,
    parse_text_search_params, ListPlacesParams, NearbyParams, TextSearchParams, DEFAULT_LIMIT,
    MAX_LIMIT, MAX_RADIUS_METERS,
};

pub const CRATE_NAME: &str = "curbmap-api";
