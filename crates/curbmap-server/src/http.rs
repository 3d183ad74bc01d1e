// SPDX-License-Identifier: Apache-2.0

use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use curbmap_api::{
    map_listing_error, map_provider_error, map_reconcile_error, map_stats_error,
    parse_list_places_params_with_limit, parse_nearby_params, parse_text_search_params,
    AccessibilityStatsDto, ApiError, ApiErrorCode, ListPlacesResponseDto, PlaceDto,
};
use curbmap_model::{ExternalPlaceId, GeoPoint, PlaceId, UserId};
use curbmap_query::{accessibility_stats, list_places, reconcile_batch, PageRequest};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{error, info};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/v1/places", get(list_places_handler))
        .route("/api/v1/places/:id/accessibility", get(accessibility_handler))
        .route("/api/v1/places/nearby", get(nearby_handler))
        .route("/api/v1/places/search", get(text_search_handler))
        .route("/api/v1/places/lookup/:external_id", get(lookup_handler))
        .with_state(state)
}

type ApiFailure = (StatusCode, Json<Value>);

fn status_for(code: ApiErrorCode) -> StatusCode {
    match code {
        ApiErrorCode::InvalidQueryParameter => StatusCode::BAD_REQUEST,
        ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
        ApiErrorCode::ProviderUnavailable => StatusCode::BAD_GATEWAY,
        ApiErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ApiError) -> ApiFailure {
    (status_for(err.code), Json(json!({ "error": err })))
}

/// Pre-authenticated viewer identity, when the auth collaborator attached
/// one. Absent or malformed means anonymous.
fn viewer_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .map(UserId)
}

async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn list_places_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Json<ListPlacesResponseDto>, ApiFailure> {
    let params =
        parse_list_places_params_with_limit(&query, state.default_limit, state.max_limit)
            .map_err(reject)?;
    let viewer = viewer_from_headers(&headers);
    let response = state
        .with_db(move |conn| {
            list_places(
                conn,
                &params.filter,
                params.sort,
                params.order,
                PageRequest {
                    page: params.page,
                    limit: params.limit,
                },
                viewer,
            )
            .map(ListPlacesResponseDto::from)
            .map_err(|e| {
                error!(error = %e, "listing failed");
                map_listing_error(&e)
            })
        })
        .await
        .map_err(reject)?;
    Ok(Json(response))
}

pub(crate) async fn accessibility_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AccessibilityStatsDto>, ApiFailure> {
    let stats = state
        .with_db(move |conn| {
            accessibility_stats(conn, PlaceId(id))
                .map(AccessibilityStatsDto::from)
                .map_err(|e| {
                    if !matches!(e, curbmap_query::StatsError::NotFound(_)) {
                        error!(error = %e, "statistics failed");
                    }
                    map_stats_error(&e)
                })
        })
        .await
        .map_err(reject)?;
    Ok(Json(stats))
}

pub(crate) async fn nearby_handler(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Json<Value>, ApiFailure> {
    let params = parse_nearby_params(&query).map_err(reject)?;
    let center = GeoPoint::new(params.lat, params.lng)
        .map_err(|_| reject(ApiError::invalid_param("lat", "out of range")))?;
    let candidates = state
        .provider
        .search_nearby(
            center,
            params.radius_meters,
            params.place_type.as_deref(),
            params.keyword.as_deref(),
        )
        .await
        .map_err(|e| reject(map_provider_error(&e)))?;
    reconcile_response(&state, candidates).await
}

pub(crate) async fn text_search_handler(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Json<Value>, ApiFailure> {
    let params = parse_text_search_params(&query).map_err(reject)?;
    let near = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => Some(
            GeoPoint::new(lat, lng)
                .map_err(|_| reject(ApiError::invalid_param("lat", "out of range")))?,
        ),
        _ => None,
    };
    let candidates = state
        .provider
        .search_by_text(&params.query, near, params.radius_meters)
        .await
        .map_err(|e| reject(map_provider_error(&e)))?;
    reconcile_response(&state, candidates).await
}

pub(crate) async fn lookup_handler(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<Json<PlaceDto>, ApiFailure> {
    let external_id = ExternalPlaceId::parse(&external_id)
        .map_err(|_| reject(ApiError::invalid_param("external_id", &external_id)))?;
    let candidate = state
        .provider
        .get_details(&external_id)
        .await
        .map_err(|e| reject(map_provider_error(&e)))?
        .ok_or_else(|| reject(ApiError::not_found(format!("place {external_id} not found"))))?;
    if !state.geofence.admits(&candidate) {
        return Err(reject(ApiError::not_found(format!(
            "place {external_id} is outside the served region"
        ))));
    }
    let place = state
        .with_db(move |conn| {
            curbmap_query::find_or_create(conn, &candidate).map_err(|e| {
                error!(error = %e, "lookup reconciliation failed");
                map_reconcile_error(&e)
            })
        })
        .await
        .map_err(reject)?;
    Ok(Json(place.into()))
}

/// Shared tail of both search flows: geofence the candidates, then persist.
async fn reconcile_response(
    state: &AppState,
    candidates: Vec<curbmap_model::PlaceCandidate>,
) -> Result<Json<Value>, ApiFailure> {
    let admitted = state.geofence.filter(candidates);
    info!(admitted = admitted.len(), "provider candidates after geofence");
    let places = state
        .with_db(move |conn| {
            reconcile_batch(conn, &admitted).map_err(|e| {
                error!(error = %e, "reconciliation failed");
                map_reconcile_error(&e)
            })
        })
        .await
        .map_err(reject)?;
    let items: Vec<PlaceDto> = places.into_iter().map(Into::into).collect();
    Ok(Json(json!({ "items": items })))
}
