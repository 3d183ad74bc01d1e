use crate::config::ServerConfig;
use crate::http::{
    accessibility_handler, list_places_handler, lookup_handler, nearby_handler,
    text_search_handler,
};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use curbmap_model::{ExternalPlaceId, GeoPoint, PlaceCandidate};
use curbmap_provider::{FakePlaceSource, ProviderError};
use curbmap_query::reconcile_batch;
use curbmap_store::init_schema;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::Arc;

fn candidate(external_id: &str, name: &str, lat: f64, lng: f64) -> PlaceCandidate {
    PlaceCandidate::bare(
        ExternalPlaceId::parse(external_id).expect("external id"),
        name,
        GeoPoint::new(lat, lng).expect("point"),
    )
}

/// In-region coordinates for the default São Paulo box.
const IN_LAT: f64 = -23.55;
const IN_LNG: f64 = -46.63;

fn setup_state(fake: FakePlaceSource, seed: impl FnOnce(&Connection)) -> AppState {
    let conn = Connection::open_in_memory().expect("open memory db");
    init_schema(&conn).expect("schema");
    seed(&conn);
    AppState::new(conn, Arc::new(fake), &ServerConfig::default())
}

fn query(pairs: &[(&str, &str)]) -> Query<BTreeMap<String, String>> {
    Query(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[tokio::test]
async fn nearby_flow_geofences_reconciles_and_stays_idempotent() {
    let fake = FakePlaceSource::default();
    fake.seed_search(vec![
        candidate("ext-in", "Dockside Cafe", IN_LAT, IN_LNG),
        candidate("ext-out", "Far Away", 10.0, 10.0),
    ])
    .await;
    let state = setup_state(fake, |_| {});

    let q = query(&[("lat", "-23.55"), ("lng", "-46.63")]);
    let first = nearby_handler(State(state.clone()), q)
        .await
        .expect("first call");
    assert_eq!(first.0["items"].as_array().expect("items").len(), 1);
    assert_eq!(first.0["items"][0]["external_id"], "ext-in");

    let q = query(&[("lat", "-23.55"), ("lng", "-46.63")]);
    let second = nearby_handler(State(state.clone()), q)
        .await
        .expect("second call");
    assert_eq!(second.0["items"][0]["id"], first.0["items"][0]["id"]);

    // Still exactly one row behind the listing.
    let listing = list_places_handler(State(state), HeaderMap::new(), query(&[]))
        .await
        .expect("listing");
    assert_eq!(listing.0.pagination.total, 1);
}

#[tokio::test]
async fn listing_sorts_by_derived_metric_with_truthful_totals() {
    let state = setup_state(FakePlaceSource::default(), |conn| {
        let places = reconcile_batch(
            conn,
            &[
                candidate("ext-1", "Quiet", IN_LAT, IN_LNG),
                candidate("ext-2", "Busy", IN_LAT, IN_LNG),
            ],
        )
        .expect("seed");
        for user in 0..3 {
            conn.execute(
                "INSERT INTO reports \
                 (title, description, report_type, has_ramp, has_accessible_restroom, \
                  has_accessible_parking, has_visual_aids, user_id, place_id, created_at) \
                 VALUES ('t', 'd', 'survey', 1, 0, 0, 0, ?1, ?2, 1700000000)",
                params![user, places[1].id.0],
            )
            .expect("report");
        }
    });

    let q = query(&[("sort", "reports_count"), ("limit", "1")]);
    let response = list_places_handler(State(state), HeaderMap::new(), q)
        .await
        .expect("listing");
    assert_eq!(response.0.items.len(), 1);
    assert_eq!(response.0.items[0].place.name, "Busy");
    assert_eq!(response.0.items[0].reports_count, 3);
    assert_eq!(response.0.pagination.total, 2);
    assert_eq!(response.0.pagination.total_pages, 2);
}

#[tokio::test]
async fn viewer_header_threads_through_to_favorited_at() {
    let state = setup_state(FakePlaceSource::default(), |conn| {
        let places = reconcile_batch(conn, &[candidate("ext-1", "A", IN_LAT, IN_LNG)])
            .expect("seed");
        conn.execute(
            "INSERT INTO favorites (user_id, place_id, created_at) VALUES (42, ?1, 1700000900)",
            params![places[0].id.0],
        )
        .expect("favorite");
    });

    let mut headers = HeaderMap::new();
    headers.insert("x-user-id", "42".parse().expect("header"));
    let response = list_places_handler(State(state), headers, query(&[]))
        .await
        .expect("listing");
    assert_eq!(response.0.items[0].favorited_at, Some(1_700_000_900));
}

#[tokio::test]
async fn unknown_place_statistics_are_404() {
    let state = setup_state(FakePlaceSource::default(), |_| {});
    let err = accessibility_handler(State(state), Path(999))
        .await
        .expect_err("missing place");
    assert_eq!(err.0, StatusCode::NOT_FOUND);
    assert_eq!(err.1 .0["error"]["code"], "not_found");
}

#[tokio::test]
async fn invalid_sort_parameter_is_400_with_stable_code() {
    let state = setup_state(FakePlaceSource::default(), |_| {});
    let err = list_places_handler(State(state), HeaderMap::new(), query(&[("sort", "distance")]))
        .await
        .expect_err("bad sort");
    assert_eq!(err.0, StatusCode::BAD_REQUEST);
    assert_eq!(err.1 .0["error"]["code"], "invalid_query_parameter");
}

#[tokio::test]
async fn provider_timeout_maps_to_retryable_502() {
    let fake = FakePlaceSource::default();
    fake.fail_next_call(ProviderError::Timeout).await;
    let state = setup_state(fake, |_| {});

    let err = text_search_handler(State(state), query(&[("query", "cafe")]))
        .await
        .expect_err("timeout");
    assert_eq!(err.0, StatusCode::BAD_GATEWAY);
    assert_eq!(err.1 .0["error"]["code"], "provider_unavailable");
    assert_eq!(err.1 .0["error"]["details"]["retryable"], true);
}

#[tokio::test]
async fn lookup_outside_the_region_is_404_and_persists_nothing() {
    let fake = FakePlaceSource::default();
    fake.seed_detail(candidate("ext-far", "Elsewhere", 40.0, -74.0))
        .await;
    let state = setup_state(fake, |_| {});

    let err = lookup_handler(State(state.clone()), Path("ext-far".to_string()))
        .await
        .expect_err("outside region");
    assert_eq!(err.0, StatusCode::NOT_FOUND);

    let listing = list_places_handler(State(state), HeaderMap::new(), query(&[]))
        .await
        .expect("listing");
    assert_eq!(listing.0.pagination.total, 0);
}

#[tokio::test]
async fn lookup_inside_the_region_creates_once() {
    let fake = FakePlaceSource::default();
    fake.seed_detail(candidate("ext-in", "Dockside Cafe", IN_LAT, IN_LNG))
        .await;
    let state = setup_state(fake, |_| {});

    let first = lookup_handler(State(state.clone()), Path("ext-in".to_string()))
        .await
        .expect("create");
    let second = lookup_handler(State(state), Path("ext-in".to_string()))
        .await
        .expect("find");
    assert_eq!(first.0.id, second.0.id);
}
