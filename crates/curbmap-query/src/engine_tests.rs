use super::*;
use curbmap_model::{ExternalPlaceId, GeoPoint, PlaceCandidate, PlaceId, UserId};
use curbmap_store::init_schema;
use rusqlite::{params, Connection};

fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().expect("open memory db");
    init_schema(&conn).expect("schema");
    conn
}

fn candidate(external_id: &str, name: &str) -> PlaceCandidate {
    PlaceCandidate::bare(
        ExternalPlaceId::parse(external_id).expect("external id"),
        name,
        GeoPoint::new(-23.55, -46.63).expect("point"),
    )
}

fn place_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM places", [], |row| row.get(0))
        .expect("count places")
}

fn seed_report(conn: &Connection, place_id: PlaceId, user: i64, ramp: bool) -> i64 {
    conn.execute(
        "INSERT INTO reports \
         (title, description, report_type, has_ramp, has_accessible_restroom, \
          has_accessible_parking, has_visual_aids, user_id, place_id, created_at) \
         VALUES ('t', 'd', 'survey', ?1, 0, 0, 0, ?2, ?3, 1700000000)",
        params![ramp as i64, user, place_id.0],
    )
    .expect("insert report");
    conn.last_insert_rowid()
}

fn seed_votes(conn: &Connection, report_id: i64, voters: std::ops::Range<i64>) {
    for user in voters {
        conn.execute(
            "INSERT INTO votes (user_id, report_id, created_at) VALUES (?1, ?2, 1700000001)",
            params![user, report_id],
        )
        .expect("insert vote");
    }
}

#[test]
fn reconcile_batch_is_idempotent() {
    let conn = setup_db();
    let batch = vec![candidate("ext-1", "A"), candidate("ext-2", "B")];

    let first = reconcile_batch(&conn, &batch).expect("first call");
    assert_eq!(place_rows(&conn), 2);

    let second = reconcile_batch(&conn, &batch).expect("second call");
    assert_eq!(place_rows(&conn), 2);
    assert_eq!(first, second);
}

#[test]
fn duplicate_external_ids_within_a_batch_insert_one_row() {
    let conn = setup_db();
    let batch = vec![
        candidate("ext-1", "First Occurrence"),
        candidate("ext-1", "Second Occurrence"),
    ];
    let places = reconcile_batch(&conn, &batch).expect("reconcile");

    assert_eq!(place_rows(&conn), 1);
    assert_eq!(places.len(), 2);
    assert_eq!(places[0], places[1]);
    assert_eq!(places[0].name, "First Occurrence");
}

#[test]
fn reconcile_preserves_input_order_across_hits_and_misses() {
    let conn = setup_db();
    reconcile_batch(&conn, &[candidate("ext-2", "Already Here")]).expect("seed");

    let batch = vec![
        candidate("ext-3", "New One"),
        candidate("ext-2", "Already Here"),
        candidate("ext-4", "Another New"),
    ];
    let places = reconcile_batch(&conn, &batch).expect("reconcile");
    let externals: Vec<&str> = places.iter().map(|p| p.external_id.as_str()).collect();
    assert_eq!(externals, vec!["ext-3", "ext-2", "ext-4"]);
}

#[test]
fn find_or_create_scenario_returns_the_same_row_twice() {
    let conn = setup_db();
    let shop = candidate("X1", "Shop");

    let created = find_or_create(&conn, &shop).expect("create");
    assert_eq!(place_rows(&conn), 1);

    let found = find_or_create(&conn, &shop).expect("find");
    assert_eq!(created.id, found.id);
    assert_eq!(place_rows(&conn), 1);

    let stored = find_by_external_id(&conn, &shop.external_id)
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.id, created.id);
}

#[test]
fn aggregation_is_exact_for_reports_and_votes() {
    let conn = setup_db();
    let places = reconcile_batch(&conn, &[candidate("ext-1", "A"), candidate("ext-2", "B")])
        .expect("reconcile");
    let (a, b) = (places[0].id, places[1].id);

    // a: 3 reports, 5 votes spread across them; b: nothing.
    let r1 = seed_report(&conn, a, 1, true);
    let r2 = seed_report(&conn, a, 2, false);
    seed_report(&conn, a, 3, true);
    seed_votes(&conn, r1, 10..13);
    seed_votes(&conn, r2, 10..12);

    let aggregates =
        aggregate_places(&conn, &[a, b], MetricSelection::counts(), None).expect("aggregate");
    assert_eq!(aggregates[&a].reports_count, 3);
    assert_eq!(aggregates[&a].votes_count, 5);
    assert_eq!(aggregates[&b].reports_count, 0);
    assert_eq!(aggregates[&b].votes_count, 0);
}

#[test]
fn derived_sort_pagination_is_complete_and_duplicate_free() {
    let conn = setup_db();
    let batch: Vec<PlaceCandidate> = (0..7)
        .map(|i| candidate(&format!("ext-{i}"), &format!("Place {i}")))
        .collect();
    let places = reconcile_batch(&conn, &batch).expect("reconcile");
    // Give place i exactly i reports.
    for (i, place) in places.iter().enumerate() {
        for user in 0..i as i64 {
            seed_report(&conn, place.id, user, false);
        }
    }

    let limit = 3;
    let mut collected: Vec<(i64, PlaceId)> = Vec::new();
    let mut page = 1;
    loop {
        let response = list_places(
            &conn,
            &ListFilter::default(),
            SortKey::ReportsCount,
            SortDirection::Desc,
            PageRequest { page, limit },
            None,
        )
        .expect("list");
        assert_eq!(response.pagination.total, 7);
        assert_eq!(response.pagination.total_pages, 3);
        if page <= 3 {
            assert!(!response.items.is_empty());
        }
        for item in &response.items {
            collected.push((item.reports_count, item.place.id));
        }
        if page >= response.pagination.total_pages {
            break;
        }
        page += 1;
    }

    assert_eq!(collected.len(), 7);
    let mut expected = collected.clone();
    expected.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    assert_eq!(collected, expected, "concatenated pages are the sorted set");
    let mut ids: Vec<PlaceId> = collected.iter().map(|(_, id)| *id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 7, "no duplicates or omissions");
}

#[test]
fn derived_sort_breaks_ties_on_ascending_id() {
    let conn = setup_db();
    let places = reconcile_batch(
        &conn,
        &[
            candidate("ext-1", "A"),
            candidate("ext-2", "B"),
            candidate("ext-3", "C"),
        ],
    )
    .expect("reconcile");
    // All three tie at one report each.
    for place in &places {
        seed_report(&conn, place.id, 1, false);
    }

    let response = list_places(
        &conn,
        &ListFilter::default(),
        SortKey::ReportsCount,
        SortDirection::Desc,
        PageRequest { page: 1, limit: 10 },
        None,
    )
    .expect("list");
    let ids: Vec<PlaceId> = response.items.iter().map(|i| i.place.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn stored_column_sort_still_attaches_derived_counts() {
    let conn = setup_db();
    let places = reconcile_batch(&conn, &[candidate("ext-1", "Beta"), candidate("ext-2", "Alpha")])
        .expect("reconcile");
    let r = seed_report(&conn, places[0].id, 1, true);
    seed_votes(&conn, r, 5..7);

    let response = list_places(
        &conn,
        &ListFilter::default(),
        SortKey::Name,
        SortDirection::Asc,
        PageRequest { page: 1, limit: 10 },
        None,
    )
    .expect("list");

    assert_eq!(response.items[0].place.name, "Alpha");
    assert_eq!(response.items[0].reports_count, 0);
    assert_eq!(response.items[1].place.name, "Beta");
    assert_eq!(response.items[1].reports_count, 1);
    assert_eq!(response.items[1].votes_count, 2);
}

#[test]
fn viewer_identity_attaches_favorited_at() {
    let conn = setup_db();
    let places =
        reconcile_batch(&conn, &[candidate("ext-1", "A"), candidate("ext-2", "B")]).expect("seed");
    conn.execute(
        "INSERT INTO favorites (user_id, place_id, created_at) VALUES (42, ?1, 1700000900)",
        params![places[0].id.0],
    )
    .expect("favorite");

    let anonymous = list_places(
        &conn,
        &ListFilter::default(),
        SortKey::Name,
        SortDirection::Asc,
        PageRequest { page: 1, limit: 10 },
        None,
    )
    .expect("list");
    assert!(anonymous.items.iter().all(|i| i.favorited_at.is_none()));

    let viewer = list_places(
        &conn,
        &ListFilter::default(),
        SortKey::Name,
        SortDirection::Asc,
        PageRequest { page: 1, limit: 10 },
        Some(UserId(42)),
    )
    .expect("list");
    let favorited: Vec<Option<i64>> = viewer.items.iter().map(|i| i.favorited_at).collect();
    assert_eq!(favorited, vec![Some(1_700_000_900), None]);
}

#[test]
fn pagination_metadata_stays_truthful_past_the_last_page() {
    let conn = setup_db();
    reconcile_batch(&conn, &[candidate("ext-1", "A")]).expect("seed");

    let response = list_places(
        &conn,
        &ListFilter::default(),
        SortKey::VotesCount,
        SortDirection::Desc,
        PageRequest { page: 5, limit: 2 },
        None,
    )
    .expect("list");
    assert!(response.items.is_empty());
    assert_eq!(response.pagination.total, 1);
    assert_eq!(response.pagination.total_pages, 1);
}

#[test]
fn zero_window_fails_fast() {
    let conn = setup_db();
    let err = list_places(
        &conn,
        &ListFilter::default(),
        SortKey::Name,
        SortDirection::Asc,
        PageRequest { page: 0, limit: 10 },
        None,
    )
    .expect_err("page 0");
    assert!(matches!(err, ListingError::InvalidWindow(_)));

    let err = list_places(
        &conn,
        &ListFilter::default(),
        SortKey::Name,
        SortDirection::Asc,
        PageRequest { page: 1, limit: 0 },
        None,
    )
    .expect_err("limit 0");
    assert!(matches!(err, ListingError::InvalidWindow(_)));
}

#[test]
fn stats_majority_boundaries() {
    let conn = setup_db();
    let places =
        reconcile_batch(&conn, &[candidate("ext-1", "Half"), candidate("ext-2", "Two Thirds")])
            .expect("seed");

    // 1 positive of 2.
    seed_report(&conn, places[0].id, 1, true);
    seed_report(&conn, places[0].id, 2, false);
    // 2 positive of 3.
    seed_report(&conn, places[1].id, 1, true);
    seed_report(&conn, places[1].id, 2, true);
    seed_report(&conn, places[1].id, 3, false);

    let half = accessibility_stats(&conn, places[0].id).expect("stats");
    assert_eq!(half.ramp.percentage, 50.0);
    assert!(!half.ramp.has_majority);
    assert_eq!(half.total_reports, 2);

    let two_thirds = accessibility_stats(&conn, places[1].id).expect("stats");
    assert_eq!(two_thirds.ramp.percentage, 66.67);
    assert!(two_thirds.ramp.has_majority);
    assert_eq!(two_thirds.ramp.positive_count, 2);
    assert_eq!(two_thirds.ramp.total_count, 3);
}

#[test]
fn stats_zero_reports_yield_zeroed_fields() {
    let conn = setup_db();
    let places = reconcile_batch(&conn, &[candidate("ext-1", "Quiet")]).expect("seed");

    let stats = accessibility_stats(&conn, places[0].id).expect("stats");
    assert_eq!(stats.total_reports, 0);
    for field in [
        stats.ramp,
        stats.accessible_restroom,
        stats.accessible_parking,
        stats.visual_aids,
    ] {
        assert_eq!(field, FieldStats::default());
    }
}

#[test]
fn stats_for_a_missing_place_is_not_found() {
    let conn = setup_db();
    let err = accessibility_stats(&conn, PlaceId(123)).expect_err("missing place");
    assert_eq!(err, StatsError::NotFound(PlaceId(123)));
}
