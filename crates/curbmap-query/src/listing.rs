// SPDX-License-Identifier: Apache-2.0

use crate::aggregate::{aggregate_places, MetricSelection};
use curbmap_model::{Place, PlaceId, UserId};
use curbmap_store::{
    self as store, ListFilter, SortDirection, StoreError, StoredSortColumn,
};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SortKey {
    Name,
    Rating,
    CreatedAt,
    ReportsCount,
    VotesCount,
}

impl SortKey {
    /// Stored column the store can order by itself, if any. The derived
    /// keys have no backing column and force the in-memory path.
    const fn stored_column(self) -> Option<StoredSortColumn> {
        match self {
            Self::Name => Some(StoredSortColumn::Name),
            Self::Rating => Some(StoredSortColumn::Rating),
            Self::CreatedAt => Some(StoredSortColumn::CreatedAt),
            Self::ReportsCount | Self::VotesCount => None,
        }
    }
}

/// One-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// A place with its derived metrics attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedPlace {
    #[serde(flatten)]
    pub place: Place,
    pub reports_count: i64,
    pub votes_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorited_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingResponse {
    pub items: Vec<ListedPlace>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ListingError {
    /// Pagination window outside the contract. Parameters are validated at
    /// the API boundary; hitting this is a programming error, so fail fast.
    InvalidWindow(&'static str),
    Store(StoreError),
}

impl std::fmt::Display for ListingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWindow(msg) => f.write_str(msg),
            Self::Store(e) => write!(f, "store failure during listing: {e}"),
        }
    }
}

impl std::error::Error for ListingError {}

impl From<StoreError> for ListingError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Composes filtering, aggregation, sorting and pagination into one envelope.
///
/// Stored-column sorts push ordering and the page window into the store and
/// take `total` from a separate count under the same filter. Derived-metric
/// sorts materialize the entire filtered id set, aggregate it once, sort in
/// memory with an ascending-id tie-break, and slice the page; `total` always
/// reflects the full filtered set, never the slice.
pub fn list_places(
    conn: &Connection,
    filter: &ListFilter,
    sort: SortKey,
    direction: SortDirection,
    window: PageRequest,
    viewer: Option<UserId>,
) -> Result<ListingResponse, ListingError> {
    if window.page == 0 {
        return Err(ListingError::InvalidWindow("page must be >= 1"));
    }
    if window.limit == 0 {
        return Err(ListingError::InvalidWindow("limit must be >= 1"));
    }

    let (page_places, total) = match sort.stored_column() {
        Some(column) => {
            let total = store::count_places(conn, filter)?;
            let offset = (window.page - 1).saturating_mul(window.limit);
            let places =
                store::select_place_page(conn, filter, column, direction, window.limit, offset)?;
            (places, total)
        }
        None => {
            let ids = store::select_filtered_place_ids(conn, filter)?;
            let total = ids.len() as u64;
            let page_ids = sort_and_slice_by_derived(conn, ids, sort, direction, window)?;
            let places = fetch_in_order(conn, &page_ids)?;
            (places, total)
        }
    };

    let page_ids: Vec<PlaceId> = page_places.iter().map(|p| p.id).collect();
    let metrics = if viewer.is_some() {
        MetricSelection::all()
    } else {
        MetricSelection::counts()
    };
    let aggregates = aggregate_places(conn, &page_ids, metrics, viewer)?;

    let items = page_places
        .into_iter()
        .map(|place| {
            let agg = aggregates.get(&place.id).copied().unwrap_or_default();
            ListedPlace {
                place,
                reports_count: agg.reports_count,
                votes_count: agg.votes_count,
                favorited_at: agg.favorited_at,
            }
        })
        .collect();

    let total_pages = total.div_ceil(window.limit);
    debug!(total, page = window.page, ?sort, "listed places");
    Ok(ListingResponse {
        items,
        pagination: Pagination {
            page: window.page,
            limit: window.limit,
            total,
            total_pages,
        },
    })
}

/// Full-set aggregation for a derived sort key, then the page slice.
fn sort_and_slice_by_derived(
    conn: &Connection,
    ids: Vec<PlaceId>,
    sort: SortKey,
    direction: SortDirection,
    window: PageRequest,
) -> Result<Vec<PlaceId>, ListingError> {
    let metrics = match sort {
        SortKey::ReportsCount => MetricSelection {
            reports_count: true,
            ..MetricSelection::default()
        },
        SortKey::VotesCount => MetricSelection {
            votes_count: true,
            ..MetricSelection::default()
        },
        _ => return Err(ListingError::InvalidWindow("sort key has a stored column")),
    };
    let aggregates = aggregate_places(conn, &ids, metrics, None)?;

    let mut keyed: Vec<(i64, PlaceId)> = ids
        .into_iter()
        .map(|id| {
            let agg = aggregates.get(&id).copied().unwrap_or_default();
            let key = match sort {
                SortKey::VotesCount => agg.votes_count,
                _ => agg.reports_count,
            };
            (key, id)
        })
        .collect();
    // Deterministic tie-break: ascending id under either direction.
    keyed.sort_by(|a, b| match direction {
        SortDirection::Asc => a.0.cmp(&b.0).then(a.1.cmp(&b.1)),
        SortDirection::Desc => b.0.cmp(&a.0).then(a.1.cmp(&b.1)),
    });

    let offset = (window.page - 1).saturating_mul(window.limit) as usize;
    Ok(keyed
        .into_iter()
        .skip(offset)
        .take(window.limit as usize)
        .map(|(_, id)| id)
        .collect())
}

/// Fetches rows for the sliced ids and restores the slice order, which the
/// `IN`-list select does not preserve.
fn fetch_in_order(conn: &Connection, ids: &[PlaceId]) -> Result<Vec<Place>, ListingError> {
    let rows = store::find_by_ids(conn, ids)?;
    let mut by_id: HashMap<PlaceId, Place> = rows.into_iter().map(|p| (p.id, p)).collect();
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}
