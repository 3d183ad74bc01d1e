// SPDX-License-Identifier: Apache-2.0

use curbmap_model::{PlaceId, UserId};
use curbmap_store::{self as store, StoreError};
use rusqlite::Connection;
use std::collections::HashMap;

/// Which derived metrics a caller wants computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricSelection {
    pub reports_count: bool,
    pub votes_count: bool,
    pub favorited_at: bool,
}

impl MetricSelection {
    #[must_use]
    pub const fn counts() -> Self {
        Self {
            reports_count: true,
            votes_count: true,
            favorited_at: false,
        }
    }

    #[must_use]
    pub const fn all() -> Self {
        Self {
            reports_count: true,
            votes_count: true,
            favorited_at: true,
        }
    }
}

/// Derived values for one place. Counts default to zero; `favorited_at` is
/// populated only for a supplied viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaceAggregates {
    pub reports_count: i64,
    pub votes_count: i64,
    pub favorited_at: Option<i64>,
}

/// Computes the requested metrics for the whole id set: one grouped query
/// per metric, merged through an id-keyed table built once per call. Every
/// input id gets an entry, zero-valued when no related rows exist.
pub fn aggregate_places(
    conn: &Connection,
    ids: &[PlaceId],
    metrics: MetricSelection,
    viewer: Option<UserId>,
) -> Result<HashMap<PlaceId, PlaceAggregates>, StoreError> {
    let mut merged: HashMap<PlaceId, PlaceAggregates> = ids
        .iter()
        .map(|id| (*id, PlaceAggregates::default()))
        .collect();
    if merged.is_empty() {
        return Ok(merged);
    }

    if metrics.reports_count {
        for (id, count) in store::report_counts(conn, ids)? {
            if let Some(entry) = merged.get_mut(&id) {
                entry.reports_count = count;
            }
        }
    }
    if metrics.votes_count {
        for (id, count) in store::vote_counts(conn, ids)? {
            if let Some(entry) = merged.get_mut(&id) {
                entry.votes_count = count;
            }
        }
    }
    if metrics.favorited_at {
        if let Some(viewer) = viewer {
            for (id, at) in store::favorited_at_for_viewer(conn, viewer, ids)? {
                if let Some(entry) = merged.get_mut(&id) {
                    entry.favorited_at = Some(at);
                }
            }
        }
    }

    Ok(merged)
}
