#![forbid(unsafe_code)]
//! The curbmap engine: reconciliation of provider candidates against the
//! local store, geofenced filtering, batched cross-entity aggregation, and
//! the listing/statistics orchestration on top of them.
//!
//! All entry points are synchronous over `&rusqlite::Connection`, mirroring
//! the store crate; the server offloads them onto blocking threads.

mod aggregate;
mod geofence;
mod listing;
mod reconcile;
mod stats;

pub use aggregate::{aggregate_places, MetricSelection, PlaceAggregates};
pub use geofence::{BoundingBox, Geofence};
pub use listing::{
    list_places, ListedPlace, ListingError, ListingResponse, PageRequest, Pagination, SortKey,
};
pub use reconcile::{find_by_external_id, find_or_create, reconcile_batch, ReconcileError};
pub use stats::{accessibility_stats, AccessibilityStats, FieldStats, StatsError};

pub use curbmap_store::{ListFilter, SortDirection, StoreError};

pub const CRATE_NAME: &str = "curbmap-query";

#[cfg(test)]
mod engine_tests;
