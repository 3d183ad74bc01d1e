#![forbid(unsafe_code)]
//! Sqlite persistence for curbmap.
//!
//! Everything here is synchronous over `&rusqlite::Connection`; async
//! callers are expected to offload onto a blocking thread. Queries that
//! operate on sets of places are batched (`IN` lists, grouped counts),
//! never one statement per place.

use std::fmt::{Display, Formatter};

mod counts;
mod listing;
mod places;
mod reports;
mod schema;

pub use counts::{favorited_at_for_viewer, report_counts, vote_counts};
pub use listing::{
    count_places, escape_like, select_filtered_place_ids, select_place_page, ListFilter,
    SortDirection, StoredSortColumn,
};
pub use places::{
    find_by_external_id, find_by_external_ids, find_by_ids, insert_candidates, place_exists,
};
pub use reports::{report_flag_totals, ReportFlagTotals};
pub use schema::{init_schema, now_epoch};

pub const CRATE_NAME: &str = "curbmap-store";

/// Storage failure. Carries message text only; callers map it to their own
/// taxonomy and never forward the text to API clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
