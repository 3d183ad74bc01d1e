#![forbid(unsafe_code)]
//! Curbmap domain model SSOT.
//!
//! Entities mirror the storage schema: places reconciled from the external
//! provider, plus the report/vote/favorite rows owned by collaborators and
//! read by the aggregation engine.

mod candidate;
mod place;
mod report;

pub use candidate::{GeoPoint, PlaceCandidate};
pub use place::{
    ExternalPlaceId, ParseError, Place, PlaceId, UserId, EXTERNAL_ID_MAX_LEN, NAME_MAX_LEN,
};
pub use report::{AccessibilityFlags, Favorite, Report, ReportId, Vote};
