// SPDX-License-Identifier: Apache-2.0

use curbmap_model::PlaceId;
use curbmap_store::{self as store, StoreError};
use rusqlite::Connection;
use serde::Serialize;

/// Majority statistics for one boolean accessibility field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FieldStats {
    pub percentage: f64,
    pub has_majority: bool,
    pub positive_count: i64,
    pub total_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccessibilityStats {
    pub place_id: PlaceId,
    pub total_reports: i64,
    pub ramp: FieldStats,
    pub accessible_restroom: FieldStats,
    pub accessible_parking: FieldStats,
    pub visual_aids: FieldStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatsError {
    NotFound(PlaceId),
    Store(StoreError),
}

impl std::fmt::Display for StatsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "place {id} not found"),
            Self::Store(e) => write!(f, "store failure during statistics: {e}"),
        }
    }
}

impl std::error::Error for StatsError {}

impl From<StoreError> for StatsError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Majority-vote statistics over a place's reports, each of the four fields
/// computed independently. A missing place is `NotFound`, never zeroed
/// statistics.
pub fn accessibility_stats(
    conn: &Connection,
    place_id: PlaceId,
) -> Result<AccessibilityStats, StatsError> {
    if !store::place_exists(conn, place_id)? {
        return Err(StatsError::NotFound(place_id));
    }
    let totals = store::report_flag_totals(conn, place_id)?;
    Ok(AccessibilityStats {
        place_id,
        total_reports: totals.total,
        ramp: field_stats(totals.ramp, totals.total),
        accessible_restroom: field_stats(totals.restroom, totals.total),
        accessible_parking: field_stats(totals.parking, totals.total),
        visual_aids: field_stats(totals.visual, totals.total),
    })
}

/// `positive / total * 100`, rounded half-up to two decimals; zero when
/// there are no reports. Majority is strict: exactly 50.00 does not count.
fn field_stats(positive: i64, total: i64) -> FieldStats {
    if total == 0 {
        return FieldStats::default();
    }
    let raw = positive as f64 / total as f64 * 100.0;
    let percentage = (raw * 100.0).round() / 100.0;
    FieldStats {
        percentage,
        has_majority: percentage > 50.0,
        positive_count: positive,
        total_count: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_is_not_a_majority() {
        let stats = field_stats(1, 2);
        assert_eq!(stats.percentage, 50.0);
        assert!(!stats.has_majority);
    }

    #[test]
    fn two_thirds_rounds_to_two_decimals_and_is_a_majority() {
        let stats = field_stats(2, 3);
        assert_eq!(stats.percentage, 66.67);
        assert!(stats.has_majority);
    }

    #[test]
    fn one_third_rounds_down() {
        let stats = field_stats(1, 3);
        assert_eq!(stats.percentage, 33.33);
        assert!(!stats.has_majority);
    }

    #[test]
    fn zero_total_yields_all_zero_block() {
        assert_eq!(field_stats(0, 0), FieldStats::default());
    }
}
