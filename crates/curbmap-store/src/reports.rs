// SPDX-License-Identifier: Apache-2.0

use crate::StoreResult;
use curbmap_model::PlaceId;
use rusqlite::{params, Connection};

/// Per-place totals for the four accessibility flags, from one grouped scan
/// of the place's reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportFlagTotals {
    pub total: i64,
    pub ramp: i64,
    pub restroom: i64,
    pub parking: i64,
    pub visual: i64,
}

pub fn report_flag_totals(conn: &Connection, place_id: PlaceId) -> StoreResult<ReportFlagTotals> {
    let mut stmt = conn.prepare_cached(
        "SELECT COUNT(*), \
                COALESCE(SUM(has_ramp), 0), \
                COALESCE(SUM(has_accessible_restroom), 0), \
                COALESCE(SUM(has_accessible_parking), 0), \
                COALESCE(SUM(has_visual_aids), 0) \
         FROM reports WHERE place_id = ?1",
    )?;
    let totals = stmt.query_row(params![place_id.0], |row| {
        Ok(ReportFlagTotals {
            total: row.get(0)?,
            ramp: row.get(1)?,
            restroom: row.get(2)?,
            parking: row.get(3)?,
            visual: row.get(4)?,
        })
    })?;
    Ok(totals)
}
