// SPDX-License-Identifier: Apache-2.0

use crate::StoreResult;
use rusqlite::Connection;
use std::time::{SystemTime, UNIX_EPOCH};

/// Creates the curbmap tables and indexes if absent. Owned migrations live
/// with the deployment tooling; this covers fresh databases and tests.
pub fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS places (
          id INTEGER PRIMARY KEY,
          external_id TEXT NOT NULL UNIQUE,
          name TEXT NOT NULL,
          address TEXT,
          lat REAL NOT NULL,
          lng REAL NOT NULL,
          categories TEXT NOT NULL DEFAULT '[]',
          rating REAL,
          rating_count INTEGER,
          created_at INTEGER NOT NULL,
          updated_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS reports (
          id INTEGER PRIMARY KEY,
          title TEXT NOT NULL,
          description TEXT NOT NULL,
          report_type TEXT NOT NULL,
          has_ramp INTEGER NOT NULL DEFAULT 0,
          has_accessible_restroom INTEGER NOT NULL DEFAULT 0,
          has_accessible_parking INTEGER NOT NULL DEFAULT 0,
          has_visual_aids INTEGER NOT NULL DEFAULT 0,
          user_id INTEGER NOT NULL,
          place_id INTEGER REFERENCES places(id),
          created_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS votes (
          user_id INTEGER NOT NULL,
          report_id INTEGER NOT NULL REFERENCES reports(id),
          created_at INTEGER NOT NULL,
          UNIQUE (user_id, report_id)
        );
        CREATE TABLE IF NOT EXISTS favorites (
          user_id INTEGER NOT NULL,
          place_id INTEGER NOT NULL REFERENCES places(id),
          created_at INTEGER NOT NULL,
          UNIQUE (user_id, place_id)
        );
        CREATE INDEX IF NOT EXISTS idx_places_external_id ON places(external_id);
        CREATE INDEX IF NOT EXISTS idx_places_name ON places(name);
        CREATE INDEX IF NOT EXISTS idx_reports_place_id ON reports(place_id);
        CREATE INDEX IF NOT EXISTS idx_votes_report_id ON votes(report_id);
        CREATE INDEX IF NOT EXISTS idx_favorites_place_id ON favorites(place_id);
        CREATE INDEX IF NOT EXISTS idx_favorites_user_id ON favorites(user_id);
        ",
    )?;
    Ok(())
}

/// Current unix time in seconds. Timestamp columns hold epoch seconds only;
/// formatting is a presentation concern.
#[must_use]
pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
