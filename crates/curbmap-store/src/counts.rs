// SPDX-License-Identifier: Apache-2.0

use crate::places::placeholders;
use crate::StoreResult;
use curbmap_model::{PlaceId, UserId};
use rusqlite::{params_from_iter, types::Value, Connection};
use std::collections::HashMap;

/// Report counts grouped by place, one query for the whole id set. Places
/// with no reports are simply absent from the map.
pub fn report_counts(conn: &Connection, ids: &[PlaceId]) -> StoreResult<HashMap<PlaceId, i64>> {
    grouped_counts(
        conn,
        ids,
        "SELECT place_id, COUNT(*) FROM reports WHERE place_id IN ({in_list}) GROUP BY place_id",
    )
}

/// Vote counts per place, joined through reports and grouped, one query.
pub fn vote_counts(conn: &Connection, ids: &[PlaceId]) -> StoreResult<HashMap<PlaceId, i64>> {
    grouped_counts(
        conn,
        ids,
        "SELECT r.place_id, COUNT(*) FROM votes v \
         JOIN reports r ON r.id = v.report_id \
         WHERE r.place_id IN ({in_list}) GROUP BY r.place_id",
    )
}

/// The viewer's favorite timestamps for the requested places. Empty map when
/// nothing is favorited.
pub fn favorited_at_for_viewer(
    conn: &Connection,
    viewer: UserId,
    ids: &[PlaceId],
) -> StoreResult<HashMap<PlaceId, i64>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let in_list = placeholders(ids.len());
    let sql = format!(
        "SELECT place_id, created_at FROM favorites \
         WHERE user_id = ? AND place_id IN ({in_list})"
    );
    let mut params: Vec<Value> = Vec::with_capacity(ids.len() + 1);
    params.push(Value::Integer(viewer.0));
    params.extend(ids.iter().map(|id| Value::Integer(id.0)));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        Ok((PlaceId(row.get(0)?), row.get::<_, i64>(1)?))
    })?;
    let mut out = HashMap::with_capacity(ids.len());
    for row in rows {
        let (id, at) = row?;
        out.insert(id, at);
    }
    Ok(out)
}

fn grouped_counts(
    conn: &Connection,
    ids: &[PlaceId],
    sql_template: &str,
) -> StoreResult<HashMap<PlaceId, i64>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let sql = sql_template.replace("{in_list}", &placeholders(ids.len()));
    let params: Vec<Value> = ids.iter().map(|id| Value::Integer(id.0)).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
        Ok((PlaceId(row.get(0)?), row.get::<_, i64>(1)?))
    })?;
    let mut out = HashMap::with_capacity(ids.len());
    for row in rows {
        let (id, count) = row?;
        out.insert(id, count);
    }
    Ok(out)
}
