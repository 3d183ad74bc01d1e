// SPDX-License-Identifier: Apache-2.0

use crate::{StoreError, StoreResult};
use curbmap_model::{ExternalPlaceId, Place, PlaceCandidate, PlaceId};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension, Row};

pub(crate) const PLACE_COLUMNS: &str =
    "id, external_id, name, address, lat, lng, categories, rating, rating_count, created_at, updated_at";

pub(crate) fn place_from_row(row: &Row<'_>) -> rusqlite::Result<Place> {
    let external_raw: String = row.get(1)?;
    let external_id = ExternalPlaceId::parse(&external_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let categories_raw: String = row.get(6)?;
    let categories: Vec<String> = serde_json::from_str(&categories_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Place {
        id: PlaceId(row.get(0)?),
        external_id,
        name: row.get(2)?,
        address: row.get(3)?,
        lat: row.get(4)?,
        lng: row.get(5)?,
        categories,
        rating: row.get(7)?,
        rating_count: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub fn find_by_external_id(
    conn: &Connection,
    external_id: &ExternalPlaceId,
) -> StoreResult<Option<Place>> {
    let sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE external_id = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt
        .query_row(params![external_id.as_str()], place_from_row)
        .optional()?)
}

/// Batched existence lookup: one `IN`-list query for the whole id set.
pub fn find_by_external_ids(
    conn: &Connection,
    external_ids: &[ExternalPlaceId],
) -> StoreResult<Vec<Place>> {
    if external_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = placeholders(external_ids.len());
    let sql =
        format!("SELECT {PLACE_COLUMNS} FROM places WHERE external_id IN ({placeholders})");
    let params: Vec<Value> = external_ids
        .iter()
        .map(|id| Value::Text(id.as_str().to_string()))
        .collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), place_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_by_ids(conn: &Connection, ids: &[PlaceId]) -> StoreResult<Vec<Place>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = placeholders(ids.len());
    let sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE id IN ({placeholders})");
    let params: Vec<Value> = ids.iter().map(|id| Value::Integer(id.0)).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), place_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn place_exists(conn: &Connection, id: PlaceId) -> StoreResult<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM places WHERE id = ?1")?;
    Ok(stmt
        .query_row(params![id.0], |_| Ok(()))
        .optional()?
        .is_some())
}

/// Bulk insert of previously-unseen candidates in one statement.
///
/// Caller guarantees the slice holds distinct external ids. A concurrent
/// writer may still land any of them first; those rows conflict, are
/// skipped by `DO NOTHING`, and are recovered by a re-read so the returned
/// set always covers every input id.
pub fn insert_candidates(
    conn: &Connection,
    candidates: &[PlaceCandidate],
    now: i64,
) -> StoreResult<Vec<Place>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let row_sql = "(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
    let values_sql = vec![row_sql; candidates.len()].join(", ");
    let sql = format!(
        "INSERT INTO places \
         (external_id, name, address, lat, lng, categories, rating, rating_count, created_at, updated_at) \
         VALUES {values_sql} \
         ON CONFLICT(external_id) DO NOTHING \
         RETURNING {PLACE_COLUMNS}"
    );

    let mut params: Vec<Value> = Vec::with_capacity(candidates.len() * 10);
    for candidate in candidates {
        params.push(Value::Text(candidate.external_id.as_str().to_string()));
        params.push(Value::Text(candidate.name.clone()));
        params.push(match &candidate.formatted_address {
            Some(address) => Value::Text(address.clone()),
            None => Value::Null,
        });
        params.push(Value::Real(candidate.location.lat));
        params.push(Value::Real(candidate.location.lng));
        let categories = serde_json::to_string(&candidate.categories)
            .map_err(|e| StoreError(format!("encode categories: {e}")))?;
        params.push(Value::Text(categories));
        params.push(match candidate.rating {
            Some(rating) => Value::Real(rating),
            None => Value::Null,
        });
        params.push(match candidate.rating_count {
            Some(count) => Value::Integer(count),
            None => Value::Null,
        });
        params.push(Value::Integer(now));
        params.push(Value::Integer(now));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut inserted = stmt
        .query_map(params_from_iter(params.iter()), place_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    if inserted.len() < candidates.len() {
        // Lost the race on some ids; the rows exist now, fetch them.
        let missing: Vec<ExternalPlaceId> = candidates
            .iter()
            .filter(|c| !inserted.iter().any(|p| p.external_id == c.external_id))
            .map(|c| c.external_id.clone())
            .collect();
        let recovered = find_by_external_ids(conn, &missing)?;
        if recovered.len() != missing.len() {
            return Err(StoreError(
                "conflict recovery re-read did not cover all rows".to_string(),
            ));
        }
        inserted.extend(recovered);
    }
    Ok(inserted)
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
