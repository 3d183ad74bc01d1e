// SPDX-License-Identifier: Apache-2.0

use crate::places::{place_from_row, PLACE_COLUMNS};
use crate::StoreResult;
use curbmap_model::{Place, PlaceId};
use rusqlite::{params_from_iter, types::Value, Connection};

/// Base filter shared by every listing query: case-insensitive substring
/// match on name/address plus category containment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Sort keys the store can order by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoredSortColumn {
    Name,
    Rating,
    CreatedAt,
}

impl StoredSortColumn {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Rating => "rating",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Escapes `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '!'`
/// pattern.
#[must_use]
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '!') {
            out.push('!');
        }
        out.push(c);
    }
    out
}

fn filter_clause(filter: &ListFilter) -> (String, Vec<Value>) {
    let mut where_parts: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        where_parts.push(
            "(LOWER(name) LIKE ? ESCAPE '!' OR LOWER(COALESCE(address, '')) LIKE ? ESCAPE '!')"
                .to_string(),
        );
        params.push(Value::Text(pattern.clone()));
        params.push(Value::Text(pattern));
    }
    if let Some(category) = filter.category.as_deref().filter(|s| !s.is_empty()) {
        // Categories are stored as a JSON array of strings; containment is a
        // match on the quoted element.
        let pattern = format!("%\"{}\"%", escape_like(&category.to_lowercase()));
        where_parts.push("LOWER(categories) LIKE ? ESCAPE '!'".to_string());
        params.push(Value::Text(pattern));
    }

    let clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    (clause, params)
}

/// Total row count under the filter, independent of pagination.
pub fn count_places(conn: &Connection, filter: &ListFilter) -> StoreResult<u64> {
    let (clause, params) = filter_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM places{clause}");
    let mut stmt = conn.prepare(&sql)?;
    let count: i64 = stmt.query_row(params_from_iter(params.iter()), |row| row.get(0))?;
    Ok(count.max(0) as u64)
}

/// One page ordered by a stored column. Ties break on ascending id so page
/// boundaries are stable.
pub fn select_place_page(
    conn: &Connection,
    filter: &ListFilter,
    column: StoredSortColumn,
    direction: SortDirection,
    limit: u64,
    offset: u64,
) -> StoreResult<Vec<Place>> {
    let (clause, mut params) = filter_clause(filter);
    let sql = format!(
        "SELECT {PLACE_COLUMNS} FROM places{clause} \
         ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
        column.as_sql(),
        direction.as_sql()
    );
    params.push(Value::Integer(limit as i64));
    params.push(Value::Integer(offset as i64));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), place_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// The entire filtered id set, for sorts the store cannot perform itself.
pub fn select_filtered_place_ids(
    conn: &Connection,
    filter: &ListFilter,
) -> StoreResult<Vec<PlaceId>> {
    let (clause, params) = filter_clause(filter);
    let sql = format!("SELECT id FROM places{clause} ORDER BY id ASC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            Ok(PlaceId(row.get(0)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
