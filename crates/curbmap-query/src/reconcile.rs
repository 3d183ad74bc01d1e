// SPDX-License-Identifier: Apache-2.0

use curbmap_model::{ExternalPlaceId, Place, PlaceCandidate};
use curbmap_store::{self as store, StoreError};
use rusqlite::Connection;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReconcileError {
    Store(StoreError),
    /// A candidate could not be resolved after insert and recovery. Points
    /// at a broken store invariant, not caller input.
    Unresolved(ExternalPlaceId),
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store failure during reconciliation: {e}"),
            Self::Unresolved(id) => write!(f, "candidate {id} unresolved after reconciliation"),
        }
    }
}

impl std::error::Error for ReconcileError {}

impl From<StoreError> for ReconcileError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

pub fn find_by_external_id(
    conn: &Connection,
    external_id: &ExternalPlaceId,
) -> Result<Option<Place>, ReconcileError> {
    Ok(store::find_by_external_id(conn, external_id)?)
}

/// Matches a candidate batch against the store and creates the missing rows.
///
/// One batched existence query and one bulk insert, no per-candidate round
/// trips. Duplicate external ids within the batch resolve to the first
/// occurrence, so at most one row is ever inserted per unique id. The
/// returned vector is aligned 1:1 and order-preserving with the input.
///
/// A concurrent writer racing the existence check loses nothing: the insert
/// skips conflicting rows and re-reads them (see the store crate), so the
/// uniqueness violation is never visible here.
pub fn reconcile_batch(
    conn: &Connection,
    candidates: &[PlaceCandidate],
) -> Result<Vec<Place>, ReconcileError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut distinct: Vec<ExternalPlaceId> = Vec::with_capacity(candidates.len());
    let mut seen: HashSet<&ExternalPlaceId> = HashSet::with_capacity(candidates.len());
    for candidate in candidates {
        if seen.insert(&candidate.external_id) {
            distinct.push(candidate.external_id.clone());
        }
    }

    let existing = store::find_by_external_ids(conn, &distinct)?;
    let mut resolved: HashMap<ExternalPlaceId, Place> = existing
        .into_iter()
        .map(|p| (p.external_id.clone(), p))
        .collect();

    // First occurrence wins among intra-batch duplicates.
    let mut missing: Vec<PlaceCandidate> = Vec::new();
    let mut queued: HashSet<ExternalPlaceId> = HashSet::new();
    for candidate in candidates {
        if !resolved.contains_key(&candidate.external_id)
            && queued.insert(candidate.external_id.clone())
        {
            missing.push(candidate.clone());
        }
    }

    if !missing.is_empty() {
        let inserted = store::insert_candidates(conn, &missing, store::now_epoch())?;
        debug!(
            batch = candidates.len(),
            existing = resolved.len(),
            inserted = inserted.len(),
            "reconciled place batch"
        );
        for place in inserted {
            resolved.insert(place.external_id.clone(), place);
        }
    }

    candidates
        .iter()
        .map(|candidate| {
            resolved
                .get(&candidate.external_id)
                .cloned()
                .ok_or_else(|| ReconcileError::Unresolved(candidate.external_id.clone()))
        })
        .collect()
}

/// One-element batch convenience wrapper.
pub fn find_or_create(
    conn: &Connection,
    candidate: &PlaceCandidate,
) -> Result<Place, ReconcileError> {
    let mut places = reconcile_batch(conn, std::slice::from_ref(candidate))?;
    places
        .pop()
        .ok_or_else(|| ReconcileError::Unresolved(candidate.external_id.clone()))
}
