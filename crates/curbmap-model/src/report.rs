// SPDX-License-Identifier: Apache-2.0

use crate::place::{PlaceId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct ReportId(pub i64);

impl Display for ReportId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four independently surveyed accessibility features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessibilityFlags {
    pub has_ramp: bool,
    pub has_accessible_restroom: bool,
    pub has_accessible_parking: bool,
    pub has_visual_aids: bool,
}

/// A user-submitted accessibility report. Owned and mutated by
/// collaborators; read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub description: String,
    pub report_type: String,
    pub flags: AccessibilityFlags,
    pub user_id: UserId,
    pub place_id: Option<PlaceId>,
    /// Unix epoch seconds.
    pub created_at: i64,
}

/// One vote per (user, report) pair. Read-only to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: UserId,
    pub report_id: ReportId,
    pub created_at: i64,
}

/// One favorite per (user, place) pair. Read-only to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: UserId,
    pub place_id: PlaceId,
    pub created_at: i64,
}
