// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Measurement units and per-user accumulated totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A measurement unit badges and totals are expressed in (e.g. "distance").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Unit ID (also used as document ID)
    pub id: u64,
    /// Lookup key, unique across units
    pub short_name: String,
    /// Human readable name
    pub name: String,
}

/// Grand total of one unit for one user.
///
/// Document ID is `{user_id}_{unit_id}`, so there is at most one row per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTotal {
    pub user_id: u64,
    pub unit_id: u64,
    /// Copied from the unit so totals can be listed without a join
    pub short_name: String,
    pub grand_total: f64,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl UnitTotal {
    pub fn doc_id(user_id: u64, unit_id: u64) -> String {
        format!("{}_{}", user_id, unit_id)
    }
}
