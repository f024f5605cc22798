// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Append-only activity log entries and their JSON payloads.

use crate::time_utils::local_year_month;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One tracked activity, stored as the raw JSON the client submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    /// Log ID (also used as document ID)
    pub id: Uuid,
    /// Owner
    pub user_id: u64,
    /// JSON object, expected to carry at least a numeric `distance`
    pub activity: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Server-local year of `created_at`
    pub created_year: i32,
    /// Server-local month (1-12) of `created_at`
    pub created_month: u32,
}

impl ActivityLog {
    /// Build a new log entry, deriving the local year/month from `created_at`.
    pub fn new(user_id: u64, activity: String, created_at: DateTime<Utc>) -> Self {
        let (created_year, created_month) = local_year_month(created_at);
        Self {
            id: Uuid::now_v7(),
            user_id,
            activity,
            created_at,
            created_year,
            created_month,
        }
    }

    /// Distance recorded in this entry's payload.
    pub fn distance(&self) -> Result<f64, PayloadError> {
        payload_distance(&self.activity)
    }
}

/// Reasons an activity payload cannot contribute a distance.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payload has no distance field")]
    MissingDistance,

    #[error("distance is not a finite, non-negative number: {0}")]
    InvalidDistance(String),
}

/// Extract the `distance` field from a JSON activity payload.
///
/// Numbers and numeric strings are accepted; anything else is an error, as
/// is a negative distance.
pub fn payload_distance(raw: &str) -> Result<f64, PayloadError> {
    let payload: Value = serde_json::from_str(raw)?;
    let distance = payload.get("distance").ok_or(PayloadError::MissingDistance)?;

    let value = match distance {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null => return Err(PayloadError::MissingDistance),
        _ => None,
    };

    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| PayloadError::InvalidDistance(distance.to_string()))
}
