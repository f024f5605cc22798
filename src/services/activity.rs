// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity recording service.
//!
//! Handles the write path for tracked activities:
//! 1. Validate the payload is a JSON object with no negative or non-numeric
//!    distance
//! 2. Append it to the user's activity log
//! 3. Add its distance to the user's distance grand total (same atomic write)

use crate::config::DISTANCE_UNIT;
use crate::db::{Store, TotalIncrement};
use crate::error::{AppError, Result};
use crate::models::{ActivityLog, PayloadError};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Records activities for users.
pub struct ActivityService<S> {
    db: S,
}

/// Outcome of recording one activity.
#[derive(Debug)]
pub struct RecordResult {
    pub log: ActivityLog,
    /// Distance added to the grand total, if any
    pub distance_added: Option<f64>,
}

impl<S: Store> ActivityService<S> {
    pub fn new(db: S) -> Self {
        Self { db }
    }

    /// Record an activity for `user_id` at the current time.
    pub async fn record(&self, user_id: u64, activity: Value) -> Result<RecordResult> {
        self.record_at(user_id, activity, Utc::now()).await
    }

    /// Record an activity with an explicit creation time.
    pub async fn record_at(
        &self,
        user_id: u64,
        activity: Value,
        at: DateTime<Utc>,
    ) -> Result<RecordResult> {
        if !activity.is_object() {
            return Err(AppError::BadRequest(
                "Activity must be a JSON object".to_string(),
            ));
        }

        let user = self
            .db
            .get_user(user_id)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| AppError::user_not_found(user_id))?;

        let log = ActivityLog::new(user.id, activity.to_string(), at);

        // Logs without a distance are still kept; the leaderboard skips them.
        let distance = match log.distance() {
            Ok(distance) => Some(distance),
            Err(e @ PayloadError::InvalidDistance(_)) => {
                return Err(AppError::BadRequest(e.to_string()));
            }
            Err(e) => {
                tracing::info!(user_id, error = %e, "Activity has no usable distance");
                None
            }
        };

        let increment = match distance {
            Some(amount) => self
                .db
                .find_unit_by_short_name(DISTANCE_UNIT)
                .await?
                .map(|unit| TotalIncrement { unit, amount }),
            None => None,
        };

        self.db.record_activity(&log, increment.as_ref()).await?;

        tracing::info!(
            user_id,
            log_id = %log.id,
            distance = ?distance,
            "Activity recorded"
        );

        Ok(RecordResult {
            distance_added: increment.map(|i| i.amount),
            log,
        })
    }
}
