// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Badges (achievements) and their awards to users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    /// Badge ID (also used as document ID)
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    /// Icon URL
    pub icon: Option<String>,
}

/// Join record: a badge awarded to a user. Document ID is `{user_id}_{badge_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBadge {
    pub user_id: u64,
    pub badge_id: u64,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub awarded_at: DateTime<Utc>,
}

impl UserBadge {
    pub fn doc_id(&self) -> String {
        format!("{}_{}", self.user_id, self.badge_id)
    }
}

/// A badge together with when the user earned it.
#[derive(Debug, Clone)]
pub struct AwardedBadge {
    pub badge: Badge,
    pub awarded_at: DateTime<Utc>,
}
