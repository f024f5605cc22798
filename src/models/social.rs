// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friendship and follow relationship records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// State of a friendship request, stored as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Denied,
    Blocked,
}

impl FriendshipStatus {
    /// Upper-case label used in API responses.
    pub fn label(self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "PENDING",
            FriendshipStatus::Accepted => "ACCEPTED",
            FriendshipStatus::Denied => "DENIED",
            FriendshipStatus::Blocked => "BLOCKED",
        }
    }
}

impl From<FriendshipStatus> for u8 {
    fn from(status: FriendshipStatus) -> Self {
        match status {
            FriendshipStatus::Pending => 0,
            FriendshipStatus::Accepted => 1,
            FriendshipStatus::Denied => 2,
            FriendshipStatus::Blocked => 3,
        }
    }
}

impl TryFrom<u8> for FriendshipStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(FriendshipStatus::Pending),
            1 => Ok(FriendshipStatus::Accepted),
            2 => Ok(FriendshipStatus::Denied),
            3 => Ok(FriendshipStatus::Blocked),
            other => Err(format!("unknown friendship status code {}", other)),
        }
    }
}

/// Friendship between two users. At most one row per pair, whoever sent it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friendship {
    pub sender_id: u64,
    pub recipient_id: u64,
    pub status: FriendshipStatus,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Document ID for the pair: `{lower_id}_{higher_id}`.
    pub fn pair_id(a: u64, b: u64) -> String {
        format!("{}_{}", a.min(b), a.max(b))
    }

    pub fn doc_id(&self) -> String {
        Self::pair_id(self.sender_id, self.recipient_id)
    }

    /// The other party of this friendship, seen from `user_id`.
    pub fn other_party(&self, user_id: u64) -> u64 {
        if self.sender_id == user_id {
            self.recipient_id
        } else {
            self.sender_id
        }
    }
}

/// Follow edge. Document ID is `{follower_id}_{followee_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    pub follower_id: u64,
    pub followee_id: u64,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Follow {
    pub fn doc_id(follower_id: u64, followee_id: u64) -> String {
        format!("{}_{}", follower_id, followee_id)
    }
}

/// Minimal public identity of a related user.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RelatedUser {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub headshot: Option<String>,
}
