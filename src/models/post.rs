// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Posts published by users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored post record. Deletion is soft: `deleted_at` is set, the row stays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Post ID (also used as document ID)
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Thumbnail URL
    pub thumbnail: Option<String>,
    /// Publication status ("draft", "published", ...)
    pub status: String,
    pub post_slug: String,
    /// Author user ID (not exposed in API responses)
    pub created_by: u64,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Sort direction for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Explicit filter and ordering for listing posts.
#[derive(Debug, Clone, Copy)]
pub struct PostQuery {
    pub include_deleted: bool,
    pub order: SortOrder,
    pub limit: u32,
    pub offset: u32,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            include_deleted: false,
            order: SortOrder::NewestFirst,
            limit: 50,
            offset: 0,
        }
    }
}
