// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friendship requests and status lookups between two users.
//!
//! A pair of users has at most one friendship row. The sender is whoever
//! made the latest request.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Friendship, FriendshipStatus, RelatedUser};
use chrono::Utc;

pub struct FriendshipService<S> {
    db: S,
}

impl<S: Store> FriendshipService<S> {
    pub fn new(db: S) -> Self {
        Self { db }
    }

    /// Friendship status between the viewer and another user.
    ///
    /// `None` when there is no viewer, the viewer is looking at themself,
    /// or the two have no friendship row.
    pub async fn status_between(
        &self,
        viewer_id: Option<u64>,
        other_id: u64,
    ) -> Result<Option<FriendshipStatus>> {
        let Some(viewer_id) = viewer_id.filter(|&v| v != other_id) else {
            return Ok(None);
        };
        Ok(self
            .db
            .get_friendship_between(viewer_id, other_id)
            .await?
            .map(|f| f.status))
    }

    /// Send a friend request. A previously denied request may be re-sent by
    /// either side; any other existing row is a conflict.
    pub async fn send_request(&self, sender_id: u64, recipient_id: u64) -> Result<Friendship> {
        if sender_id == recipient_id {
            return Err(AppError::BadRequest(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }
        self.require_active_user(recipient_id).await?;

        if let Some(existing) = self
            .db
            .get_friendship_between(sender_id, recipient_id)
            .await?
        {
            if existing.status != FriendshipStatus::Denied {
                return Err(AppError::Conflict(format!(
                    "Friendship already {}",
                    existing.status.label().to_lowercase()
                )));
            }
        }

        let friendship = Friendship {
            sender_id,
            recipient_id,
            status: FriendshipStatus::Pending,
            updated_at: Utc::now(),
        };
        self.db.upsert_friendship(&friendship).await?;

        tracing::info!(sender_id, recipient_id, "Friend request sent");
        Ok(friendship)
    }

    /// Accept a pending request sent to `recipient_id` by `sender_id`.
    pub async fn accept(&self, recipient_id: u64, sender_id: u64) -> Result<Friendship> {
        self.answer(recipient_id, sender_id, FriendshipStatus::Accepted)
            .await
    }

    /// Deny a pending request sent to `recipient_id` by `sender_id`.
    pub async fn deny(&self, recipient_id: u64, sender_id: u64) -> Result<Friendship> {
        self.answer(recipient_id, sender_id, FriendshipStatus::Denied)
            .await
    }

    async fn answer(
        &self,
        recipient_id: u64,
        sender_id: u64,
        status: FriendshipStatus,
    ) -> Result<Friendship> {
        let mut friendship = self
            .db
            .get_friendship_between(recipient_id, sender_id)
            .await?
            .filter(|f| {
                f.status == FriendshipStatus::Pending
                    && f.sender_id == sender_id
                    && f.recipient_id == recipient_id
            })
            .ok_or_else(|| {
                AppError::NotFound(format!("No pending friend request from {}", sender_id))
            })?;

        friendship.status = status;
        friendship.updated_at = Utc::now();
        self.db.upsert_friendship(&friendship).await?;

        tracing::info!(
            sender_id,
            recipient_id,
            status = status.label(),
            "Friend request answered"
        );
        Ok(friendship)
    }

    /// Block another user, whatever the current state. The blocker becomes
    /// the row's sender.
    pub async fn block(&self, blocker_id: u64, other_id: u64) -> Result<Friendship> {
        if blocker_id == other_id {
            return Err(AppError::BadRequest("Cannot block yourself".to_string()));
        }
        self.require_active_user(other_id).await?;

        let friendship = Friendship {
            sender_id: blocker_id,
            recipient_id: other_id,
            status: FriendshipStatus::Blocked,
            updated_at: Utc::now(),
        };
        self.db.upsert_friendship(&friendship).await?;

        tracing::info!(blocker_id, other_id, "User blocked");
        Ok(friendship)
    }

    /// Accepted friends of a user, ordered by id. Deleted users are left out.
    pub async fn friends_of(&self, user_id: u64) -> Result<Vec<RelatedUser>> {
        let friend_ids: Vec<u64> = self
            .db
            .friendships_for_user(user_id)
            .await?
            .into_iter()
            .filter(|f| f.status == FriendshipStatus::Accepted)
            .map(|f| f.other_party(user_id))
            .collect();

        super::resolve_related_users(&self.db, friend_ids).await
    }

    async fn require_active_user(&self, user_id: u64) -> Result<()> {
        match self.db.get_user(user_id).await? {
            Some(user) if !user.is_deleted() => Ok(()),
            _ => Err(AppError::user_not_found(user_id)),
        }
    }
}
