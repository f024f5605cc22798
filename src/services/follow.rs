// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-directional follow relationships.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Follow, RelatedUser};
use chrono::Utc;

pub struct FollowService<S> {
    db: S,
}

impl<S: Store> FollowService<S> {
    pub fn new(db: S) -> Self {
        Self { db }
    }

    /// Follow another user. Following twice is a no-op.
    pub async fn follow(&self, follower_id: u64, followee_id: u64) -> Result<()> {
        if follower_id == followee_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        match self.db.get_user(followee_id).await? {
            Some(user) if !user.is_deleted() => {}
            _ => return Err(AppError::user_not_found(followee_id)),
        }

        let already = self
            .db
            .followed_by(follower_id)
            .await?
            .iter()
            .any(|f| f.followee_id == followee_id);
        if already {
            tracing::debug!(follower_id, followee_id, "Already following");
            return Ok(());
        }

        self.db
            .upsert_follow(&Follow {
                follower_id,
                followee_id,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(follower_id, followee_id, "User followed");
        Ok(())
    }

    /// Stop following. Returns `NotFound` if there was no follow edge.
    pub async fn unfollow(&self, follower_id: u64, followee_id: u64) -> Result<()> {
        if !self.db.delete_follow(follower_id, followee_id).await? {
            return Err(AppError::NotFound(format!(
                "Not following user {}",
                followee_id
            )));
        }
        tracing::info!(follower_id, followee_id, "User unfollowed");
        Ok(())
    }

    /// Users following `user_id`.
    pub async fn followers(&self, user_id: u64) -> Result<Vec<RelatedUser>> {
        let ids = self
            .db
            .followers_of(user_id)
            .await?
            .into_iter()
            .map(|f| f.follower_id)
            .collect();
        super::resolve_related_users(&self.db, ids).await
    }

    /// Users `user_id` follows.
    pub async fn following(&self, user_id: u64) -> Result<Vec<RelatedUser>> {
        let ids = self
            .db
            .followed_by(user_id)
            .await?
            .into_iter()
            .map(|f| f.followee_id)
            .collect();
        super::resolve_related_users(&self.db, ids).await
    }
}
