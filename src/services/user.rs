// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public user views and badge listings.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{AwardedBadge, FriendshipStatus, Profile, UnitTotal, User};
use crate::services::FriendshipService;

/// Everything needed to render another user's page for a given viewer.
#[derive(Debug, Clone)]
pub struct UserView {
    pub user: User,
    pub profile: Option<Profile>,
    pub totals: Vec<UnitTotal>,
    /// Relationship to the viewer; `None` for strangers and self
    pub friendship_status: Option<FriendshipStatus>,
}

impl UserView {
    /// Assemble a view from its parts; derived fields are passed in, not
    /// looked up.
    pub fn build(
        user: User,
        profile: Option<Profile>,
        mut totals: Vec<UnitTotal>,
        friendship_status: Option<FriendshipStatus>,
    ) -> Self {
        totals.sort_by(|a, b| a.short_name.cmp(&b.short_name));
        Self {
            user,
            profile,
            totals,
            friendship_status,
        }
    }
}

pub struct UserService<S> {
    db: S,
}

impl<S: Store> UserService<S> {
    pub fn new(db: S) -> Self {
        Self { db }
    }

    async fn active_user(&self, user_id: u64) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| AppError::user_not_found(user_id))
    }

    /// View of `user_id` as seen by `viewer_id`.
    pub async fn view(&self, user_id: u64, viewer_id: Option<u64>) -> Result<UserView> {
        let user = self.active_user(user_id).await?;
        let friendships = FriendshipService::new(self.db.clone());

        let (profile, totals, status) = tokio::try_join!(
            self.db.get_profile(user_id),
            self.db.unit_totals_for_user(user_id),
            friendships.status_between(viewer_id, user_id),
        )?;

        Ok(UserView::build(user, profile, totals, status))
    }

    /// Badges of an active user, newest award first.
    pub async fn badges(&self, user_id: u64) -> Result<Vec<AwardedBadge>> {
        self.active_user(user_id).await?;
        self.db.badges_for_user(user_id).await
    }
}
