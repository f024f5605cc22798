// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod follow;
pub mod friendship;
pub mod post;
pub mod ranking;
pub mod user;

pub use activity::ActivityService;
pub use follow::FollowService;
pub use friendship::FriendshipService;
pub use post::{NewPost, PostService};
pub use ranking::RankingEngine;
pub use user::{UserService, UserView};

use crate::db::{Store, MAX_CONCURRENT_DB_OPS};
use crate::error::{AppError, Result};
use crate::models::RelatedUser;
use futures_util::{stream, StreamExt, TryStreamExt};

/// Load public identities for user ids, dropping unknown and deleted users.
async fn resolve_related_users<S: Store>(db: &S, mut ids: Vec<u64>) -> Result<Vec<RelatedUser>> {
    ids.sort_unstable();
    ids.dedup();

    let users: Vec<Option<RelatedUser>> = stream::iter(ids)
        .map(|id| async move {
            let user = db.get_user(id).await?;
            Ok::<_, AppError>(user.filter(|u| !u.is_deleted()).map(|u| RelatedUser {
                id: u.id,
                name: u.name,
                headshot: u.headshot,
            }))
        })
        .buffered(MAX_CONCURRENT_DB_OPS)
        .try_collect()
        .await?;

    Ok(users.into_iter().flatten().collect())
}
