// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Friendship and follow routes.

use crate::db::Store;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Friendship, RelatedUser};
use crate::services::{FollowService, FriendshipService};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/api/friends", get(list_friends::<S>))
        .route("/api/friends/{user_id}", post(send_request::<S>))
        .route("/api/friends/{user_id}/accept", post(accept_request::<S>))
        .route("/api/friends/{user_id}/deny", post(deny_request::<S>))
        .route("/api/friends/{user_id}/block", post(block_user::<S>))
        .route(
            "/api/follows/{user_id}",
            post(follow_user::<S>).delete(unfollow_user::<S>),
        )
        .route("/api/users/{user_id}/followers", get(list_followers::<S>))
        .route("/api/users/{user_id}/following", get(list_following::<S>))
}

// ─── Friendships ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FriendshipResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub sender_id: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub recipient_id: u64,
    pub status: String,
    pub updated_at: String,
}

impl From<Friendship> for FriendshipResponse {
    fn from(f: Friendship) -> Self {
        Self {
            sender_id: f.sender_id,
            recipient_id: f.recipient_id,
            status: f.status.label().to_string(),
            updated_at: format_utc_rfc3339(f.updated_at),
        }
    }
}

async fn list_friends<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<RelatedUser>>> {
    let friends = FriendshipService::new(state.db.clone())
        .friends_of(auth.user_id)
        .await?;
    Ok(Json(friends))
}

async fn send_request<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<(StatusCode, Json<FriendshipResponse>)> {
    let friendship = FriendshipService::new(state.db.clone())
        .send_request(auth.user_id, user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(friendship.into())))
}

async fn accept_request<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<Json<FriendshipResponse>> {
    let friendship = FriendshipService::new(state.db.clone())
        .accept(auth.user_id, user_id)
        .await?;
    Ok(Json(friendship.into()))
}

async fn deny_request<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<Json<FriendshipResponse>> {
    let friendship = FriendshipService::new(state.db.clone())
        .deny(auth.user_id, user_id)
        .await?;
    Ok(Json(friendship.into()))
}

async fn block_user<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<Json<FriendshipResponse>> {
    let friendship = FriendshipService::new(state.db.clone())
        .block(auth.user_id, user_id)
        .await?;
    Ok(Json(friendship.into()))
}

// ─── Follows ─────────────────────────────────────────────────

async fn follow_user<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<StatusCode> {
    FollowService::new(state.db.clone())
        .follow(auth.user_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unfollow_user<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<StatusCode> {
    FollowService::new(state.db.clone())
        .unfollow(auth.user_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_followers<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<RelatedUser>>> {
    Ok(Json(
        FollowService::new(state.db.clone())
            .followers(user_id)
            .await?,
    ))
}

async fn list_following<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<RelatedUser>>> {
    Ok(Json(
        FollowService::new(state.db.clone())
            .following(user_id)
            .await?,
    ))
}
