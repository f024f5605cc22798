// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: profiles, badges and activities.

use crate::db::Store;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{AwardedBadge, Profile, UnitTotal};
use crate::services::{ActivityService, UserService, UserView};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/api/me", get(get_me::<S>))
        .route("/api/users/{user_id}", get(get_user::<S>))
        .route("/api/users/{user_id}/badges", get(get_badges::<S>))
        .route("/api/activities", post(record_activity::<S>))
}

// ─── User Profile ────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub bio: Option<String>,
    pub address: Option<String>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            gender: p.gender,
            dob: p.dob,
            country: p.country,
            city: p.city,
            bio: p.bio,
            address: p.address,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UnitTotalResponse {
    pub unit: String,
    pub grand_total: f64,
}

impl From<UnitTotal> for UnitTotalResponse {
    fn from(t: UnitTotal) -> Self {
        Self {
            unit: t.short_name,
            grand_total: t.grand_total,
        }
    }
}

/// User as rendered for a viewer. Contact details are only present when
/// viewers look at themselves.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub headshot: Option<String>,
    pub user_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub profile: Option<ProfileResponse>,
    pub totals: Vec<UnitTotalResponse>,
    /// PENDING / ACCEPTED / DENIED / BLOCKED, or null
    pub friendship_status: Option<String>,
}

impl UserResponse {
    fn render(view: UserView, viewer_id: u64) -> Self {
        let is_self = view.user.id == viewer_id;
        let user = view.user;
        Self {
            id: user.id,
            name: user.name,
            headshot: user.headshot,
            user_code: user.user_code,
            email: user.email.filter(|_| is_self),
            phone: user.phone.filter(|_| is_self),
            height: user.height.filter(|_| is_self),
            weight: user.weight.filter(|_| is_self),
            profile: view.profile.map(ProfileResponse::from),
            totals: view.totals.into_iter().map(UnitTotalResponse::from).collect(),
            friendship_status: view.friendship_status.map(|s| s.label().to_string()),
        }
    }
}

/// Get current user profile.
async fn get_me<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let view = UserService::new(state.db.clone())
        .view(auth.user_id, Some(auth.user_id))
        .await?;
    Ok(Json(UserResponse::render(view, auth.user_id)))
}

/// Get another user's profile with the viewer's friendship status.
async fn get_user<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<Json<UserResponse>> {
    tracing::debug!(viewer_id = auth.user_id, user_id, "Fetching user");

    let view = UserService::new(state.db.clone())
        .view(user_id, Some(auth.user_id))
        .await?;
    Ok(Json(UserResponse::render(view, auth.user_id)))
}

// ─── Badges ──────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BadgeResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub awarded_at: String,
}

impl From<AwardedBadge> for BadgeResponse {
    fn from(a: AwardedBadge) -> Self {
        Self {
            id: a.badge.id,
            name: a.badge.name,
            description: a.badge.description,
            icon: a.badge.icon,
            awarded_at: format_utc_rfc3339(a.awarded_at),
        }
    }
}

/// Badges a user has earned, newest first.
async fn get_badges<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<BadgeResponse>>> {
    let badges = UserService::new(state.db.clone()).badges(user_id).await?;
    Ok(Json(badges.into_iter().map(BadgeResponse::from).collect()))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct RecordActivityRequest {
    /// Free-form activity payload; `distance` feeds the leaderboards
    activity: serde_json::Value,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecordActivityResponse {
    pub id: String,
    pub created_at: String,
    pub distance_added: Option<f64>,
}

/// Record an activity for the current user.
async fn record_activity<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<RecordActivityRequest>,
) -> Result<(StatusCode, Json<RecordActivityResponse>)> {
    let result = ActivityService::new(state.db.clone())
        .record(auth.user_id, body.activity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecordActivityResponse {
            id: result.log.id.to_string(),
            created_at: format_utc_rfc3339(result.log.created_at),
            distance_added: result.distance_added,
        }),
    ))
}
