// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post routes.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Post, PostQuery, SortOrder};
use crate::services::{NewPost, PostService};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

const MAX_PER_PAGE: u32 = 100;

pub fn routes<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/api/posts", get(list_posts::<S>).post(create_post::<S>))
        .route("/api/posts/{post_id}", delete(delete_post::<S>))
}

#[derive(Deserialize)]
struct PostsQuery {
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    page: u32,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
    /// List oldest posts first
    #[serde(default)]
    oldest_first: bool,
}

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    20
}

/// Public view of a post. The author ID is not exposed.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub status: String,
    pub post_slug: String,
    pub created_at: String,
}

impl From<Post> for PostSummary {
    fn from(p: Post) -> Self {
        Self {
            id: p.id.to_string(),
            title: p.title,
            description: p.description,
            thumbnail: p.thumbnail,
            status: p.status,
            post_slug: p.post_slug,
            created_at: format_utc_rfc3339(p.created_at),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PostsResponse {
    pub posts: Vec<PostSummary>,
    pub page: u32,
    pub per_page: u32,
}

/// List live posts, newest first unless `oldest_first` is set.
async fn list_posts<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<PostsQuery>,
) -> Result<Json<PostsResponse>> {
    if params.page < 1 {
        return Err(AppError::BadRequest(
            "Page must be greater than 0".to_string(),
        ));
    }
    let limit = params.per_page.clamp(1, MAX_PER_PAGE);
    let offset = (params.page - 1)
        .checked_mul(limit)
        .ok_or_else(|| AppError::BadRequest("Page number causes overflow".to_string()))?;

    let posts = PostService::new(state.db.clone())
        .list(PostQuery {
            include_deleted: false,
            order: if params.oldest_first {
                SortOrder::OldestFirst
            } else {
                SortOrder::NewestFirst
            },
            limit,
            offset,
        })
        .await?;

    Ok(Json(PostsResponse {
        posts: posts.into_iter().map(PostSummary::from).collect(),
        page: params.page,
        per_page: limit,
    }))
}

async fn create_post<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<NewPost>,
) -> Result<(StatusCode, Json<PostSummary>)> {
    let post = PostService::new(state.db.clone())
        .create(auth.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(post.into())))
}

async fn delete_post<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode> {
    PostService::new(state.db.clone())
        .delete(auth.user_id, post_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
