// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post publishing, listing and soft deletion.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Post, PostQuery};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Input for a new post. The author comes from the caller, never the body.
#[derive(Debug, Deserialize, Validate)]
pub struct NewPost {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(url)]
    pub thumbnail: Option<String>,
    #[serde(default = "default_status")]
    #[validate(length(min = 1, max = 32))]
    pub status: String,
    #[validate(length(min = 1, max = 200), custom(function = "validate_slug"))]
    pub post_slug: String,
}

fn default_status() -> String {
    "published".to_string()
}

fn validate_slug(slug: &str) -> std::result::Result<(), ValidationError> {
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

pub struct PostService<S> {
    db: S,
}

impl<S: Store> PostService<S> {
    pub fn new(db: S) -> Self {
        Self { db }
    }

    /// Publish a post authored by `author_id`.
    pub async fn create(&self, author_id: u64, input: NewPost) -> Result<Post> {
        input.validate()?;

        let post = Post {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            thumbnail: input.thumbnail,
            status: input.status,
            post_slug: input.post_slug,
            created_by: author_id,
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.db.save_post(&post).await?;

        tracing::info!(author_id, post_id = %post.id, "Post created");
        Ok(post)
    }

    pub async fn list(&self, query: PostQuery) -> Result<Vec<Post>> {
        self.db.list_posts(query).await
    }

    /// Soft-delete a post. Only its author may delete it; deleted posts are
    /// treated as missing.
    pub async fn delete(&self, requester_id: u64, post_id: Uuid) -> Result<()> {
        let mut post = self
            .db
            .get_post(post_id)
            .await?
            .filter(|p| !p.is_deleted())
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post_id)))?;

        if post.created_by != requester_id {
            return Err(AppError::Forbidden(
                "Only the author can delete a post".to_string(),
            ));
        }

        post.deleted_at = Some(Utc::now());
        self.db.save_post(&post).await?;

        tracing::info!(requester_id, %post_id, "Post soft-deleted");
        Ok(())
    }
}
