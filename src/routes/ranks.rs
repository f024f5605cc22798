// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public leaderboard routes.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::LeaderboardEntry;
use crate::services::RankingEngine;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

const MAX_LIMIT: usize = 1000;

pub fn routes<S: Store>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/ranks/global", get(global_ranks::<S>))
        .route("/ranks/monthly", get(monthly_ranks::<S>))
}

#[derive(Deserialize)]
struct RankQuery {
    /// Keep only the top N entries. Parsed here rather than by `Query` so
    /// bad values get the usual JSON error body.
    limit: Option<String>,
}

fn apply_limit(
    mut entries: Vec<LeaderboardEntry>,
    limit: Option<&str>,
) -> Result<Vec<LeaderboardEntry>> {
    if let Some(raw) = limit {
        let limit = raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=MAX_LIMIT).contains(n))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "limit must be an integer between 1 and {}, got {:?}",
                    MAX_LIMIT, raw
                ))
            })?;
        entries.truncate(limit);
    }
    Ok(entries)
}

/// All-time distance leaderboard.
async fn global_ranks<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<RankQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    tracing::debug!(limit = ?params.limit, "Fetching global ranks");

    let entries = RankingEngine::new(state.db.clone(), state.config.month_match)
        .global_ranking()
        .await?;

    Ok(Json(apply_limit(entries, params.limit.as_deref())?))
}

/// Current-month distance leaderboard.
async fn monthly_ranks<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<RankQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    tracing::debug!(limit = ?params.limit, "Fetching monthly ranks");

    let entries = RankingEngine::new(state.db.clone(), state.config.month_match)
        .current_month_ranking()
        .await?;

    Ok(Json(apply_limit(entries, params.limit.as_deref())?))
}
