// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stride Circle: social fitness tracking backend
//!
//! This crate provides the API for activity logging, friendships, follows,
//! badges, posts and distance leaderboards.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState<S = FirestoreDb> {
    pub config: Config,
    pub db: S,
}
