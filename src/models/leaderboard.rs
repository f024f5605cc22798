// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard rows. Derived on every request, never stored.

use crate::models::user::UserSummary;
use serde::Serialize;
use std::cmp::Ordering;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub name: String,
    pub headshot: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    /// Distance the user is ranked by
    pub metric: f64,
}

impl LeaderboardEntry {
    pub fn new(user: &UserSummary, metric: f64) -> Self {
        let location = user.location.clone().unwrap_or_default();
        Self {
            id: user.id,
            name: user.name.clone(),
            headshot: user.headshot.clone(),
            city: location.city,
            country: location.country,
            address: location.address,
            metric,
        }
    }
}

/// Leaderboard order: metric descending, then user id ascending.
pub fn leaderboard_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.metric.total_cmp(&a.metric).then_with(|| a.id.cmp(&b.id))
}

/// Sort entries into leaderboard order.
pub fn sort_leaderboard(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(leaderboard_order);
}
