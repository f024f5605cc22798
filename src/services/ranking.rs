// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard computation.
//!
//! Two read-only pipelines over the store:
//! 1. Global: every active user, ranked by their all-time distance total
//!    (users without a total rank with 0).
//! 2. Current month: only users with activity logs this month, ranked by
//!    the summed `distance` of those logs.
//!
//! Both sort by metric descending, ties broken by user id ascending.

use crate::config::DISTANCE_UNIT;
use crate::db::Store;
use crate::error::Result;
use crate::models::leaderboard::sort_leaderboard;
use crate::models::{ActivityLog, LeaderboardEntry, UserSummary};
use crate::time_utils::{MonthMatch, MonthWindow};
use chrono::{DateTime, Local};
use std::collections::{BTreeMap, HashMap};

/// Computes leaderboards from a [`Store`] snapshot.
pub struct RankingEngine<S> {
    store: S,
    month_match: MonthMatch,
}

impl<S: Store> RankingEngine<S> {
    pub fn new(store: S, month_match: MonthMatch) -> Self {
        Self { store, month_match }
    }

    /// All-time distance ranking over every active user.
    pub async fn global_ranking(&self) -> Result<Vec<LeaderboardEntry>> {
        let users = self.store.users_with_profiles().await?;

        let unit = match self.store.find_unit_by_short_name(DISTANCE_UNIT).await {
            Ok(Some(unit)) => Some(unit),
            Ok(None) => {
                tracing::warn!(unit = DISTANCE_UNIT, "Unit not defined, ranking all users at 0");
                None
            }
            Err(e) => {
                tracing::warn!(
                    unit = DISTANCE_UNIT,
                    error = %e,
                    "Unit lookup failed, ranking all users at 0"
                );
                None
            }
        };

        let totals: HashMap<u64, f64> = match unit {
            Some(unit) => self
                .store
                .unit_totals_for_unit(unit.id)
                .await?
                .into_iter()
                .filter(|t| {
                    let finite = t.grand_total.is_finite();
                    if !finite {
                        tracing::warn!(user_id = t.user_id, "Ignoring non-finite unit total");
                    }
                    finite
                })
                .map(|t| (t.user_id, t.grand_total))
                .collect(),
            None => HashMap::new(),
        };

        let mut entries: Vec<LeaderboardEntry> = users
            .iter()
            .map(|user| LeaderboardEntry::new(user, totals.get(&user.id).copied().unwrap_or(0.0)))
            .collect();

        sort_leaderboard(&mut entries);

        tracing::debug!(count = entries.len(), "Computed global ranking");
        Ok(entries)
    }

    /// Distance ranking for the server's current month.
    pub async fn current_month_ranking(&self) -> Result<Vec<LeaderboardEntry>> {
        self.month_ranking_at(Local::now()).await
    }

    /// Distance ranking for the month containing `now`.
    pub async fn month_ranking_at(&self, now: DateTime<Local>) -> Result<Vec<LeaderboardEntry>> {
        let window = MonthWindow::containing(now, self.month_match);

        let (users, logs) = tokio::try_join!(
            self.store.users_with_profiles(),
            self.store.activity_logs_in_month(window),
        )?;

        let tally = tally_month_distances(&users, &logs);
        if tally.skipped > 0 {
            tracing::warn!(
                skipped = tally.skipped,
                month = window.month,
                "Skipped malformed activity payloads in monthly ranking"
            );
        }

        tracing::debug!(
            count = tally.entries.len(),
            month = window.month,
            year = ?window.year,
            "Computed monthly ranking"
        );
        Ok(tally.entries)
    }
}

/// Result of summing one month's activity logs.
#[derive(Debug, Default)]
pub struct MonthTally {
    /// Sorted leaderboard entries, one per user with at least one log
    pub entries: Vec<LeaderboardEntry>,
    /// Logs whose payload had no usable distance, or whose distance would
    /// push the sum past the largest finite value
    pub skipped: usize,
}

/// Sum each user's log distances and rank the users that have logs.
///
/// Logs of users not in `users` (e.g. deleted accounts) are ignored.
/// Malformed payloads and distances that would overflow the sum are skipped;
/// the user still ranks if they have logs.
pub fn tally_month_distances(users: &[UserSummary], logs: &[ActivityLog]) -> MonthTally {
    let known: BTreeMap<u64, &UserSummary> = users.iter().map(|u| (u.id, u)).collect();
    let mut sums: BTreeMap<u64, f64> = BTreeMap::new();
    let mut skipped = 0;

    for log in logs {
        if !known.contains_key(&log.user_id) {
            continue;
        }
        let sum = sums.entry(log.user_id).or_insert(0.0);

        match log.distance() {
            Ok(distance) if (*sum + distance).is_finite() => *sum += distance,
            Ok(distance) => {
                skipped += 1;
                tracing::warn!(
                    log_id = %log.id,
                    user_id = log.user_id,
                    distance,
                    "Skipping activity log that would overflow the monthly sum"
                );
            }
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    log_id = %log.id,
                    user_id = log.user_id,
                    error = %e,
                    "Skipping activity log with malformed payload"
                );
            }
        }
    }

    let mut entries: Vec<LeaderboardEntry> = sums
        .into_iter()
        .filter_map(|(user_id, sum)| {
            known
                .get(&user_id)
                .map(|user| LeaderboardEntry::new(user, sum))
        })
        .collect();
    sort_leaderboard(&mut entries);

    MonthTally { entries, skipped }
}
