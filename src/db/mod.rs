// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Everything above this module talks to storage through [`Store`].
//! [`FirestoreDb`] backs production; [`MemoryDb`] backs tests and benches.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{
    ActivityLog, AwardedBadge, Badge, Follow, Friendship, Post, PostQuery, Profile, Unit,
    UnitTotal, User, UserBadge, UserSummary,
};
use crate::time_utils::MonthWindow;
use chrono::{DateTime, Utc};
use std::future::Future;
use uuid::Uuid;

/// Upper bound on in-flight store calls when fanning out over many rows.
pub(crate) const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PROFILES: &str = "profiles";
    pub const UNITS: &str = "units";
    /// Keyed by `{user_id}_{unit_id}`
    pub const USER_UNIT_TOTALS: &str = "user_unit_totals";
    pub const ACTIVITY_LOGS: &str = "activity_logs";
    pub const BADGES: &str = "badges";
    /// Keyed by `{user_id}_{badge_id}`
    pub const USER_BADGES: &str = "user_badges";
    pub const POSTS: &str = "posts";
    /// Keyed by `{lower_id}_{higher_id}`
    pub const FRIENDSHIPS: &str = "friendships";
    /// Keyed by `{follower_id}_{followee_id}`
    pub const FOLLOWS: &str = "follows";
}

/// Amount to add to a user's unit total alongside an activity write.
#[derive(Debug, Clone)]
pub struct TotalIncrement {
    pub unit: Unit,
    pub amount: f64,
}

/// Running total after adding `amount` to `previous`.
///
/// Both stores call this inside their atomic write so an overflowing total
/// is refused before anything is written.
pub(crate) fn next_grand_total(previous: f64, amount: f64) -> Result<f64, AppError> {
    let total = previous + amount;
    if total.is_finite() {
        Ok(total)
    } else {
        Err(AppError::BadRequest(format!(
            "distance {} would overflow the running total",
            amount
        )))
    }
}

/// Typed storage operations.
///
/// Soft-deleted rows are only excluded where a method says so; there is no
/// implicit scope.
pub trait Store: Clone + Send + Sync + 'static {
    // ─── Users ───────────────────────────────────────────────────

    /// All users that are not soft-deleted, with their profile location,
    /// ordered by id ascending.
    fn users_with_profiles(
        &self,
    ) -> impl Future<Output = Result<Vec<UserSummary>, AppError>> + Send;

    /// Get a user by ID, including soft-deleted users.
    fn get_user(&self, user_id: u64)
        -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn upsert_user(&self, user: &User) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Mark a user as deleted. Returns `NotFound` for unknown users.
    fn soft_delete_user(
        &self,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn get_profile(
        &self,
        user_id: u64,
    ) -> impl Future<Output = Result<Option<Profile>, AppError>> + Send;

    fn upsert_profile(&self, profile: &Profile)
        -> impl Future<Output = Result<(), AppError>> + Send;

    // ─── Units & Totals ──────────────────────────────────────────

    fn find_unit_by_short_name(
        &self,
        short_name: &str,
    ) -> impl Future<Output = Result<Option<Unit>, AppError>> + Send;

    fn upsert_unit(&self, unit: &Unit) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Grand total of one unit for one user, `None` if never recorded.
    fn unit_total(
        &self,
        user_id: u64,
        unit_id: u64,
    ) -> impl Future<Output = Result<Option<f64>, AppError>> + Send;

    fn set_unit_total(&self, total: &UnitTotal)
        -> impl Future<Output = Result<(), AppError>> + Send;

    fn unit_totals_for_user(
        &self,
        user_id: u64,
    ) -> impl Future<Output = Result<Vec<UnitTotal>, AppError>> + Send;

    /// Every user's total for one unit, in no particular order.
    fn unit_totals_for_unit(
        &self,
        unit_id: u64,
    ) -> impl Future<Output = Result<Vec<UnitTotal>, AppError>> + Send;

    // ─── Activity Logs ───────────────────────────────────────────

    /// Every activity log whose local creation month falls in `window`.
    fn activity_logs_in_month(
        &self,
        window: MonthWindow,
    ) -> impl Future<Output = Result<Vec<ActivityLog>, AppError>> + Send;

    /// Append a log and, if given, add to the user's unit total in the same
    /// atomic write. Fails with `BadRequest` if the new total would not be
    /// finite.
    fn record_activity(
        &self,
        log: &ActivityLog,
        increment: Option<&TotalIncrement>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    // ─── Badges ──────────────────────────────────────────────────

    fn upsert_badge(&self, badge: &Badge) -> impl Future<Output = Result<(), AppError>> + Send;

    fn award_badge(&self, award: &UserBadge) -> impl Future<Output = Result<(), AppError>> + Send;

    /// A user's badges, most recently awarded first.
    fn badges_for_user(
        &self,
        user_id: u64,
    ) -> impl Future<Output = Result<Vec<AwardedBadge>, AppError>> + Send;

    // ─── Posts ───────────────────────────────────────────────────

    fn get_post(&self, post_id: Uuid)
        -> impl Future<Output = Result<Option<Post>, AppError>> + Send;

    /// Insert or overwrite a post.
    fn save_post(&self, post: &Post) -> impl Future<Output = Result<(), AppError>> + Send;

    fn list_posts(
        &self,
        query: PostQuery,
    ) -> impl Future<Output = Result<Vec<Post>, AppError>> + Send;

    // ─── Friendships & Follows ───────────────────────────────────

    /// The friendship row linking two users, in either direction.
    fn get_friendship_between(
        &self,
        a: u64,
        b: u64,
    ) -> impl Future<Output = Result<Option<Friendship>, AppError>> + Send;

    fn upsert_friendship(
        &self,
        friendship: &Friendship,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// All friendship rows a user is part of, as sender or recipient.
    fn friendships_for_user(
        &self,
        user_id: u64,
    ) -> impl Future<Output = Result<Vec<Friendship>, AppError>> + Send;

    fn upsert_follow(&self, follow: &Follow) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Remove a follow edge. Returns whether it existed.
    fn delete_follow(
        &self,
        follower_id: u64,
        followee_id: u64,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    /// Edges where `user_id` is the followee.
    fn followers_of(
        &self,
        user_id: u64,
    ) -> impl Future<Output = Result<Vec<Follow>, AppError>> + Send;

    /// Edges where `user_id` is the follower.
    fn followed_by(
        &self,
        user_id: u64,
    ) -> impl Future<Output = Result<Vec<Follow>, AppError>> + Send;
}
