// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod activity_log;
pub mod badge;
pub mod leaderboard;
pub mod post;
pub mod social;
pub mod unit;
pub mod user;

pub use activity_log::{ActivityLog, PayloadError};
pub use badge::{AwardedBadge, Badge, UserBadge};
pub use leaderboard::LeaderboardEntry;
pub use post::{Post, PostQuery, SortOrder};
pub use social::{Follow, Friendship, FriendshipStatus, RelatedUser};
pub use unit::{Unit, UnitTotal};
pub use user::{Profile, ProfileLocation, User, UserSummary};
