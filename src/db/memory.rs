// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store used by tests, benchmarks and local runs.
//!
//! Holds every collection in ordered maps behind one lock, so each
//! operation (including `record_activity`) is atomic.

use crate::db::{next_grand_total, Store, TotalIncrement};
use crate::error::AppError;
use crate::models::{
    ActivityLog, AwardedBadge, Badge, Follow, Friendship, Post, PostQuery, Profile, SortOrder,
    Unit, UnitTotal, User, UserBadge, UserSummary,
};
use crate::time_utils::MonthWindow;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: BTreeMap<u64, User>,
    profiles: BTreeMap<u64, Profile>,
    units: BTreeMap<u64, Unit>,
    unit_totals: BTreeMap<(u64, u64), UnitTotal>,
    activity_logs: BTreeMap<Uuid, ActivityLog>,
    badges: BTreeMap<u64, Badge>,
    user_badges: BTreeMap<(u64, u64), UserBadge>,
    posts: BTreeMap<Uuid, Post>,
    friendships: BTreeMap<String, Friendship>,
    follows: BTreeMap<(u64, u64), Follow>,
}

/// Shared in-memory store. Clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Database("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Database("memory store lock poisoned".to_string()))
    }
}

impl Store for MemoryDb {
    async fn users_with_profiles(&self) -> Result<Vec<UserSummary>, AppError> {
        let tables = self.read()?;
        Ok(tables
            .users
            .values()
            .filter(|u| !u.is_deleted())
            .map(|u| UserSummary::from_parts(u, tables.profiles.get(&u.id)))
            .collect())
    }

    async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.get(&user_id).cloned())
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.write()?.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn soft_delete_user(&self, user_id: u64, at: DateTime<Utc>) -> Result<(), AppError> {
        let mut tables = self.write()?;
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::user_not_found(user_id))?;
        user.deleted_at = Some(at);
        Ok(())
    }

    async fn get_profile(&self, user_id: u64) -> Result<Option<Profile>, AppError> {
        Ok(self.read()?.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        self.write()?
            .profiles
            .insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn find_unit_by_short_name(&self, short_name: &str) -> Result<Option<Unit>, AppError> {
        Ok(self
            .read()?
            .units
            .values()
            .find(|u| u.short_name == short_name)
            .cloned())
    }

    async fn upsert_unit(&self, unit: &Unit) -> Result<(), AppError> {
        self.write()?.units.insert(unit.id, unit.clone());
        Ok(())
    }

    async fn unit_total(&self, user_id: u64, unit_id: u64) -> Result<Option<f64>, AppError> {
        Ok(self
            .read()?
            .unit_totals
            .get(&(user_id, unit_id))
            .map(|t| t.grand_total))
    }

    async fn set_unit_total(&self, total: &UnitTotal) -> Result<(), AppError> {
        self.write()?
            .unit_totals
            .insert((total.user_id, total.unit_id), total.clone());
        Ok(())
    }

    async fn unit_totals_for_user(&self, user_id: u64) -> Result<Vec<UnitTotal>, AppError> {
        Ok(self
            .read()?
            .unit_totals
            .range((user_id, u64::MIN)..=(user_id, u64::MAX))
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn unit_totals_for_unit(&self, unit_id: u64) -> Result<Vec<UnitTotal>, AppError> {
        Ok(self
            .read()?
            .unit_totals
            .values()
            .filter(|t| t.unit_id == unit_id)
            .cloned()
            .collect())
    }

    async fn activity_logs_in_month(
        &self,
        window: MonthWindow,
    ) -> Result<Vec<ActivityLog>, AppError> {
        Ok(self
            .read()?
            .activity_logs
            .values()
            .filter(|log| window.contains(log.created_year, log.created_month))
            .cloned()
            .collect())
    }

    async fn record_activity(
        &self,
        log: &ActivityLog,
        increment: Option<&TotalIncrement>,
    ) -> Result<(), AppError> {
        let mut tables = self.write()?;

        if let Some(increment) = increment {
            let key = (log.user_id, increment.unit.id);
            let previous = tables.unit_totals.get(&key).map_or(0.0, |t| t.grand_total);
            let grand_total = next_grand_total(previous, increment.amount)?;

            let total = tables.unit_totals.entry(key).or_insert_with(|| UnitTotal {
                user_id: log.user_id,
                unit_id: increment.unit.id,
                short_name: increment.unit.short_name.clone(),
                grand_total: 0.0,
                updated_at: log.created_at,
            });
            total.grand_total = grand_total;
            total.updated_at = log.created_at;
        }

        tables.activity_logs.insert(log.id, log.clone());
        Ok(())
    }

    async fn upsert_badge(&self, badge: &Badge) -> Result<(), AppError> {
        self.write()?.badges.insert(badge.id, badge.clone());
        Ok(())
    }

    async fn award_badge(&self, award: &UserBadge) -> Result<(), AppError> {
        self.write()?
            .user_badges
            .insert((award.user_id, award.badge_id), award.clone());
        Ok(())
    }

    async fn badges_for_user(&self, user_id: u64) -> Result<Vec<AwardedBadge>, AppError> {
        let tables = self.read()?;
        let mut awarded: Vec<AwardedBadge> = tables
            .user_badges
            .range((user_id, u64::MIN)..=(user_id, u64::MAX))
            .filter_map(|(_, award)| {
                tables.badges.get(&award.badge_id).map(|badge| AwardedBadge {
                    badge: badge.clone(),
                    awarded_at: award.awarded_at,
                })
            })
            .collect();
        awarded.sort_by(|a, b| b.awarded_at.cmp(&a.awarded_at));
        Ok(awarded)
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(self.read()?.posts.get(&post_id).cloned())
    }

    async fn save_post(&self, post: &Post) -> Result<(), AppError> {
        self.write()?.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>, AppError> {
        let tables = self.read()?;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| query.include_deleted || !p.is_deleted())
            .cloned()
            .collect();

        match query.order {
            SortOrder::NewestFirst => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::OldestFirst => posts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        Ok(posts
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn get_friendship_between(&self, a: u64, b: u64) -> Result<Option<Friendship>, AppError> {
        Ok(self
            .read()?
            .friendships
            .get(&Friendship::pair_id(a, b))
            .cloned())
    }

    async fn upsert_friendship(&self, friendship: &Friendship) -> Result<(), AppError> {
        self.write()?
            .friendships
            .insert(friendship.doc_id(), friendship.clone());
        Ok(())
    }

    async fn friendships_for_user(&self, user_id: u64) -> Result<Vec<Friendship>, AppError> {
        Ok(self
            .read()?
            .friendships
            .values()
            .filter(|f| f.sender_id == user_id || f.recipient_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_follow(&self, follow: &Follow) -> Result<(), AppError> {
        self.write()?
            .follows
            .insert((follow.follower_id, follow.followee_id), follow.clone());
        Ok(())
    }

    async fn delete_follow(&self, follower_id: u64, followee_id: u64) -> Result<bool, AppError> {
        Ok(self
            .write()?
            .follows
            .remove(&(follower_id, followee_id))
            .is_some())
    }

    async fn followers_of(&self, user_id: u64) -> Result<Vec<Follow>, AppError> {
        Ok(self
            .read()?
            .follows
            .values()
            .filter(|f| f.followee_id == user_id)
            .cloned()
            .collect())
    }

    async fn followed_by(&self, user_id: u64) -> Result<Vec<Follow>, AppError> {
        Ok(self
            .read()?
            .follows
            .range((user_id, u64::MIN)..=(user_id, u64::MAX))
            .map(|(_, f)| f.clone())
            .collect())
    }
}
