// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard computation tests against the in-memory store.

use axum::{body::Body, http::Request, http::StatusCode};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::sync::Arc;
use stride_circle::config::Config;
use stride_circle::db::{MemoryDb, Store, TotalIncrement};
use stride_circle::error::AppError;
use stride_circle::models::{
    ActivityLog, AwardedBadge, Badge, Follow, Friendship, LeaderboardEntry, Post, PostQuery,
    Profile, Unit, UnitTotal, User, UserBadge, UserSummary,
};
use stride_circle::routes::create_router;
use stride_circle::services::RankingEngine;
use stride_circle::time_utils::{MonthMatch, MonthWindow};
use stride_circle::AppState;
use uuid::Uuid;

mod common;
use common::{seed_distance_unit, seed_user, send_json, DISTANCE_UNIT_ID};

async fn set_total(db: &MemoryDb, user_id: u64, grand_total: f64) {
    db.set_unit_total(&UnitTotal {
        user_id,
        unit_id: DISTANCE_UNIT_ID,
        short_name: "distance".to_string(),
        grand_total,
        updated_at: Utc::now(),
    })
    .await
    .unwrap();
}

/// Log dated in a given local (year, month), independent of the wall clock.
async fn add_log(db: &MemoryDb, user_id: u64, year: i32, month: u32, payload: &str) {
    let log = ActivityLog {
        id: Uuid::now_v7(),
        user_id,
        activity: payload.to_string(),
        created_at: Utc::now(),
        created_year: year,
        created_month: month,
    };
    db.record_activity(&log, None).await.unwrap();
}

fn ids(entries: &[LeaderboardEntry]) -> Vec<u64> {
    entries.iter().map(|e| e.id).collect()
}

fn metrics(entries: &[LeaderboardEntry]) -> Vec<(u64, f64)> {
    entries.iter().map(|e| (e.id, e.metric)).collect()
}

fn march_2024() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// GLOBAL RANKING
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_global_ranking_orders_by_total() {
    let db = MemoryDb::new();
    seed_distance_unit(&db).await;
    seed_user(&db, 1, "Ana", Some("Auckland")).await;
    seed_user(&db, 2, "Ben", Some("Wellington")).await;
    seed_user(&db, 3, "Cy", None).await;
    set_total(&db, 1, 10.0).await;
    set_total(&db, 3, 25.0).await;

    let engine = RankingEngine::new(db, MonthMatch::default());
    let ranking = engine.global_ranking().await.unwrap();

    assert_eq!(metrics(&ranking), vec![(3, 25.0), (1, 10.0), (2, 0.0)]);
}

#[tokio::test]
async fn test_global_ranking_zero_fills_missing_totals() {
    let db = MemoryDb::new();
    seed_distance_unit(&db).await;
    for id in 1..=4 {
        seed_user(&db, id, &format!("User {}", id), None).await;
    }
    set_total(&db, 2, 3.5).await;

    let ranking = RankingEngine::new(db, MonthMatch::default())
        .global_ranking()
        .await
        .unwrap();

    assert_eq!(ranking.len(), 4, "Every active user is ranked");
    assert_eq!(ranking[0].id, 2);
    // Zero-metric ties fall back to ascending id
    assert_eq!(metrics(&ranking[1..]), vec![(1, 0.0), (3, 0.0), (4, 0.0)]);
}

#[tokio::test]
async fn test_global_ranking_is_non_increasing() {
    let db = MemoryDb::new();
    seed_distance_unit(&db).await;
    let totals = [4.0, 19.5, 0.25, 19.5, 7.0, 0.0, 100.0];
    for (i, total) in totals.iter().enumerate() {
        let id = i as u64 + 1;
        seed_user(&db, id, &format!("User {}", id), None).await;
        set_total(&db, id, *total).await;
    }

    let ranking = RankingEngine::new(db, MonthMatch::default())
        .global_ranking()
        .await
        .unwrap();

    assert!(ranking.windows(2).all(|w| w[0].metric >= w[1].metric));
    assert_eq!(ids(&ranking[..3]), vec![7, 2, 4]);
}

#[tokio::test]
async fn test_global_ranking_carries_profile_location() {
    let db = MemoryDb::new();
    seed_distance_unit(&db).await;
    seed_user(&db, 1, "Ana", Some("Auckland")).await;
    seed_user(&db, 2, "Ben", None).await;

    let ranking = RankingEngine::new(db, MonthMatch::default())
        .global_ranking()
        .await
        .unwrap();

    assert_eq!(ranking[0].city.as_deref(), Some("Auckland"));
    assert_eq!(ranking[0].country.as_deref(), Some("NZ"));
    assert_eq!(ranking[1].name, "Ben");
    assert!(ranking[1].city.is_none());
}

#[tokio::test]
async fn test_global_ranking_without_distance_unit() {
    let db = MemoryDb::new();
    seed_user(&db, 1, "Ana", None).await;
    seed_user(&db, 2, "Ben", None).await;

    let ranking = RankingEngine::new(db, MonthMatch::default())
        .global_ranking()
        .await
        .unwrap();

    assert_eq!(metrics(&ranking), vec![(1, 0.0), (2, 0.0)]);
}

/// In-memory store whose unit lookup always fails.
#[derive(Clone, Default)]
struct UnitLookupDown(MemoryDb);

impl Store for UnitLookupDown {
    async fn users_with_profiles(&self) -> Result<Vec<UserSummary>, AppError> {
        self.0.users_with_profiles().await
    }
    async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        self.0.get_user(user_id).await
    }
    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.0.upsert_user(user).await
    }
    async fn soft_delete_user(&self, user_id: u64, at: DateTime<Utc>) -> Result<(), AppError> {
        self.0.soft_delete_user(user_id, at).await
    }
    async fn get_profile(&self, user_id: u64) -> Result<Option<Profile>, AppError> {
        self.0.get_profile(user_id).await
    }
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        self.0.upsert_profile(profile).await
    }
    async fn find_unit_by_short_name(&self, _short_name: &str) -> Result<Option<Unit>, AppError> {
        Err(AppError::Database("units collection unavailable".to_string()))
    }
    async fn upsert_unit(&self, unit: &Unit) -> Result<(), AppError> {
        self.0.upsert_unit(unit).await
    }
    async fn unit_total(&self, user_id: u64, unit_id: u64) -> Result<Option<f64>, AppError> {
        self.0.unit_total(user_id, unit_id).await
    }
    async fn set_unit_total(&self, total: &UnitTotal) -> Result<(), AppError> {
        self.0.set_unit_total(total).await
    }
    async fn unit_totals_for_user(&self, user_id: u64) -> Result<Vec<UnitTotal>, AppError> {
        self.0.unit_totals_for_user(user_id).await
    }
    async fn unit_totals_for_unit(&self, unit_id: u64) -> Result<Vec<UnitTotal>, AppError> {
        self.0.unit_totals_for_unit(unit_id).await
    }
    async fn activity_logs_in_month(
        &self,
        window: MonthWindow,
    ) -> Result<Vec<ActivityLog>, AppError> {
        self.0.activity_logs_in_month(window).await
    }
    async fn record_activity(
        &self,
        log: &ActivityLog,
        increment: Option<&TotalIncrement>,
    ) -> Result<(), AppError> {
        self.0.record_activity(log, increment).await
    }
    async fn upsert_badge(&self, badge: &Badge) -> Result<(), AppError> {
        self.0.upsert_badge(badge).await
    }
    async fn award_badge(&self, award: &UserBadge) -> Result<(), AppError> {
        self.0.award_badge(award).await
    }
    async fn badges_for_user(&self, user_id: u64) -> Result<Vec<AwardedBadge>, AppError> {
        self.0.badges_for_user(user_id).await
    }
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>, AppError> {
        self.0.get_post(post_id).await
    }
    async fn save_post(&self, post: &Post) -> Result<(), AppError> {
        self.0.save_post(post).await
    }
    async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>, AppError> {
        self.0.list_posts(query).await
    }
    async fn get_friendship_between(&self, a: u64, b: u64) -> Result<Option<Friendship>, AppError> {
        self.0.get_friendship_between(a, b).await
    }
    async fn upsert_friendship(&self, friendship: &Friendship) -> Result<(), AppError> {
        self.0.upsert_friendship(friendship).await
    }
    async fn friendships_for_user(&self, user_id: u64) -> Result<Vec<Friendship>, AppError> {
        self.0.friendships_for_user(user_id).await
    }
    async fn upsert_follow(&self, follow: &Follow) -> Result<(), AppError> {
        self.0.upsert_follow(follow).await
    }
    async fn delete_follow(&self, follower_id: u64, followee_id: u64) -> Result<bool, AppError> {
        self.0.delete_follow(follower_id, followee_id).await
    }
    async fn followers_of(&self, user_id: u64) -> Result<Vec<Follow>, AppError> {
        self.0.followers_of(user_id).await
    }
    async fn followed_by(&self, user_id: u64) -> Result<Vec<Follow>, AppError> {
        self.0.followed_by(user_id).await
    }
}

async fn seed_with_totals(db: &UnitLookupDown) {
    seed_distance_unit(db).await;
    seed_user(db, 2, "Ben", None).await;
    seed_user(db, 1, "Ana", None).await;
    set_total(&db.0, 2, 40.0).await;
}

#[tokio::test]
async fn test_global_ranking_when_unit_lookup_fails() {
    let db = UnitLookupDown::default();
    seed_with_totals(&db).await;

    let ranking = RankingEngine::new(db, MonthMatch::default())
        .global_ranking()
        .await
        .unwrap();

    // Stored totals are not consulted without the unit
    assert_eq!(metrics(&ranking), vec![(1, 0.0), (2, 0.0)]);
}

#[tokio::test]
async fn test_global_ranks_route_when_unit_lookup_fails() {
    let db = UnitLookupDown::default();
    seed_with_totals(&db).await;
    let app = create_router(Arc::new(AppState {
        config: Config::test_default(),
        db,
    }));

    let request = Request::builder()
        .uri("/ranks/global")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(app, request).await;

    assert_eq!(status, StatusCode::OK);
    let entries: Vec<(u64, f64)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["id"].as_u64().unwrap(), e["metric"].as_f64().unwrap()))
        .collect();
    assert_eq!(entries, vec![(1, 0.0), (2, 0.0)]);
}

#[tokio::test]
async fn test_global_ranking_excludes_deleted_users() {
    let db = MemoryDb::new();
    seed_distance_unit(&db).await;
    seed_user(&db, 1, "Ana", None).await;
    seed_user(&db, 2, "Ben", None).await;
    set_total(&db, 2, 50.0).await;
    db.soft_delete_user(2, Utc::now()).await.unwrap();

    let ranking = RankingEngine::new(db, MonthMatch::default())
        .global_ranking()
        .await
        .unwrap();

    assert_eq!(ids(&ranking), vec![1]);
}

#[tokio::test]
async fn test_global_ranking_empty_store() {
    let ranking = RankingEngine::new(MemoryDb::new(), MonthMatch::default())
        .global_ranking()
        .await
        .unwrap();
    assert!(ranking.is_empty());
}

#[tokio::test]
async fn test_global_ranking_reflects_recorded_activity() {
    let db = MemoryDb::new();
    let unit = seed_distance_unit(&db).await;
    seed_user(&db, 1, "Ana", None).await;
    seed_user(&db, 2, "Ben", None).await;

    let increment = TotalIncrement { unit, amount: 6.0 };
    let log = ActivityLog::new(2, r#"{"distance":6.0}"#.to_string(), Utc::now());
    db.record_activity(&log, Some(&increment)).await.unwrap();

    let ranking = RankingEngine::new(db, MonthMatch::default())
        .global_ranking()
        .await
        .unwrap();

    assert_eq!(metrics(&ranking), vec![(2, 6.0), (1, 0.0)]);
}

// ═══════════════════════════════════════════════════════════════════════════
// MONTHLY RANKING
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_month_ranking_sums_distances() {
    let db = MemoryDb::new();
    seed_user(&db, 1, "Ana", None).await;
    add_log(&db, 1, 2024, 3, r#"{"distance": 3.0}"#).await;
    add_log(&db, 1, 2024, 3, r#"{"distance": 4.5}"#).await;
    add_log(&db, 1, 2024, 3, r#"{"distance": 0.0}"#).await;

    let ranking = RankingEngine::new(db, MonthMatch::Calendar)
        .month_ranking_at(march_2024())
        .await
        .unwrap();

    assert_eq!(metrics(&ranking), vec![(1, 7.5)]);
}

#[tokio::test]
async fn test_month_ranking_excludes_inactive_users() {
    let db = MemoryDb::new();
    seed_user(&db, 1, "X", None).await;
    seed_user(&db, 2, "Y", None).await;
    add_log(&db, 1, 2024, 3, r#"{"distance": 2}"#).await;
    add_log(&db, 1, 2024, 3, r#"{"distance": 3}"#).await;
    // Y's only log is from the previous month
    add_log(&db, 2, 2024, 2, r#"{"distance": 40}"#).await;

    let ranking = RankingEngine::new(db, MonthMatch::Calendar)
        .month_ranking_at(march_2024())
        .await
        .unwrap();

    assert_eq!(metrics(&ranking), vec![(1, 5.0)]);
}

#[tokio::test]
async fn test_month_of_year_matches_earlier_years() {
    let db = MemoryDb::new();
    seed_user(&db, 1, "Ana", None).await;
    seed_user(&db, 2, "Ben", None).await;
    add_log(&db, 1, 2024, 3, r#"{"distance": 1}"#).await;
    add_log(&db, 2, 2023, 3, r#"{"distance": 9}"#).await;

    let ranking = RankingEngine::new(db, MonthMatch::MonthOfYear)
        .month_ranking_at(march_2024())
        .await
        .unwrap();

    assert_eq!(metrics(&ranking), vec![(2, 9.0), (1, 1.0)]);
}

#[tokio::test]
async fn test_calendar_match_ignores_earlier_years() {
    let db = MemoryDb::new();
    seed_user(&db, 1, "Ana", None).await;
    seed_user(&db, 2, "Ben", None).await;
    add_log(&db, 1, 2024, 3, r#"{"distance": 1}"#).await;
    add_log(&db, 2, 2023, 3, r#"{"distance": 9}"#).await;

    let ranking = RankingEngine::new(db, MonthMatch::Calendar)
        .month_ranking_at(march_2024())
        .await
        .unwrap();

    assert_eq!(metrics(&ranking), vec![(1, 1.0)]);
}

#[tokio::test]
async fn test_month_ranking_skips_malformed_payloads() {
    let db = MemoryDb::new();
    seed_user(&db, 1, "Ana", None).await;
    seed_user(&db, 2, "Ben", None).await;
    add_log(&db, 1, 2024, 3, r#"{"distance": "2.5"}"#).await;
    add_log(&db, 1, 2024, 3, "not json").await;
    add_log(&db, 2, 2024, 3, r#"{"distance": null}"#).await;

    let ranking = RankingEngine::new(db, MonthMatch::Calendar)
        .month_ranking_at(march_2024())
        .await
        .unwrap();

    assert_eq!(metrics(&ranking), vec![(1, 2.5), (2, 0.0)]);
}

#[tokio::test]
async fn test_month_ranking_ignores_deleted_users() {
    let db = MemoryDb::new();
    seed_user(&db, 1, "Ana", None).await;
    seed_user(&db, 2, "Ben", None).await;
    add_log(&db, 1, 2024, 3, r#"{"distance": 1}"#).await;
    add_log(&db, 2, 2024, 3, r#"{"distance": 30}"#).await;
    db.soft_delete_user(2, Utc::now()).await.unwrap();

    let ranking = RankingEngine::new(db, MonthMatch::Calendar)
        .month_ranking_at(march_2024())
        .await
        .unwrap();

    assert_eq!(ids(&ranking), vec![1]);
}

#[tokio::test]
async fn test_month_ranking_empty_month() {
    let db = MemoryDb::new();
    seed_user(&db, 1, "Ana", None).await;

    let ranking = RankingEngine::new(db, MonthMatch::default())
        .month_ranking_at(march_2024())
        .await
        .unwrap();

    assert!(ranking.is_empty());
}

#[tokio::test]
async fn test_current_month_picks_up_new_activity() {
    let db = MemoryDb::new();
    seed_user(&db, 1, "Ana", None).await;
    let log = ActivityLog::new(1, r#"{"distance": 12}"#.to_string(), Utc::now());
    db.record_activity(&log, None).await.unwrap();

    let ranking = RankingEngine::new(db, MonthMatch::Calendar)
        .current_month_ranking()
        .await
        .unwrap();

    assert_eq!(metrics(&ranking), vec![(1, 12.0)]);
}

// ═══════════════════════════════════════════════════════════════════════════
// IDEMPOTENCE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_rankings_are_idempotent() {
    let db = MemoryDb::new();
    seed_distance_unit(&db).await;
    for id in 1..=6 {
        seed_user(&db, id, &format!("User {}", id), None).await;
        set_total(&db, id, (id % 3) as f64).await;
        add_log(&db, id, 2024, 3, &format!(r#"{{"distance": {}}}"#, id % 2)).await;
    }

    let engine = RankingEngine::new(db, MonthMatch::Calendar);

    let first = engine.global_ranking().await.unwrap();
    let second = engine.global_ranking().await.unwrap();
    assert_eq!(metrics(&first), metrics(&second));

    let first = engine.month_ranking_at(march_2024()).await.unwrap();
    let second = engine.month_ranking_at(march_2024()).await.unwrap();
    assert_eq!(metrics(&first), metrics(&second));
}
