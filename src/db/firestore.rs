// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users and profiles
//! - Units and per-user unit totals
//! - Activity logs (append-only)
//! - Badges, posts, friendships and follows

use crate::db::{
    collections, next_grand_total, Store, TotalIncrement, MAX_CONCURRENT_DB_OPS,
};
use crate::error::AppError;
use crate::models::{
    ActivityLog, AwardedBadge, Badge, Follow, Friendship, Post, PostQuery, Profile, SortOrder,
    Unit, UnitTotal, User, UserBadge, UserSummary,
};
use crate::time_utils::MonthWindow;
use chrono::{DateTime, Utc};
use firestore::errors::{BackoffError, FirestoreError};
use futures_util::{stream, StreamExt};
use std::collections::HashMap;
use uuid::Uuid;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator rejects real credentials, so skip the default token source.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Read a whole collection.
    async fn list_all<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch a single document by ID.
    async fn get_by_id<T>(&self, collection: &str, doc_id: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a single document.
    async fn put<T>(&self, collection: &str, doc_id: &str, object: &T) -> Result<(), AppError>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Send + Sync,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Map a Firestore error inside a transaction, retrying only when the
/// backend says another attempt can succeed.
fn transaction_error(step: &str, e: FirestoreError) -> BackoffError<AppError> {
    let retry = matches!(&e, FirestoreError::DatabaseError(db_err) if db_err.retry_possible);
    let err = AppError::Database(format!("Failed to {} in transaction: {}", step, e));
    if retry {
        BackoffError::transient(err)
    } else {
        BackoffError::permanent(err)
    }
}

impl Store for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn users_with_profiles(&self) -> Result<Vec<UserSummary>, AppError> {
        let (users, profiles) = tokio::try_join!(
            self.list_all::<User>(collections::USERS),
            self.list_all::<Profile>(collections::PROFILES),
        )?;

        let profiles: HashMap<u64, Profile> =
            profiles.into_iter().map(|p| (p.user_id, p)).collect();

        let mut summaries: Vec<UserSummary> = users
            .iter()
            .filter(|u| !u.is_deleted())
            .map(|u| UserSummary::from_parts(u, profiles.get(&u.id)))
            .collect();
        summaries.sort_by_key(|s| s.id);

        tracing::debug!(count = summaries.len(), "Loaded active users with profiles");
        Ok(summaries)
    }

    async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        self.get_by_id(collections::USERS, &user_id.to_string())
            .await
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.put(collections::USERS, &user.id.to_string(), user)
            .await
    }

    async fn soft_delete_user(&self, user_id: u64, at: DateTime<Utc>) -> Result<(), AppError> {
        let mut user = self
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found(user_id))?;
        user.deleted_at = Some(at);
        self.upsert_user(&user).await?;

        tracing::info!(user_id, "User soft-deleted");
        Ok(())
    }

    async fn get_profile(&self, user_id: u64) -> Result<Option<Profile>, AppError> {
        self.get_by_id(collections::PROFILES, &user_id.to_string())
            .await
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        self.put(collections::PROFILES, &profile.user_id.to_string(), profile)
            .await
    }

    // ─── Unit Operations ─────────────────────────────────────────

    async fn find_unit_by_short_name(&self, short_name: &str) -> Result<Option<Unit>, AppError> {
        let units: Vec<Unit> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::UNITS)
            .filter(|q| q.for_all([q.field("short_name").eq(short_name)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(units.into_iter().next())
    }

    async fn upsert_unit(&self, unit: &Unit) -> Result<(), AppError> {
        self.put(collections::UNITS, &unit.id.to_string(), unit)
            .await
    }

    async fn unit_total(&self, user_id: u64, unit_id: u64) -> Result<Option<f64>, AppError> {
        let total: Option<UnitTotal> = self
            .get_by_id(
                collections::USER_UNIT_TOTALS,
                &UnitTotal::doc_id(user_id, unit_id),
            )
            .await?;
        Ok(total.map(|t| t.grand_total))
    }

    async fn set_unit_total(&self, total: &UnitTotal) -> Result<(), AppError> {
        self.put(
            collections::USER_UNIT_TOTALS,
            &UnitTotal::doc_id(total.user_id, total.unit_id),
            total,
        )
        .await
    }

    async fn unit_totals_for_user(&self, user_id: u64) -> Result<Vec<UnitTotal>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_UNIT_TOTALS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn unit_totals_for_unit(&self, unit_id: u64) -> Result<Vec<UnitTotal>, AppError> {
        let totals: Vec<UnitTotal> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USER_UNIT_TOTALS)
            .filter(move |q| q.for_all([q.field("unit_id").eq(unit_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(unit_id, count = totals.len(), "Loaded unit totals");
        Ok(totals)
    }

    // ─── Activity Log Operations ─────────────────────────────────

    async fn activity_logs_in_month(
        &self,
        window: MonthWindow,
    ) -> Result<Vec<ActivityLog>, AppError> {
        let logs: Vec<ActivityLog> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITY_LOGS)
            .filter(move |q| {
                q.for_all([
                    q.field("created_month").eq(window.month),
                    window.year.and_then(|year| q.field("created_year").eq(year)),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            month = window.month,
            year = ?window.year,
            count = logs.len(),
            "Loaded activity logs for month"
        );
        Ok(logs)
    }

    /// Atomically store the log and bump the unit total.
    ///
    /// The total is read through the transaction, so a concurrent commit to
    /// the same total aborts this attempt and `run_transaction` retries it.
    async fn record_activity(
        &self,
        log: &ActivityLog,
        increment: Option<&TotalIncrement>,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let (user_id, log_id, total_updated) = (log.user_id, log.id, increment.is_some());
        let log = log.clone();
        let increment = increment.cloned();

        client
            .run_transaction(move |db, transaction| {
                let log = log.clone();
                let increment = increment.clone();
                Box::pin(async move {
                    if let Some(increment) = increment {
                        let doc_id = UnitTotal::doc_id(log.user_id, increment.unit.id);

                        let current: Option<UnitTotal> = db
                            .fluent()
                            .select()
                            .by_id_in(collections::USER_UNIT_TOTALS)
                            .obj()
                            .one(&doc_id)
                            .await
                            .map_err(|e| transaction_error("read total", e))?;

                        let previous = current.map_or(0.0, |t| t.grand_total);
                        let grand_total = next_grand_total(previous, increment.amount)
                            .map_err(BackoffError::permanent)?;
                        let total = UnitTotal {
                            user_id: log.user_id,
                            unit_id: increment.unit.id,
                            short_name: increment.unit.short_name.clone(),
                            grand_total,
                            updated_at: log.created_at,
                        };

                        db.fluent()
                            .update()
                            .in_col(collections::USER_UNIT_TOTALS)
                            .document_id(&doc_id)
                            .object(&total)
                            .add_to_transaction(transaction)
                            .map_err(|e| transaction_error("add total", e))?;
                    }

                    db.fluent()
                        .update()
                        .in_col(collections::ACTIVITY_LOGS)
                        .document_id(log.id.to_string())
                        .object(&log)
                        .add_to_transaction(transaction)
                        .map_err(|e| transaction_error("add log", e))?;

                    Ok::<(), BackoffError<AppError>>(())
                })
            })
            .await
            .map_err(|e| match e {
                FirestoreError::ErrorInTransaction(err) => match err.source.downcast::<AppError>() {
                    Ok(app_err) => *app_err,
                    Err(other) => AppError::Database(format!("Transaction failed: {}", other)),
                },
                other => AppError::Database(format!("Transaction failed: {}", other)),
            })?;

        tracing::info!(
            user_id,
            log_id = %log_id,
            total_updated,
            "Activity recorded atomically"
        );
        Ok(())
    }

    // ─── Badge Operations ────────────────────────────────────────

    async fn upsert_badge(&self, badge: &Badge) -> Result<(), AppError> {
        self.put(collections::BADGES, &badge.id.to_string(), badge)
            .await
    }

    async fn award_badge(&self, award: &UserBadge) -> Result<(), AppError> {
        self.put(collections::USER_BADGES, &award.doc_id(), award)
            .await
    }

    async fn badges_for_user(&self, user_id: u64) -> Result<Vec<AwardedBadge>, AppError> {
        let awards: Vec<UserBadge> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USER_BADGES)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([("awarded_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // `buffered` keeps the award order
        let badges = stream::iter(awards)
            .map(|award| async move {
                let badge: Option<Badge> = self
                    .get_by_id(collections::BADGES, &award.badge_id.to_string())
                    .await?;
                Ok::<_, AppError>(badge.map(|badge| AwardedBadge {
                    badge,
                    awarded_at: award.awarded_at,
                }))
            })
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<AwardedBadge>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<Option<AwardedBadge>>, AppError>>()?;

        Ok(badges.into_iter().flatten().collect())
    }

    // ─── Post Operations ─────────────────────────────────────────

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>, AppError> {
        self.get_by_id(collections::POSTS, &post_id.to_string())
            .await
    }

    async fn save_post(&self, post: &Post) -> Result<(), AppError> {
        self.put(collections::POSTS, &post.id.to_string(), post)
            .await
    }

    async fn list_posts(&self, query: PostQuery) -> Result<Vec<Post>, AppError> {
        let direction = match query.order {
            SortOrder::NewestFirst => firestore::FirestoreQueryDirection::Descending,
            SortOrder::OldestFirst => firestore::FirestoreQueryDirection::Ascending,
        };

        let select = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::POSTS);

        let select = if query.include_deleted {
            select
        } else {
            select.filter(|q| q.for_all([q.field("deleted_at").is_null()]))
        };

        select
            .order_by([("created_at", direction)])
            .limit(query.limit)
            .offset(query.offset)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Friendship Operations ───────────────────────────────────

    async fn get_friendship_between(&self, a: u64, b: u64) -> Result<Option<Friendship>, AppError> {
        self.get_by_id(collections::FRIENDSHIPS, &Friendship::pair_id(a, b))
            .await
    }

    async fn upsert_friendship(&self, friendship: &Friendship) -> Result<(), AppError> {
        self.put(collections::FRIENDSHIPS, &friendship.doc_id(), friendship)
            .await
    }

    async fn friendships_for_user(&self, user_id: u64) -> Result<Vec<Friendship>, AppError> {
        let by_field = |field: &'static str| async move {
            self.get_client()?
                .fluent()
                .select()
                .from(collections::FRIENDSHIPS)
                .filter(move |q| q.for_all([q.field(field).eq(user_id)]))
                .obj::<Friendship>()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string()))
        };

        let (mut sent, received) = tokio::try_join!(by_field("sender_id"), by_field("recipient_id"))?;
        sent.extend(received);
        Ok(sent)
    }

    // ─── Follow Operations ───────────────────────────────────────

    async fn upsert_follow(&self, follow: &Follow) -> Result<(), AppError> {
        self.put(
            collections::FOLLOWS,
            &Follow::doc_id(follow.follower_id, follow.followee_id),
            follow,
        )
        .await
    }

    async fn delete_follow(&self, follower_id: u64, followee_id: u64) -> Result<bool, AppError> {
        let doc_id = Follow::doc_id(follower_id, followee_id);
        let existing: Option<Follow> = self.get_by_id(collections::FOLLOWS, &doc_id).await?;
        if existing.is_none() {
            return Ok(false);
        }

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::FOLLOWS)
            .document_id(&doc_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(true)
    }

    async fn followers_of(&self, user_id: u64) -> Result<Vec<Follow>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FOLLOWS)
            .filter(move |q| q.for_all([q.field("followee_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn followed_by(&self, user_id: u64) -> Result<Vec<Follow>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::FOLLOWS)
            .filter(move |q| q.for_all([q.field("follower_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
