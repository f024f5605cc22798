// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use std::sync::Arc;
use stride_circle::config::{Config, DISTANCE_UNIT};
use stride_circle::db::{FirestoreDb, MemoryDb, Store};
use stride_circle::models::{Profile, Unit, User};
use stride_circle::routes::create_router;
use stride_circle::AppState;

/// Unit id used for the distance unit in seeded stores.
#[allow(dead_code)]
pub const DISTANCE_UNIT_ID: u64 = 1;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app backed by an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState<MemoryDb>>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: MemoryDb::new(),
    });

    (create_router(state.clone()), state)
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: u64, signing_key: &[u8]) -> String {
    stride_circle::middleware::auth::create_jwt(user_id, signing_key)
        .expect("Failed to create test JWT")
}

/// Parse a fixed RFC3339 instant.
#[allow(dead_code)]
pub fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC3339 timestamp")
        .with_timezone(&Utc)
}

/// Helper to create a basic test user
#[allow(dead_code)]
pub fn test_user(id: u64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: Some(format!("user{}@example.com", id)),
        phone: None,
        user_code: Some(format!("U{}", id)),
        height: None,
        weight: None,
        headshot: None,
        created_at: parse_time("2024-01-15T10:00:00Z"),
        deleted_at: None,
    }
}

/// Insert a user with a profile located in `city`.
#[allow(dead_code)]
pub async fn seed_user<S: Store>(db: &S, id: u64, name: &str, city: Option<&str>) {
    db.upsert_user(&test_user(id, name)).await.unwrap();
    if let Some(city) = city {
        db.upsert_profile(&Profile {
            user_id: id,
            city: Some(city.to_string()),
            country: Some("NZ".to_string()),
            ..Profile::default()
        })
        .await
        .unwrap();
    }
}

/// Register the distance unit.
#[allow(dead_code)]
pub async fn seed_distance_unit<S: Store>(db: &S) -> Unit {
    let unit = Unit {
        id: DISTANCE_UNIT_ID,
        short_name: DISTANCE_UNIT.to_string(),
        name: "Distance".to_string(),
    };
    db.upsert_unit(&unit).await.unwrap();
    unit
}

/// Send a request through the router and decode the body: `Null` when empty,
/// a JSON string when the body is plain text.
#[allow(dead_code)]
pub async fn send_json(
    app: axum::Router,
    request: axum::http::Request<axum::body::Body>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use tower::ServiceExt;

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

/// Build an authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> axum::http::Request<axum::body::Body> {
    use axum::http::header;

    let builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    }
}
