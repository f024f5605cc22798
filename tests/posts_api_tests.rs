// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post endpoint tests.
//!
//! These tests verify that:
//! 1. Pagination parameters are validated and overflow is prevented
//! 2. Listings are newest first and skip soft-deleted posts
//! 3. Only authors can delete their posts

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::{json, Value};
use stride_circle::db::Store;
use stride_circle::models::Post;
use uuid::Uuid;

mod common;
use common::{authed_request, create_test_jwt, parse_time, send_json};

async fn seed_posts(db: &impl Store, count: i64) -> Vec<Post> {
    let base = parse_time("2024-05-01T08:00:00Z");
    let mut posts = Vec::new();
    for i in 0..count {
        let post = Post {
            id: Uuid::now_v7(),
            title: format!("Post {}", i),
            description: None,
            thumbnail: None,
            status: "published".to_string(),
            post_slug: format!("post-{}", i),
            created_by: 1,
            created_at: base + Duration::hours(i),
            deleted_at: None,
        };
        db.save_post(&post).await.unwrap();
        posts.push(post);
    }
    posts
}

fn titles(body: &Value) -> Vec<String> {
    body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_pagination_underflow() {
    let (app, state) = common::create_test_app();
    let token = create_test_jwt(12345, &state.config.jwt_signing_key);

    // page=0 would underflow (0-1) when computing the offset
    let (status, _) = send_json(
        app,
        authed_request("GET", "/api/posts?page=0&per_page=10", &token, None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pagination_overflow() {
    let (app, state) = common::create_test_app();
    let token = create_test_jwt(12345, &state.config.jwt_signing_key);

    let uri = format!("/api/posts?page={}&per_page=100", u32::MAX);
    let (status, _) = send_json(app, authed_request("GET", &uri, &token, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_posts_newest_first_with_pages() {
    let (app, state) = common::create_test_app();
    seed_posts(&state.db, 5).await;
    let token = create_test_jwt(1, &state.config.jwt_signing_key);

    let (status, body) = send_json(
        app.clone(),
        authed_request("GET", "/api/posts?page=1&per_page=2", &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Post 4", "Post 3"]);
    assert_eq!(body["per_page"], 2);

    let (_, body) = send_json(
        app,
        authed_request("GET", "/api/posts?page=3&per_page=2", &token, None),
    )
    .await;
    assert_eq!(titles(&body), vec!["Post 0"]);
}

#[tokio::test]
async fn test_list_posts_oldest_first() {
    let (app, state) = common::create_test_app();
    seed_posts(&state.db, 3).await;
    let token = create_test_jwt(1, &state.config.jwt_signing_key);

    let (_, body) = send_json(
        app,
        authed_request("GET", "/api/posts?oldest_first=true", &token, None),
    )
    .await;

    assert_eq!(titles(&body), vec!["Post 0", "Post 1", "Post 2"]);
}

#[tokio::test]
async fn test_per_page_is_capped() {
    let (app, state) = common::create_test_app();
    let token = create_test_jwt(1, &state.config.jwt_signing_key);

    let (status, body) = send_json(
        app,
        authed_request("GET", "/api/posts?per_page=5000", &token, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["per_page"], 100);
}

#[tokio::test]
async fn test_post_response_hides_author() {
    let (app, state) = common::create_test_app();
    seed_posts(&state.db, 1).await;
    let token = create_test_jwt(1, &state.config.jwt_signing_key);

    let (_, body) = send_json(app, authed_request("GET", "/api/posts", &token, None)).await;

    let post = body["posts"][0].as_object().unwrap();
    assert!(!post.contains_key("created_by"));
    assert_eq!(post["created_at"], "2024-05-01T08:00:00Z");
}

#[tokio::test]
async fn test_create_post() {
    let (app, state) = common::create_test_app();
    let token = create_test_jwt(1, &state.config.jwt_signing_key);

    let (status, body) = send_json(
        app,
        authed_request(
            "POST",
            "/api/posts",
            &token,
            Some(json!({"title": "Morning run", "post_slug": "morning-run"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Morning run");
    assert_eq!(body["status"], "published");
    assert!(body["id"].as_str().unwrap().parse::<Uuid>().is_ok());
}

#[tokio::test]
async fn test_create_post_validation() {
    let (app, state) = common::create_test_app();
    let token = create_test_jwt(1, &state.config.jwt_signing_key);

    for body in [
        json!({"title": "", "post_slug": "empty-title"}),
        json!({"title": "Slug", "post_slug": "Has Spaces"}),
        json!({"title": "Thumb", "post_slug": "thumb", "thumbnail": "not a url"}),
    ] {
        let (status, response) = send_json(
            app.clone(),
            authed_request("POST", "/api/posts", &token, Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(response["error"], "bad_request");
    }
}

#[tokio::test]
async fn test_delete_post_soft_deletes() {
    let (app, state) = common::create_test_app();
    let posts = seed_posts(&state.db, 2).await;
    let author = create_test_jwt(1, &state.config.jwt_signing_key);
    let other = create_test_jwt(2, &state.config.jwt_signing_key);
    let uri = format!("/api/posts/{}", posts[1].id);

    let (status, body) =
        send_json(app.clone(), authed_request("DELETE", &uri, &other, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = send_json(app.clone(), authed_request("DELETE", &uri, &author, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) =
        send_json(app.clone(), authed_request("GET", "/api/posts", &author, None)).await;
    assert_eq!(titles(&body), vec!["Post 0"]);

    let (status, _) = send_json(app, authed_request("DELETE", &uri, &author, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The row is kept, only marked deleted
    let stored = state.db.get_post(posts[1].id).await.unwrap().unwrap();
    assert!(stored.is_deleted());
}

#[tokio::test]
async fn test_delete_post_bad_id() {
    let (app, state) = common::create_test_app();
    let token = create_test_jwt(1, &state.config.jwt_signing_key);

    let (status, _) = send_json(
        app,
        authed_request("DELETE", "/api/posts/not-a-uuid", &token, None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
