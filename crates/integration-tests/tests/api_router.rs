//! Router tests that finish before any database query.
//!
//! The pool points at a closed port, so these also show which paths reject
//! early: missing or wrong-kind tokens, malformed input, bad pagination.

use axum::http::{StatusCode, header};
use serde_json::json;

use menuhub_core::AccountKind;
use menuhub_integration_tests::TestApp;

fn user_token(app: &TestApp, username: &str) -> String {
    app.state
        .tokens()
        .issue(username, AccountKind::User)
        .expect("Failed to issue token")
}

fn shop_token(app: &TestApp, username: &str) -> String {
    app.state
        .tokens()
        .issue(username, AccountKind::ShopUser)
        .expect("Failed to issue token")
}

// =============================================================================
// Banner & Health
// =============================================================================

#[tokio::test]
async fn test_root_banner() {
    let app = TestApp::without_database();
    let response = app.get("/", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "MenuHub API is running");
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_health_reports_unreachable_database() {
    let app = TestApp::without_database();
    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["status"], "unhealthy");
    assert_eq!(response.body["database"], "disconnected");
}

#[tokio::test]
async fn test_trailing_slash_is_ignored() {
    let app = TestApp::without_database();
    let response = app.get("/health/", None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized_with_challenge() {
    let app = TestApp::without_database();
    let response = app.get("/auth/me", None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "Not authenticated");
    assert_eq!(
        response
            .headers
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = TestApp::without_database();
    let response = app.get("/auth/me", Some("not.a.jwt")).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.detail(), "Could not validate credentials");
}

#[tokio::test]
async fn test_user_token_rejected_on_shop_routes() {
    let app = TestApp::without_database();
    let token = user_token(&app, "alice");

    let response = app.get("/auth/shop/me", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .post("/notifications/broadcast", json!({"contents": "hi"}), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_shop_token_rejected_on_user_routes() {
    let app = TestApp::without_database();
    let token = shop_token(&app, "sushi_taro");

    let response = app.get("/auth/me", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get("/favorites/users/1", Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_writes_require_token() {
    let app = TestApp::without_database();

    let cases = [
        ("/menus", json!({"name": "Ramen", "price": 900})),
        ("/areas", json!({"name": "Shibuya"})),
        ("/genres", json!({"name": "Ramen"})),
        ("/notifications", json!({"user_id": 1, "contents": "hi"})),
        ("/menu_favorites", json!({"user_id": 1, "menu_id": 1})),
    ];
    for (uri, body) in cases {
        let response = app.post(uri, body, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "POST {uri}");
    }

    let response = app.delete("/upload/image/abc.png", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_routes_share_one_rate_limit() {
    let app = TestApp::without_database();
    let body = json!({"username": "alice", "email": "not-an-email", "password": "correct horse"});

    let mut statuses = Vec::new();
    for uri in [
        "/users",
        "/auth/register",
        "/users",
        "/auth/register",
        "/users",
        "/users",
        "/auth/register",
    ] {
        statuses.push(app.post_from("192.0.2.44", uri, body.clone()).await.status);
    }

    // Burst of five, then the alias and the canonical path are both throttled
    assert!(
        statuses.iter().take(5).all(|s| *s == StatusCode::BAD_REQUEST),
        "{statuses:?}"
    );
    assert!(
        statuses.iter().skip(5).all(|s| *s == StatusCode::TOO_MANY_REQUESTS),
        "{statuses:?}"
    );
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_register_rejects_malformed_email() {
    let app = TestApp::without_database();
    let response = app
        .post(
            "/auth/register",
            json!({"username": "alice", "email": "not-an-email", "password": "correct horse"}),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.detail().is_empty());
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
    let app = TestApp::without_database();
    let response = app
        .post("/auth/register", json!({"username": "alice"}), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_menu_pagination_bounds() {
    let app = TestApp::without_database();

    for query in ["per_page=0", "per_page=101", "page=0", "page=abc"] {
        let response = app.get(&format!("/menus?{query}"), None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{query}");
    }

    let response = app.get("/shops?per_page=0", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_path_id_is_bad_request() {
    let app = TestApp::without_database();
    let response = app.get("/menus/abc", None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.detail().is_empty());
}

#[tokio::test]
async fn test_notification_link_window_bounds() {
    let app = TestApp::without_database();
    let response = app.get("/notification-shop?limit=0", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/notification-users?skip=-1", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::without_database();
    let response = app.get("/does-not-exist", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
