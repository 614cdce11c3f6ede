//! End-to-end flows against a real `PostgreSQL` database.
//!
//! These tests require `TEST_DATABASE_URL` pointing at a scratch database.
//! Every name is randomized, so runs can share one database.
//!
//! Run with: `cargo test -p menuhub-integration-tests -- --ignored`

use axum::http::StatusCode;
use serde_json::{Value, json};

use menuhub_api::db::AreaRepository;
use menuhub_integration_tests::{TestApp, unique};

const PASSWORD: &str = "correct horse battery";

struct Account {
    id: i64,
    username: String,
    token: String,
}

// =============================================================================
// Helpers
// =============================================================================

async fn app() -> Option<TestApp> {
    TestApp::with_database().await
}

/// Areas can only be written by shop users, so the first one is inserted
/// directly.
async fn create_area(app: &TestApp) -> i64 {
    let area = AreaRepository::new(app.state.pool())
        .create(&unique("area"))
        .await
        .expect("Failed to create area");
    i64::from(area.id.as_i32())
}

async fn create_shop(app: &TestApp, area_id: i64) -> i64 {
    let response = app
        .post(
            "/shops",
            json!({"area_id": area_id, "shop_name": unique("shop")}),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["id"].as_i64().expect("shop id")
}

async fn register_user(app: &TestApp) -> Account {
    let username = unique("user");
    let email = format!("{username}@example.com");
    let response = app
        .post(
            "/auth/register",
            json!({"username": username, "email": email, "password": PASSWORD}),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let id = response.body["id"].as_i64().expect("user id");

    let response = app
        .post("/auth/login", json!({"email": email, "password": PASSWORD}), None)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    Account {
        id,
        username,
        token: response.body["access_token"]
            .as_str()
            .expect("access token")
            .to_owned(),
    }
}

async fn register_shop_user(app: &TestApp, shop_id: i64) -> Account {
    let username = unique("owner");
    let response = app
        .post(
            "/auth/shop/register",
            json!({
                "shop_id": shop_id,
                "username": username,
                "email": format!("{username}@example.com"),
                "password": PASSWORD,
            }),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let id = response.body["id"].as_i64().expect("shop user id");

    let response = app
        .post(
            "/auth/shop/login",
            json!({"username": username, "password": PASSWORD}),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["user_type"], "shop_user");

    Account {
        id,
        username,
        token: response.body["access_token"]
            .as_str()
            .expect("access token")
            .to_owned(),
    }
}

async fn notify(app: &TestApp, owner: &Account, user_id: i64, contents: &str) -> i64 {
    let response = app
        .post(
            "/notifications",
            json!({"user_id": user_id, "contents": contents}),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.body["id"].as_i64().expect("notification id")
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_user_login_flow() {
    let Some(app) = app().await else { return };
    let user = register_user(&app).await;

    let response = app.get("/auth/me", Some(&user.token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], user.username.as_str());
    assert!(response.body.get("password_hash").is_none());

    let response = app.get("/auth/shop/me", Some(&user.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_login_failure_is_uniform() {
    let Some(app) = app().await else { return };
    let user = register_user(&app).await;

    let wrong_password = app
        .post(
            "/auth/login",
            json!({"email": format!("{}@example.com", user.username), "password": "nope nope nope"}),
            None,
        )
        .await;
    let unknown_email = app
        .post(
            "/auth/login",
            json!({"email": format!("{}@example.com", unique("ghost")), "password": PASSWORD}),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.detail(), unknown_email.detail());
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_duplicate_identities_conflict_across_kinds() {
    let Some(app) = app().await else { return };
    let user = register_user(&app).await;
    let shop_id = create_shop(&app, create_area(&app).await).await;

    let same_username = app
        .post(
            "/auth/register",
            json!({"username": user.username, "email": format!("{}@example.com", unique("x")), "password": PASSWORD}),
            None,
        )
        .await;
    assert_eq!(same_username.status, StatusCode::CONFLICT);

    let shop_same_username = app
        .post(
            "/auth/shop/register",
            json!({"shop_id": shop_id, "username": user.username, "email": format!("{}@example.com", unique("y")), "password": PASSWORD}),
            None,
        )
        .await;
    assert_eq!(shop_same_username.status, StatusCode::CONFLICT);

    let shop_same_email = app
        .post(
            "/auth/shop/register",
            json!({"shop_id": shop_id, "username": unique("z"), "email": format!("{}@example.com", user.username), "password": PASSWORD}),
            None,
        )
        .await;
    assert_eq!(shop_same_email.status, StatusCode::CONFLICT);

    let response = app
        .get(&format!("/auth/check-username/{}", user.username), None)
        .await;
    assert_eq!(response.body["available"], false);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_deleted_user_token_stops_working() {
    let Some(app) = app().await else { return };
    let user = register_user(&app).await;

    let response = app
        .delete(&format!("/users/{}", user.id), Some(&user.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.get("/auth/me", Some(&user.token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_favorite_add_twice_remove_twice() {
    let Some(app) = app().await else { return };
    let user = register_user(&app).await;
    let shop_id = create_shop(&app, create_area(&app).await).await;
    let uri = format!("/favorites/users/{}/shops/{shop_id}", user.id);

    let first = app.post(&uri, json!({}), Some(&user.token)).await;
    let second = app.post(&uri, json!({}), Some(&user.token)).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.body["created_at"], second.body["created_at"]);

    let list = app
        .get(&format!("/favorites/users/{}", user.id), Some(&user.token))
        .await;
    assert_eq!(list.body.as_array().map(Vec::len), Some(1));

    let shops = app
        .get(&format!("/favorites/users/{}/shops", user.id), Some(&user.token))
        .await;
    assert_eq!(shops.body[0]["id"], shop_id);

    assert_eq!(app.delete(&uri, Some(&user.token)).await.status, StatusCode::OK);
    assert_eq!(
        app.delete(&uri, Some(&user.token)).await.status,
        StatusCode::NOT_FOUND
    );

    let status = app.get(&format!("{uri}/status"), Some(&user.token)).await;
    assert_eq!(status.body["is_favorite"], false);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_favorites_are_private() {
    let Some(app) = app().await else { return };
    let alice = register_user(&app).await;
    let bob = register_user(&app).await;

    let response = app
        .get(&format!("/favorites/users/{}", alice.id), Some(&bob.token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Menus
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_menu_category_filter_total_ignores_page() {
    let Some(app) = app().await else { return };
    let shop_id = create_shop(&app, create_area(&app).await).await;
    let owner = register_shop_user(&app, shop_id).await;
    let category = unique("cat");

    for (name, cat) in [
        ("Shoyu", category.as_str()),
        ("Miso", category.as_str()),
        ("Shio", category.as_str()),
        ("Gyoza", "sides"),
    ] {
        let response = app
            .post(
                "/menus",
                json!({"name": name, "price": 900, "category": cat}),
                Some(&owner.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        assert_eq!(response.body["shop_id"], shop_id);
    }

    let response = app
        .get(&format!("/menus?category={category}&per_page=2"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 3);
    assert_eq!(response.body["per_page"], 2);

    let items = response.body["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|m| m["category"] == category.as_str()));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_menu_price_must_fit_the_column() {
    let Some(app) = app().await else { return };
    let shop_id = create_shop(&app, create_area(&app).await).await;
    let owner = register_shop_user(&app, shop_id).await;

    for price in [json!(0.001), json!(9.999), json!(1_000_000_000)] {
        let response = app
            .post("/menus", json!({"name": "Odd", "price": price}), Some(&owner.token))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "price {price}");
    }

    let response = app
        .post("/menus", json!({"name": "Udon", "price": 9.99}), Some(&owner.token))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["price"], 9.99);
    let menu_id = response.body["id"].as_i64().expect("menu id");

    let response = app
        .put(&format!("/menus/{menu_id}"), json!({"price": 12.345}), Some(&owner.token))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get(&format!("/menus/{menu_id}"), None).await;
    assert_eq!(response.body["price"], 9.99);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_menu_writes_are_scoped_to_own_shop() {
    let Some(app) = app().await else { return };
    let area_id = create_area(&app).await;
    let shop_a = create_shop(&app, area_id).await;
    let shop_b = create_shop(&app, area_id).await;
    let owner_a = register_shop_user(&app, shop_a).await;
    let owner_b = register_shop_user(&app, shop_b).await;

    let response = app
        .post(
            "/menus",
            json!({"shop_id": shop_b, "name": "Intruder", "price": 100}),
            Some(&owner_a.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let menu = app
        .post("/menus", json!({"name": "Tonkotsu", "price": 1100}), Some(&owner_b.token))
        .await;
    let menu_id = menu.body["id"].as_i64().expect("menu id");

    let response = app
        .put(&format!("/menus/{menu_id}"), json!({"price": 1}), Some(&owner_a.token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.get(&format!("/menu/{menu_id}"), None).await;
    assert_eq!(response.body["name"], "Tonkotsu");

    let response = app
        .put(&format!("/shops/{shop_b}"), json!({"phone": "03-0000-0000"}), Some(&owner_a.token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_area_menus_and_delete_conflict() {
    let Some(app) = app().await else { return };
    let area_id = create_area(&app).await;
    let shop_id = create_shop(&app, area_id).await;
    let owner = register_shop_user(&app, shop_id).await;

    app.post("/menus", json!({"name": "Udon", "price": 700}), Some(&owner.token))
        .await;

    let response = app.get(&format!("/areas/{area_id}/menus"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body[0]["shop_id"], shop_id);
    assert_eq!(response.body[0]["menus"][0]["name"], "Udon");

    let response = app
        .delete(&format!("/areas/{area_id}"), Some(&owner.token))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_mark_read_is_idempotent() {
    let Some(app) = app().await else { return };
    let user = register_user(&app).await;
    let owner = register_shop_user(&app, create_shop(&app, create_area(&app).await).await).await;
    let id = notify(&app, &owner, user.id, "Welcome").await;

    for _ in 0..2 {
        let response = app
            .put(&format!("/notifications/read/{id}"), json!({}), Some(&user.token))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["status"], "read");
    }
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_mark_all_read_leaves_other_users_alone() {
    let Some(app) = app().await else { return };
    let alice = register_user(&app).await;
    let bob = register_user(&app).await;
    let owner = register_shop_user(&app, create_shop(&app, create_area(&app).await).await).await;

    notify(&app, &owner, alice.id, "one").await;
    notify(&app, &owner, alice.id, "two").await;
    let bobs = notify(&app, &owner, bob.id, "three").await;

    let response = app
        .put(
            &format!("/notifications/user/{}/read-all", alice.id),
            json!({}),
            Some(&alice.token),
        )
        .await;
    assert_eq!(response.body["updated"], 2);

    let count = |account: &Account| {
        format!("/notifications/user/{}/unread-count", account.id)
    };
    let response = app.get(&count(&alice), Some(&alice.token)).await;
    assert_eq!(response.body["unread_count"], 0);
    let response = app.get(&count(&bob), Some(&bob.token)).await;
    assert_eq!(response.body["unread_count"], 1);

    let response = app
        .get(&format!("/notifications/{bobs}"), Some(&alice.token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let inbox = app
        .get(&format!("/notifications/user/{}", alice.id), Some(&alice.token))
        .await;
    let contents: Vec<&str> = inbox
        .body
        .as_array()
        .expect("inbox")
        .iter()
        .filter_map(|n| n["contents"].as_str())
        .collect();
    assert_eq!(contents, ["one", "two"]);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_new_menu_notifies_followers() {
    let Some(app) = app().await else { return };
    let shop_id = create_shop(&app, create_area(&app).await).await;
    let owner = register_shop_user(&app, shop_id).await;
    let follower = register_user(&app).await;
    let bystander = register_user(&app).await;

    app.post(
        &format!("/favorites/users/{}/shops/{shop_id}", follower.id),
        json!({}),
        Some(&follower.token),
    )
    .await;

    let response = app
        .post("/menus", json!({"name": "Katsu Curry", "price": 1200}), Some(&owner.token))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let inbox = app
        .get(&format!("/notifications/user/{}", follower.id), Some(&follower.token))
        .await;
    let notifications = inbox.body.as_array().expect("inbox");
    assert_eq!(notifications.len(), 1);
    let notification: &Value = notifications.first().expect("notification");
    assert!(
        notification["contents"]
            .as_str()
            .is_some_and(|c| c.ends_with("Katsu Curry"))
    );
    assert_eq!(notification["shop_id"], shop_id);
    assert_eq!(notification["shop_user_id"], owner.id);

    let inbox = app
        .get(&format!("/notifications/user/{}", bystander.id), Some(&bystander.token))
        .await;
    assert_eq!(inbox.body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_broadcast_reaches_each_follower_once() {
    let Some(app) = app().await else { return };
    let shop_id = create_shop(&app, create_area(&app).await).await;
    let owner = register_shop_user(&app, shop_id).await;

    let mut followers = Vec::new();
    for _ in 0..3 {
        let user = register_user(&app).await;
        app.post(
            &format!("/favorites/users/{}/shops/{shop_id}", user.id),
            json!({}),
            Some(&user.token),
        )
        .await;
        followers.push(user);
    }

    let response = app
        .post(
            "/notifications/broadcast",
            json!({"contents": "Closed tomorrow"}),
            Some(&owner.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let recipients: Vec<i64> = response
        .body
        .as_array()
        .expect("notifications")
        .iter()
        .filter_map(|n| n["user_id"].as_i64())
        .collect();
    let expected: Vec<i64> = followers.iter().map(|f| f.id).collect();
    assert_eq!(recipients, expected);
}
