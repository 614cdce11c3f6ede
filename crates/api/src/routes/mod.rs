//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                    - Banner
//! GET  /health                              - Database connectivity check
//!
//! # Auth (login/registration rate limited)
//! POST /auth/register                       - Register a user
//! POST /auth/shop/register                  - Register a shop user
//! POST /auth/login                          - User login (email)
//! POST /auth/shop/login                     - Shop user login (username)
//! GET  /auth/me                             - Current user
//! PUT  /auth/me                             - Update current user
//! GET  /auth/shop/me                        - Current shop user
//! GET  /auth/check-username/{username}      - Username availability
//! GET  /auth/check-email/{email}            - Email availability
//!
//! # Users
//! GET|PUT|DELETE /users/{user_id}           - Profile (writes: self only)
//! POST /users                               - Register (same as /auth/register, same limit)
//!
//! # Catalog
//! GET|POST /shops, GET|PUT|DELETE /shops/{shop_id}
//! GET|POST /areas, GET|PUT|DELETE /areas/{area_id}, GET /areas/{area_id}/menus
//! GET|POST /genres, GET /genres/{genre_id}, GET /genres/{genre_id}/menus
//! GET|POST /menus, GET|PUT|DELETE /menus/{menu_id}, GET /menu/{menu_id}
//!
//! # Favorites (user token, self only)
//! GET  /favorites/users/{user_id}                          - Favorite rows
//! GET  /favorites/users/{user_id}/shops                    - Favorited shops
//! POST|DELETE /favorites/users/{user_id}/shops/{shop_id}   - Add / remove
//! GET  /favorites/users/{user_id}/shops/{shop_id}/status   - `{is_favorite}`
//! POST /menu_favorites, DELETE /menu_favorites?user_id&menu_id
//! GET  /menu_favorites/user/{user_id}, GET /menu_favorites/check?user_id&menu_id
//!
//! # Notifications
//! POST /notifications                       - Create (shop user)
//! POST /notifications/broadcast             - Notify shop followers (shop user)
//! GET  /notifications/user/{user_id}        - Inbox (self)
//! GET  /notifications/user/{user_id}/unread-count
//! PUT  /notifications/user/{user_id}/read-all
//! GET|DELETE /notifications/{notification_id}
//! PUT  /notifications/read/{notification_id}
//! GET|POST /notification-shop, GET /notification-shop/{id}
//! GET|POST /notification-users, GET /notification-users/{id}
//!
//! # Upload (any token)
//! POST /upload/image, DELETE /upload/image/{filename}
//! ```

pub mod areas;
pub mod auth;
pub mod favorites;
pub mod genres;
pub mod menu_favorites;
pub mod menus;
pub mod notification_links;
pub mod notifications;
pub mod root;
pub mod shops;
pub mod upload;
pub mod users;

use axum::{Router, routing::get};
use serde::Serialize;

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Body returned by delete and remove endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    // One bucket per client across every login and registration route
    let limiter = auth_rate_limiter();

    Router::new()
        .merge(root::router())
        .nest("/auth", auth::router(limiter.clone()))
        .nest("/users", users::router(limiter))
        .nest("/shops", shops::router())
        .nest("/areas", areas::router())
        .nest("/genres", genres::router())
        .nest("/menus", menus::router())
        .route("/menu/{menu_id}", get(menus::show))
        .nest("/favorites", favorites::router())
        .nest("/menu_favorites", menu_favorites::router())
        .nest("/notifications", notifications::router())
        .nest("/notification-shop", notification_links::shop_router())
        .nest("/notification-users", notification_links::user_router())
        .nest("/upload", upload::router())
}
