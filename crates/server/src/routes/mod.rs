//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /              - API banner
//! GET  /health        - Liveness check
//! POST /              - Profile picture upload (multipart `profileImage`)
//! POST /auth/login    - Login placeholder, echoes the request Origin
//! POST /create-admin  - Validate and build an admin account (multipart)
//! POST /create-super  - Validate and build a super admin account (JSON)
//! ```
//!
//! Handlers keep no state between requests; nothing is persisted.

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod accounts;
pub mod auth;
pub mod health;
pub mod upload;

/// Build the router with all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root).post(upload::profile_picture))
        .route("/health", get(health::health))
        .route("/auth/login", post(auth::login))
        .route("/create-admin", post(accounts::create_admin))
        .route("/create-super", post(accounts::create_super))
}
