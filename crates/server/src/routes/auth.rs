//! Login placeholder.

use axum::{
    Json,
    http::{HeaderMap, header::ORIGIN},
};

use school_portal_core::wire::{Envelope, LoginEcho};

/// `POST /auth/login` - no credential check yet; echoes the caller's
/// `Origin` so clients can verify the CORS round trip.
pub async fn login(headers: HeaderMap) -> Json<Envelope<LoginEcho>> {
    let origin = headers
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    tracing::info!(origin = ?origin, "Login placeholder hit");

    Json(Envelope::ok("Login endpoint reached", LoginEcho { origin }))
}
