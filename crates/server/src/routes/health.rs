//! Health endpoints.

use axum::Json;

use school_portal_core::wire::Envelope;

/// `GET /` - API banner.
pub async fn root() -> Json<Envelope<()>> {
    Json(Envelope::message("School Portal API is running"))
}

/// `GET /health` - liveness check.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}
