//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. CORS (allow-list answered before any handler runs)
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID (recorded into the request span)
//! 5. Body limit (uploads)

pub mod cors;
pub mod request_id;

pub use cors::cors_layer;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
