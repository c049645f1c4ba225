use crate::AppState;
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints accessible without any authentication evidence. Everything else
/// in the application sits behind the gate pipeline.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint used for monitoring and load balancer
        // checks. Returns "ok" immediately.
        .route("/health", get(|| async { "ok" }))
}
