use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// The authorization pipeline.
pub mod audit;
pub mod errors;
pub mod evidence;
pub mod gates;

// Application services and components.
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;

// Routing segregation (Public, Authenticated, Admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use gates::RequestContext;
pub use repository::{PostgresRepository, RepositoryState};

/// AppState
///
/// The single, thread-safe, immutable container holding the services every
/// request needs: the repository behind its trait object and the loaded
/// configuration. Shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts the user and wishlist stores.
    pub repo: RepositoryState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the application's routing structure and the gate pipeline.
///
/// Gate composition per surface (outermost first):
/// - authenticated routes: authentication gate -> handler
/// - admin routes: authentication gate -> role gate -> audit wrapper -> handler
///
/// The authentication gate is applied here at the outermost route layer, so
/// every gate below it can rely on the typed `RequestContext` being present.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Public routes: no gates applied.
        .merge(public::public_routes())
        // Authenticated routes: behind the authentication gate.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                gates::require_auth,
            )),
        )
        // Admin routes: nested under '/admin'. Role gates and audit wrappers
        // are layered inside `admin_routes`; the authentication gate wraps
        // them all here.
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                gates::require_auth,
            )),
        )
        .with_state(state);

    // Observability and correlation layers (applied outermost).
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every incoming
                // request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a
                // span carrying the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the `TraceLayer` span so every log line for a single request,
/// audit entries included, is correlated by the `x-request-id` header.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
