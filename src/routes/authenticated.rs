use crate::{AppState, audit, handlers};
use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    routing::{delete, get},
};

/// Authenticated Router Module
///
/// Routes accessible to any approved user who passed the authentication
/// gate. The gate itself is layered on in `create_router`; every handler
/// here receives the typed `RequestContext` the gate attached.
///
/// Ownership strategy: wishlist detail routes run the ownership gate inside
/// the handler with the repository's owner lookup injected as the resolver,
/// so privileged roles bypass it and plain users only reach their own data.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /me
        // The caller's profile snapshot, straight from the request context.
        .route("/me", get(handlers::get_me))
        // GET /wishlists + POST /wishlists
        // List the caller's own wishlists / create a new one owned by the
        // caller.
        .route(
            "/wishlists",
            get(handlers::get_wishlists).post(handlers::create_wishlist),
        )
        // GET /wishlists/{id}
        // Single wishlist, behind the ownership gate.
        .route("/wishlists/{id}", get(handlers::get_wishlist))
        // DELETE /wishlists/{id}
        // Ownership-gated delete. This is a sensitive operation: successful
        // deletions are recorded by the audit wrapper before the response
        // goes out.
        .merge(
            Router::new()
                .route("/wishlists/{id}", delete(handlers::delete_wishlist))
                .route_layer(middleware::from_fn(|request: Request, next: Next| {
                    audit::record("wishlist.delete", request, next)
                })),
        )
}
