use crate::{AppState, audit, gates, handlers};
use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    routing::{delete, get, patch},
};

/// Admin Router Module
///
/// User-management surface, nested under `/admin`. The authentication gate
/// is layered on in `create_router`; the role gates are layered here so the
/// composition order is always authenticate -> role gate -> audit wrapper ->
/// handler.
///
/// Role mutation additionally passes the escalation guard inside the
/// handler, since it needs both the target id and the requested role from
/// the payload.
pub fn admin_routes() -> Router<AppState> {
    // Admin-or-above: account review and role management.
    let management = Router::new()
        // GET /admin/users
        // The full account list, including pending and rejected ones.
        .route("/users", get(handlers::list_users))
        // PATCH /admin/users/{id}/role
        // Role mutation, escalation-guarded, audited as user.role.update.
        .merge(
            Router::new()
                .route("/users/{id}/role", patch(handlers::update_user_role))
                .route_layer(middleware::from_fn(|request: Request, next: Next| {
                    audit::record("user.role.update", request, next)
                })),
        )
        // PATCH /admin/users/{id}/status
        // Approve or reject an account, audited as user.status.update.
        .merge(
            Router::new()
                .route("/users/{id}/status", patch(handlers::update_user_status))
                .route_layer(middleware::from_fn(|request: Request, next: Next| {
                    audit::record("user.status.update", request, next)
                })),
        )
        .route_layer(middleware::from_fn(gates::require_admin));

    // Owner-only: destructive account removal.
    let owner_only = Router::new()
        // DELETE /admin/users/{id}
        // Account deletion, audited as user.delete.
        .route("/users/{id}", delete(handlers::delete_user))
        .route_layer(middleware::from_fn(|request: Request, next: Next| {
            audit::record("user.delete", request, next)
        }))
        .route_layer(middleware::from_fn(gates::require_owner));

    management.merge(owner_only)
}
