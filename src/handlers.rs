use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    errors::ApiError,
    gates::{self, RequestContext},
    models::{
        CreateWishlistRequest, UpdateRoleRequest, UpdateStatusRequest, UserProfile, Wishlist,
    },
};

// --- Profile ---

/// get_me
///
/// [Authenticated Route] Returns the caller's profile snapshot straight from
/// the request context; no extra lookup, the authentication gate already
/// loaded it this request.
pub async fn get_me(ctx: RequestContext) -> Json<UserProfile> {
    Json(UserProfile {
        id: ctx.user_id,
        email: ctx.email,
        role: ctx.role,
        status: ctx.status,
        first_name: ctx.first_name,
        last_name: ctx.last_name,
    })
}

// --- Wishlists ---

/// get_wishlists
///
/// [Authenticated Route] Lists the caller's own wishlists. Scoped by the
/// context's user id, so no ownership gate is needed here.
pub async fn get_wishlists(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> Result<Json<Vec<Wishlist>>, ApiError> {
    let lists = state.repo.wishlists_for(&ctx.user_id).await.map_err(|e| {
        tracing::error!("failed to list wishlists: {e}");
        ApiError::Unexpected("Failed to load wishlists")
    })?;
    Ok(Json(lists))
}

/// create_wishlist
///
/// [Authenticated Route] Creates a wishlist owned by the caller.
pub async fn create_wishlist(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CreateWishlistRequest>,
) -> Result<(StatusCode, Json<Wishlist>), ApiError> {
    let wishlist = state
        .repo
        .create_wishlist(&ctx.user_id, payload.title)
        .await
        .map_err(|e| {
            tracing::error!("failed to create wishlist: {e}");
            ApiError::Unexpected("Failed to create wishlist")
        })?;
    Ok((StatusCode::CREATED, Json(wishlist)))
}

/// get_wishlist
///
/// [Authenticated Route] Retrieves one wishlist. The ownership gate runs
/// first with the repository's owner lookup injected as the resolver:
/// admins and owners bypass it, plain users must own the wishlist.
pub async fn get_wishlist(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Wishlist>, ApiError> {
    gates::require_ownership(&ctx, || state.repo.wishlist_owner(&id)).await?;

    let wishlist = state.repo.get_wishlist(&id).await.map_err(|e| {
        tracing::error!("failed to load wishlist: {e}");
        ApiError::Unexpected("Failed to load wishlist")
    })?;
    wishlist.map(Json).ok_or(ApiError::NotFound("Wishlist not found"))
}

/// delete_wishlist
///
/// [Authenticated Route] Deletes a wishlist after the ownership gate passes.
/// Successful deletions are audited (`wishlist.delete`) by the route's
/// audit wrapper.
pub async fn delete_wishlist(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    gates::require_ownership(&ctx, || state.repo.wishlist_owner(&id)).await?;

    let deleted = state.repo.delete_wishlist(&id).await.map_err(|e| {
        tracing::error!("failed to delete wishlist: {e}");
        ApiError::Unexpected("Failed to delete wishlist")
    })?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Wishlist not found"))
    }
}

// --- User Management (admin surface) ---

/// list_users
///
/// [Admin Route] Lists every account, including pending and rejected ones,
/// for the administrative review queue.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let users = state.repo.list_users().await.map_err(|e| {
        tracing::error!("failed to list users: {e}");
        ApiError::Unexpected("Failed to load users")
    })?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// update_user_role
///
/// [Admin Route] Changes another user's role. The escalation guard runs
/// before any mutation: self-changes, owner-minting by non-owners, and
/// same-or-higher-rank grants are all rejected. Successful changes are
/// audited (`user.role.update`).
pub async fn update_user_role(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    gates::check_role_change(&ctx, &id, payload.role)?;

    let updated = state.repo.set_user_role(&id, payload.role).await.map_err(|e| {
        tracing::error!("failed to update role: {e}");
        ApiError::Unexpected("Failed to update role")
    })?;
    updated
        .map(|user| Json(UserProfile::from(user)))
        .ok_or(ApiError::NotFound("User not found"))
}

/// update_user_status
///
/// [Admin Route] Approves or rejects an account. Audited
/// (`user.status.update`).
pub async fn update_user_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let updated = state
        .repo
        .set_user_status(&id, payload.status)
        .await
        .map_err(|e| {
            tracing::error!("failed to update status: {e}");
            ApiError::Unexpected("Failed to update status")
        })?;
    updated
        .map(|user| Json(UserProfile::from(user)))
        .ok_or(ApiError::NotFound("User not found"))
}

/// delete_user
///
/// [Owner-Only Route] Removes an account entirely. Gated by the owner-only
/// role check at the router layer and audited (`user.delete`).
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.repo.delete_user(&id).await.map_err(|e| {
        tracing::error!("failed to delete user: {e}");
        ApiError::Unexpected("Failed to delete user")
    })?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("User not found"))
    }
}
