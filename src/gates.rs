use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::future::Future;

use crate::{
    AppState,
    errors::AccessError,
    evidence::EvidenceSet,
    models::{AccountStatus, Role, User},
    repository::{RepoError, RepositoryState},
};

/// RequestContext
///
/// The authenticated, approved caller's profile snapshot, constructed exactly
/// once per request by the authentication gate and carried in the request
/// extensions for the remainder of handling. It is read-only, owned by its
/// request, and discarded when the request completes.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<User> for RequestContext {
    fn from(user: User) -> Self {
        RequestContext {
            user_id: user.id,
            email: user.email,
            role: user.role,
            status: user.status,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// RequestContext Extractor
///
/// Lets any handler receive the context as a typed argument. The context is
/// only ever present after `require_auth` has run; its absence means the
/// route was composed without the authentication gate, which is answered
/// with a 401 rather than a crash.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or(AccessError::Unauthenticated("Authentication required"))
    }
}

// --- Authentication Gate ---

/// authenticate
///
/// Core of the authentication gate. Resolves the caller's identity from the
/// gathered evidence, reloads the user profile, and verifies account
/// eligibility. Short-circuits on the first failure:
///
/// - no resolvable identity        -> 401 Authentication required
/// - user record missing           -> 401 User not found
/// - lookup failure                -> 500 Authentication check failed
/// - status other than approved    -> 403 Account not approved
pub async fn authenticate(
    repo: &RepositoryState,
    evidence: &EvidenceSet,
) -> Result<RequestContext, AccessError> {
    let Some(user_id) = evidence.user_id() else {
        return Err(AccessError::Unauthenticated("Authentication required"));
    };

    let user = match repo.get_user(&user_id).await {
        Ok(user) => user,
        Err(e) => {
            // Authorization must fail closed: a failed lookup is a terminal
            // 500, never a silent bypass. Detail stays server-side.
            tracing::error!("user lookup failed during authentication: {e}");
            return Err(AccessError::Internal("Authentication check failed"));
        }
    };

    let Some(user) = user else {
        return Err(AccessError::Unauthenticated("User not found"));
    };

    if user.status != AccountStatus::Approved {
        return Err(AccessError::NotApproved);
    }

    Ok(RequestContext::from(user))
}

/// require_auth
///
/// Middleware form of the authentication gate. On success the typed
/// `RequestContext` is attached to the request extensions so that later
/// gates and the handler read the same snapshot; on failure the request
/// terminates here with the gate's typed error.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AccessError> {
    let (mut parts, body) = request.into_parts();

    let evidence = EvidenceSet::from_parts(&parts, &state.config);
    let ctx = authenticate(&state.repo, &evidence).await?;

    parts.extensions.insert(ctx);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

// --- Role Gates ---

/// Admin-or-above check: accepts admin and owner, rejects everything else
/// with the required set and the caller's actual role as diagnostics.
pub fn check_admin_role(ctx: &RequestContext) -> Result<(), AccessError> {
    match ctx.role {
        Role::Admin | Role::Owner => Ok(()),
        _ => Err(AccessError::InsufficientRole {
            message: "Admin privileges required",
            required: &["admin", "owner"],
            current: ctx.role,
        }),
    }
}

/// Owner-only check.
pub fn check_owner_role(ctx: &RequestContext) -> Result<(), AccessError> {
    match ctx.role {
        Role::Owner => Ok(()),
        _ => Err(AccessError::InsufficientRole {
            message: "Owner privileges required",
            required: &["owner"],
            current: ctx.role,
        }),
    }
}

/// require_admin
///
/// Middleware form of the admin-or-above role gate. Composed after
/// `require_auth`; a missing context is answered with 401.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AccessError> {
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .ok_or(AccessError::Unauthenticated("Authentication required"))?;
    check_admin_role(ctx)?;
    Ok(next.run(request).await)
}

/// require_owner
///
/// Middleware form of the owner-only role gate.
pub async fn require_owner(request: Request, next: Next) -> Result<Response, AccessError> {
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .ok_or(AccessError::Unauthenticated("Authentication required"))?;
    check_owner_role(ctx)?;
    Ok(next.run(request).await)
}

// --- Ownership Gate ---

/// require_ownership
///
/// Enforces that non-privileged callers only act on resources they own.
/// The gate is generic over the resource kind: it knows nothing about
/// storage, only the injected `resolve_owner` function that answers the
/// ownership question for the targeted resource.
///
/// - resolver failure                  -> 500 Permission check failed
/// - admin or owner caller             -> allowed unconditionally
/// - resolved owner == caller id       -> allowed
/// - anything else (including no owner) -> 403 Access denied
pub async fn require_ownership<F, Fut>(
    ctx: &RequestContext,
    resolve_owner: F,
) -> Result<(), AccessError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<String>, RepoError>>,
{
    let owner = match resolve_owner().await {
        Ok(owner) => owner,
        Err(e) => {
            tracing::error!("ownership resolution failed: {e}");
            return Err(AccessError::Internal("Permission check failed"));
        }
    };

    if matches!(ctx.role, Role::Admin | Role::Owner) {
        return Ok(());
    }

    match owner {
        Some(owner_id) if owner_id == ctx.user_id => Ok(()),
        // A resource with no resolvable owner is a non-match, not an error.
        _ => Err(AccessError::OwnershipDenied),
    }
}

// --- Escalation Guard ---

/// check_role_change
///
/// Validates a role-mutation request against the role hierarchy. Rules are
/// evaluated in order and the first match wins:
///
/// 1. nobody may change their own role through this path;
/// 2. only an owner may mint another owner;
/// 3. the granted rank must be strictly below the granter's rank.
///
/// The net effect: admins can only manage plain users, never their peers,
/// and self-escalation is impossible at any privilege level.
pub fn check_role_change(
    ctx: &RequestContext,
    target_user_id: &str,
    new_role: Role,
) -> Result<(), AccessError> {
    if target_user_id == ctx.user_id {
        return Err(AccessError::SelfRoleChange);
    }

    if new_role == Role::Owner && ctx.role != Role::Owner {
        return Err(AccessError::Escalation {
            message: "Only owners can assign owner privileges",
            attempted: new_role,
            user_role: ctx.role,
        });
    }

    if new_role.rank() >= ctx.role.rank() {
        return Err(AccessError::Escalation {
            message: "Cannot assign role equal to or higher than your own",
            attempted: new_role,
            user_role: ctx.role,
        });
    }

    Ok(())
}
