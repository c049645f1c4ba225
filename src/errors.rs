use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::Role;

/// AccessError
///
/// The typed rejection produced by every gate in the authorization pipeline.
/// Each variant maps to a documented HTTP status and JSON body; the first gate
/// to reject terminates the request, and later gates never run.
///
/// Internal failures carry only a generic client-facing message. The detailed
/// cause is logged server-side at the point of failure and never leaks to the
/// caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccessError {
    /// 401: no resolvable identity, user record missing, or request context
    /// absent.
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// 403: valid identity, account not yet approved.
    #[error("Account not approved")]
    NotApproved,

    /// 403: caller's role is below the required minimum. Carries the required
    /// set and the caller's actual role as diagnostics for the client.
    #[error("{message}")]
    InsufficientRole {
        message: &'static str,
        required: &'static [&'static str],
        current: Role,
    },

    /// 403: caller does not own the targeted resource.
    #[error("Access denied - insufficient permissions")]
    OwnershipDenied,

    /// 403: a caller may never change their own role, regardless of
    /// privilege.
    #[error("Cannot modify your own role")]
    SelfRoleChange,

    /// 403: blocked role assignment (owner-minting by a non-owner, or a
    /// same-or-higher-rank grant).
    #[error("{message}")]
    Escalation {
        message: &'static str,
        attempted: Role,
        user_role: Role,
    },

    /// 500: unexpected infrastructure failure inside a gate. Generic message
    /// only.
    #[error("{0}")]
    Internal(&'static str),
}

impl AccessError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AccessError::NotApproved
            | AccessError::InsufficientRole { .. }
            | AccessError::OwnershipDenied
            | AccessError::SelfRoleChange
            | AccessError::Escalation { .. } => StatusCode::FORBIDDEN,
            AccessError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AccessError::InsufficientRole {
                message,
                required,
                current,
            } => json!({
                "message": message,
                "required": required,
                "current": current,
            }),
            AccessError::Escalation {
                message,
                attempted,
                user_role,
            } => json!({
                "message": message,
                "attempted": attempted,
                "userRole": user_role,
            }),
            other => json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// ApiError
///
/// Handler-level error type. Wraps the gate taxonomy and adds the plain
/// outcomes a route handler itself can produce.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Access(#[from] AccessError),

    /// 404: the targeted record does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// 500: repository failure outside the gates. Generic message only; the
    /// detail is logged where the failure happened.
    #[error("{0}")]
    Unexpected(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Access(err) => err.into_response(),
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            ApiError::Unexpected(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": message })),
            )
                .into_response(),
        }
    }
}
