use axum::{
    extract::{FromRequestParts, RawPathParams, Request},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{gates::RequestContext, models::Role};

/// AuditEntry
///
/// Immutable record of one successful sensitive operation, written once to
/// the audit log sink and never mutated. Field names are part of the audit
/// contract.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub operation: String,
    pub actor_id: String,
    pub actor_role: Role,
    /// ISO-8601 timestamp of emission.
    pub timestamp: String,
    pub method: String,
    pub path: String,
    /// Route parameters of the matched route (e.g. the target user id).
    pub params: BTreeMap<String, String>,
    pub ip: String,
    pub user_agent: String,
}

/// RequestInfo
///
/// The request-side fields an audit entry needs, snapshotted before the
/// inner handler consumes the request.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    pub params: BTreeMap<String, String>,
    pub ip: String,
    pub user_agent: String,
}

/// Builds the entry for a completed operation. Pure; emission is separate so
/// a sink problem can never corrupt the record of what happened.
pub fn build_entry(operation: &str, ctx: &RequestContext, info: &RequestInfo) -> AuditEntry {
    AuditEntry {
        operation: operation.to_string(),
        actor_id: ctx.user_id.clone(),
        actor_role: ctx.role,
        timestamp: Utc::now().to_rfc3339(),
        method: info.method.clone(),
        path: info.path.clone(),
        params: info.params.clone(),
        ip: info.ip.clone(),
        user_agent: info.user_agent.clone(),
    }
}

/// Only successful operations are audited; every 4xx/5xx outcome is already
/// visible in the request trace.
pub fn records(status: StatusCode) -> bool {
    status.as_u16() < 400
}

/// record
///
/// Response-interceptor form of the audit recorder. Wraps a route so that,
/// once the inner handler has produced a success response and an
/// authenticated context is present, the entry is emitted before the
/// response is returned. The response itself is forwarded untouched, and an
/// emission problem never fails the request.
///
/// Applied per route at composition time:
/// `middleware::from_fn(|req, next| audit::record("user.role.update", req, next))`.
pub async fn record(operation: &'static str, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let ctx = parts.extensions.get::<RequestContext>().cloned();
    let info = RequestInfo {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        params: match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(raw) => raw
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            Err(_) => BTreeMap::new(),
        },
        ip: caller_ip(&parts.headers),
        user_agent: parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
            .to_string(),
    };

    let response = next.run(Request::from_parts(parts, body)).await;

    if records(response.status()) {
        if let Some(ctx) = ctx {
            emit(&build_entry(operation, &ctx, &info));
        }
    }

    response
}

/// Resolves the caller address from the usual proxy headers. The service
/// runs behind a reverse proxy, so the socket address is not meaningful.
fn caller_ip(headers: &axum::http::HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Writes the entry to the audit sink: a structured tracing event under the
/// `audit` target, JSON-encoded so the production log pipeline can index it.
/// Failures are logged and swallowed; observability must never become a
/// source of request failure.
fn emit(entry: &AuditEntry) {
    match serde_json::to_string(entry) {
        Ok(json) => {
            tracing::info!(
                target: "audit",
                operation = %entry.operation,
                actor_id = %entry.actor_id,
                entry = %json,
                "sensitive operation completed"
            );
        }
        Err(e) => {
            tracing::warn!("failed to encode audit entry: {e}");
        }
    }
}
