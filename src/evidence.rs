use axum::http::{header, request::Parts};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// SessionEvidence
///
/// Session-derived authentication evidence, inserted into the request
/// extensions by the upstream session layer. The pipeline only consumes it;
/// it never creates or persists sessions.
#[derive(Debug, Clone)]
pub struct SessionEvidence {
    pub user_id: Option<String>,
    /// Explicit flag set by the session provider. Session evidence with this
    /// flag unset is treated as invalid and skipped in favor of token
    /// evidence.
    pub authenticated: bool,
}

/// Claims
///
/// Bearer-token payload. Both identifier fields are optional: the subject is
/// preferred, with `uid` as the alternate identifier some token issuers use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// TokenEvidence
///
/// Claim-based evidence produced by decoding a valid bearer token. A token
/// that fails decoding or validation yields no evidence at all, never an
/// error.
#[derive(Debug, Clone)]
pub struct TokenEvidence {
    pub claims: Claims,
}

/// EvidenceSet
///
/// The per-request collection of authentication evidence: at most one session
/// item and one token item. Precedence is explicit and fixed: session
/// evidence is consulted first, token evidence only when session evidence is
/// absent or not authenticated.
#[derive(Debug, Clone, Default)]
pub struct EvidenceSet {
    pub session: Option<SessionEvidence>,
    pub token: Option<TokenEvidence>,
}

impl EvidenceSet {
    /// Gathers all evidence attached to a request. Session evidence comes
    /// from the request extensions; token evidence from the `Authorization`
    /// header, validated against the configured secret. Any failure while
    /// inspecting evidence collapses to "no evidence of that kind".
    pub fn from_parts(parts: &Parts, config: &AppConfig) -> Self {
        let session = parts.extensions.get::<SessionEvidence>().cloned();

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .and_then(|token| {
                let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
                let mut validation = Validation::default();
                validation.validate_exp = true;

                match decode::<Claims>(token, &decoding_key, &validation) {
                    Ok(data) => Some(TokenEvidence { claims: data.claims }),
                    Err(e) => {
                        // An unusable token is "no token", not a request error.
                        tracing::debug!("bearer token rejected: {:?}", e.kind());
                        None
                    }
                }
            });

        Self { session, token }
    }

    /// Resolves the caller's user identifier, or `None` for "no identity".
    ///
    /// 1. Session evidence present with its authenticated flag set: the
    ///    session's identifier wins, even if a conflicting token is also
    ///    attached.
    /// 2. Otherwise, a decoded token supplies the identifier from its subject
    ///    claim, falling back to the alternate `uid` claim.
    /// 3. Otherwise there is no identity.
    pub fn user_id(&self) -> Option<String> {
        if let Some(session) = &self.session {
            if session.authenticated {
                return session.user_id.clone();
            }
        }

        self.token
            .as_ref()
            .and_then(|token| token.claims.sub.clone().or_else(|| token.claims.uid.clone()))
    }

    /// True exactly when authenticated session evidence exists, or token
    /// evidence both validated and resolved an identifier.
    pub fn is_authenticated(&self) -> bool {
        if let Some(session) = &self.session {
            if session.authenticated {
                return true;
            }
        }

        self.token
            .as_ref()
            .is_some_and(|token| token.claims.sub.is_some() || token.claims.uid.is_some())
    }
}
