//! JWT 认证中间件（认证闸门）
//!
//! Every request passes through [`authentication_gate`] once. A malformed or
//! unverifiable bearer token is rejected here with 401; an expired or
//! mismatched token only downgrades the request to anonymous and leaves the
//! decision to the access policy.

use crate::{
    auth::{credentials::CredentialStore, jwt::TokenService},
    error::AppError,
    models::auth::Role,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Authorization scheme, compared case-insensitively
pub const BEARER_SCHEME: &str = "Bearer";

/// 认证主体（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.roles.iter().any(|role| roles.contains(role))
    }
}

// 实现 FromRequestParts 以便在 handler 中直接提取 Principal
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从 Authorization 头提取令牌
///
/// `None` when the header is missing, not valid UTF-8, or uses another
/// scheme. `Some("")` is possible for a bare `"Bearer "` header.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;

    if scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        Some(token.trim())
    } else {
        None
    }
}

/// Outcome of one gate pass
#[derive(Debug)]
pub enum GateDecision {
    /// Continue down the chain, attaching the principal if there is one
    Forward(Option<Principal>),
    /// Answer immediately; the handler never runs
    Reject(AppError),
}

/// 认证闸门
#[derive(Clone)]
pub struct AuthenticationGate {
    token_service: Arc<TokenService>,
    credential_store: Arc<dyn CredentialStore>,
}

impl AuthenticationGate {
    pub fn new(token_service: Arc<TokenService>, credential_store: Arc<dyn CredentialStore>) -> Self {
        Self {
            token_service,
            credential_store,
        }
    }

    pub fn intercept(&self, headers: &HeaderMap, already_authenticated: bool) -> GateDecision {
        let Some(token) = extract_token(headers) else {
            tracing::debug!("No bearer token, continuing anonymously");
            return GateDecision::Forward(None);
        };

        let subject = match self.token_service.extract_subject(token) {
            Ok(subject) => subject,
            Err(e) => {
                tracing::warn!(error = %e, "Rejecting request with bad token");
                return GateDecision::Reject(AppError::InvalidToken(e));
            }
        };

        if already_authenticated {
            return GateDecision::Forward(None);
        }

        let Some(user) = self.credential_store.load_by_username(&subject) else {
            tracing::warn!(subject = %subject, "Token subject is not a known user");
            return GateDecision::Forward(None);
        };

        if !user.enabled {
            tracing::warn!(subject = %subject, "Token subject is disabled");
            return GateDecision::Forward(None);
        }

        match self.token_service.validate(token, &user.username) {
            Ok(true) => {
                tracing::debug!(username = %user.username, "Request authenticated");
                GateDecision::Forward(Some(user.to_principal()))
            }
            Ok(false) => {
                tracing::debug!(subject = %subject, "Token expired or mismatched, continuing anonymously");
                GateDecision::Forward(None)
            }
            Err(e) => GateDecision::Reject(AppError::InvalidToken(e)),
        }
    }
}

/// 认证闸门中间件
pub async fn authentication_gate(
    State(gate): State<Arc<AuthenticationGate>>,
    mut req: Request,
    next: Next,
) -> Response {
    let already_authenticated = req.extensions().get::<Principal>().is_some();

    match gate.intercept(req.headers(), already_authenticated) {
        GateDecision::Forward(Some(principal)) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        GateDecision::Forward(None) => next.run(req).await,
        GateDecision::Reject(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::credentials::{InMemoryCredentialStore, UserDetails},
        clock::ManualClock,
    };
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &[u8] = b"gate_test_secret_key_long_enough_for_hs512_signing_purposes_ok!";

    fn gate_with_clock() -> (AuthenticationGate, Arc<TokenService>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let token_service = Arc::new(TokenService::new(SECRET, 3600, clock.clone()));
        let store = InMemoryCredentialStore::new(vec![
            UserDetails {
                username: "alice".to_string(),
                password_hash: String::new(),
                roles: vec![Role::Admin],
                enabled: true,
            },
            UserDetails {
                username: "mallory".to_string(),
                password_hash: String::new(),
                roles: vec![Role::User],
                enabled: false,
            },
        ]);
        let gate = AuthenticationGate::new(token_service.clone(), Arc::new(store));
        (gate, token_service, clock)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token)).unwrap());
        headers
    }

    #[test]
    fn test_extract_token_valid() {
        let headers = bearer("test_token_123");
        assert_eq!(extract_token(&headers), Some("test_token_123"));
    }

    #[test]
    fn test_extract_token_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "bearer abc".parse().unwrap());
        assert_eq!(extract_token(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, "BEARER abc".parse().unwrap());
        assert_eq!(extract_token(&headers), Some("abc"));
    }

    #[test]
    fn test_extract_token_missing_or_other_scheme() {
        assert_eq!(extract_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(extract_token(&headers), None);

        headers.insert(AUTHORIZATION, "InvalidFormat".parse().unwrap());
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn test_no_header_forwards_anonymous() {
        let (gate, _, _) = gate_with_clock();
        assert!(matches!(gate.intercept(&HeaderMap::new(), false), GateDecision::Forward(None)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let (gate, _, _) = gate_with_clock();
        match gate.intercept(&bearer("garbage"), false) {
            GateDecision::Reject(err) => assert_eq!(err.user_message(), "Bad Token"),
            other => panic!("expected reject, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_token_attaches_principal() {
        let (gate, tokens, _) = gate_with_clock();
        let token = tokens.issue("alice").unwrap();

        match gate.intercept(&bearer(&token), false) {
            GateDecision::Forward(Some(principal)) => {
                assert_eq!(principal.username, "alice");
                assert_eq!(principal.roles, vec![Role::Admin]);
            }
            other => panic!("expected principal, got {:?}", other),
        }
    }

    #[test]
    fn test_expired_token_forwards_anonymous() {
        let (gate, tokens, clock) = gate_with_clock();
        let token = tokens.issue("alice").unwrap();

        clock.advance(Duration::seconds(3601));
        assert!(matches!(gate.intercept(&bearer(&token), false), GateDecision::Forward(None)));
    }

    #[test]
    fn test_unknown_or_disabled_subject_forwards_anonymous() {
        let (gate, tokens, _) = gate_with_clock();

        let token = tokens.issue("nobody").unwrap();
        assert!(matches!(gate.intercept(&bearer(&token), false), GateDecision::Forward(None)));

        let token = tokens.issue("mallory").unwrap();
        assert!(matches!(gate.intercept(&bearer(&token), false), GateDecision::Forward(None)));
    }

    #[test]
    fn test_already_authenticated_is_left_alone() {
        let (gate, tokens, _) = gate_with_clock();
        let token = tokens.issue("alice").unwrap();

        assert!(matches!(gate.intercept(&bearer(&token), true), GateDecision::Forward(None)));
    }

    #[test]
    fn test_principal_roles() {
        let principal = Principal {
            username: "alice".to_string(),
            roles: vec![Role::User],
        };
        assert!(principal.has_any_role(&[Role::User, Role::Admin]));
        assert!(!principal.has_any_role(&[Role::Admin]));
    }
}
