//! Role-based access rules applied after the authentication gate

use crate::{auth::middleware::Principal, error::AppError, models::auth::Role};
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// What a matched route demands of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    Authenticated,
    AnyRole(Vec<Role>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPattern {
    Exact(String),
    /// `/movies/**`: the base path and everything below it
    Subtree(String),
}

impl PathPattern {
    fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(base) => PathPattern::Subtree(base.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Subtree(base) => {
                path == base
                    || path
                        .strip_prefix(base.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

#[derive(Debug, Clone)]
struct AccessRule {
    method: Option<Method>,
    pattern: PathPattern,
    requirement: Requirement,
}

/// Ordered rule list; the first matching rule wins and unmatched requests
/// must be authenticated.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    fallback: Requirement,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: Requirement::Authenticated,
        }
    }

    /// Add a rule; `method: None` matches every method
    pub fn rule(mut self, method: Option<Method>, pattern: &str, requirement: Requirement) -> Self {
        self.rules.push(AccessRule {
            method,
            pattern: PathPattern::parse(pattern),
            requirement,
        });
        self
    }

    /// Rules of the movie catalog API
    pub fn movie_catalog() -> Self {
        Self::new()
            .rule(None, "/authenticate", Requirement::PermitAll)
            .rule(None, "/health", Requirement::PermitAll)
            .rule(None, "/ready", Requirement::PermitAll)
            .rule(
                Some(Method::GET),
                "/movies/**",
                Requirement::AnyRole(vec![Role::User, Role::Admin]),
            )
            .rule(Some(Method::POST), "/movies/**", Requirement::AnyRole(vec![Role::Admin]))
            .rule(Some(Method::PUT), "/movies/**", Requirement::AnyRole(vec![Role::Admin]))
            .rule(Some(Method::DELETE), "/movies/**", Requirement::AnyRole(vec![Role::Admin]))
    }

    pub fn requirement_for(&self, method: &Method, path: &str) -> &Requirement {
        self.rules
            .iter()
            .find(|rule| {
                rule.method.as_ref().map_or(true, |m| m == method) && rule.pattern.matches(path)
            })
            .map(|rule| &rule.requirement)
            .unwrap_or(&self.fallback)
    }

    /// 401 when a principal is required but missing, 403 when it lacks the role
    pub fn check(
        &self,
        method: &Method,
        path: &str,
        principal: Option<&Principal>,
    ) -> Result<(), AppError> {
        match (self.requirement_for(method, path), principal) {
            (Requirement::PermitAll, _) => Ok(()),
            (_, None) => Err(AppError::Unauthorized),
            (Requirement::Authenticated, Some(_)) => Ok(()),
            (Requirement::AnyRole(roles), Some(principal)) => {
                if principal.has_any_role(roles) {
                    Ok(())
                } else {
                    tracing::warn!(
                        username = %principal.username,
                        method = %method,
                        path = %path,
                        "Principal lacks required role"
                    );
                    Err(AppError::Forbidden)
                }
            }
        }
    }
}

/// 访问控制中间件
pub async fn access_policy_middleware(
    State(policy): State<Arc<AccessPolicy>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    policy.check(req.method(), req.uri().path(), req.extensions().get::<Principal>())?;

    Ok(next.run(req).await)
}
