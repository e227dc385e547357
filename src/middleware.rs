//! HTTP 中间件与应用状态
//! 请求追踪（trace_id / request_id / 指标）

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{
        credentials::{CredentialStore, InMemoryCredentialStore},
        jwt::TokenService,
        middleware::AuthenticationGate,
        password::PasswordHasher,
        policy::AccessPolicy,
    },
    clock::Clock,
    config::AppConfig,
    error::AppError,
    repository::{movie_repo::MovieRepository, sequence::SequenceGenerator},
    services::{AuthService, MovieService},
};

/// 应用状态
///
/// 所有服务启动后只读，通过 Arc 在请求间共享
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub token_service: Arc<TokenService>,
    pub credential_store: Arc<dyn CredentialStore>,
    pub gate: Arc<AuthenticationGate>,
    pub access_policy: Arc<AccessPolicy>,
    pub auth_service: Arc<AuthService>,
    pub movie_service: Arc<MovieService>,
}

impl AppState {
    /// 根据配置构建全部服务
    ///
    /// `hasher` 用于哈希种子用户密码，其参数决定启动耗时
    pub fn build(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        hasher: PasswordHasher,
    ) -> Result<Self, AppError> {
        let token_service = Arc::new(TokenService::from_config(&config, clock)?);

        let credential_store: Arc<dyn CredentialStore> = Arc::new(
            InMemoryCredentialStore::from_seeds(&config.security.users, &hasher)?,
        );

        let gate = Arc::new(AuthenticationGate::new(
            token_service.clone(),
            credential_store.clone(),
        ));

        let auth_service = Arc::new(AuthService::new(
            credential_store.clone(),
            token_service.clone(),
            hasher,
        ));

        let movie_repo = Arc::new(MovieRepository::new(Arc::new(SequenceGenerator::new())));
        let movie_service = Arc::new(MovieService::new(movie_repo));

        Ok(Self {
            config,
            token_service,
            credential_store,
            gate,
            access_policy: Arc::new(AccessPolicy::movie_catalog()),
            auth_service,
            movie_service,
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    // 生成或提取 trace_id/request_id
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let uri = req.uri().to_string();

    // 创建 span
    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        // 继续处理请求
        let mut response = next.run(req).await;

        let elapsed = start.elapsed();

        // 记录指标 - 使用静态字符串
        let status = response.status().as_u16();
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "OPTIONS" => "OPTIONS",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            400 => "400",
            401 => "401",
            403 => "403",
            404 => "404",
            422 => "422",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        // 记录日志
        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        // 在响应头中添加 trace_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_generate_trace_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        let trace_id = extract_or_generate_trace_id(&headers);
        assert_eq!(trace_id, "test-trace-123");

        let headers = HeaderMap::new();
        let trace_id = extract_or_generate_trace_id(&headers);
        assert!(!trace_id.is_empty());
        assert_ne!(trace_id, "test-trace-123");
    }
}
