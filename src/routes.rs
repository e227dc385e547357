//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{
    auth::{access_policy_middleware, authentication_gate},
    config::SecurityConfig,
    handlers,
    middleware::{request_tracking_middleware, AppState},
};

/// 请求体上限
const MAX_BODY_BYTES: usize = 64 * 1024;

/// 创建应用路由
///
/// 中间件自外向内：请求追踪 -> 认证闸门 -> 访问策略 -> 处理器
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（允许跨域）
    let auth_routes = Router::new()
        .route("/authenticate", post(handlers::auth::authenticate))
        .layer(cors_layer(&state.config.security));

    // 电影目录
    let movie_routes = Router::new()
        .route(
            "/movies",
            get(handlers::movie::list_movies).post(handlers::movie::create_movie),
        )
        .route(
            "/movies/{id}",
            get(handlers::movie::get_movie)
                .put(handlers::movie::update_movie)
                .delete(handlers::movie::delete_movie),
        )
        .route("/movies/genre/{genre}", get(handlers::movie::list_by_genre))
        .route("/movies/rate/{rate}", get(handlers::movie::list_by_rate));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(movie_routes)
        .fallback(handlers::movie::fallback)
        .method_not_allowed_fallback(handlers::movie::method_not_allowed)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn_with_state(state.access_policy.clone(), access_policy_middleware))
        .layer(from_fn_with_state(state.gate.clone(), authentication_gate))
        .layer(from_fn(request_tracking_middleware))
        .with_state(state)
}

/// 认证端点的 CORS 配置，未配置来源时允许任意来源
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins = if security.cors_allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let list: Vec<HeaderValue> = security
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::POST])
        .allow_headers([CONTENT_TYPE])
}
