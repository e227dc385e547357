//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use movie_catalog::{
    auth::PasswordHasher,
    clock::ManualClock,
    config::{AppConfig, LoggingConfig, SecurityConfig, ServerConfig, UserSeed},
    middleware::AppState,
    models::auth::Role,
    routes,
};
use secrecy::Secret;
use std::sync::Arc;

pub const ADMIN: (&str, &str) = ("javainuse", "123456789");
pub const USER: (&str, &str) = ("testuser", "12345678");
pub const DISABLED: (&str, &str) = ("retired", "retired-pass");
pub const ALICE: (&str, &str) = ("alice", "wonderland");

fn seed(username: &str, password: &str, roles: Vec<Role>, enabled: bool) -> UserSeed {
    UserSeed {
        username: username.to_string(),
        password: Secret::new(password.to_string()),
        roles,
        enabled,
    }
}

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(
                "test-secret-key-for-testing-only-it-is-long-enough-for-hs512-signing".to_string(),
            ),
            token_ttl_secs: 3600,
            cors_allowed_origins: Vec::new(),
            users: vec![
                seed(ADMIN.0, ADMIN.1, vec![Role::Admin, Role::User], true),
                seed(USER.0, USER.1, vec![Role::User], true),
                seed(DISABLED.0, DISABLED.1, vec![Role::User], false),
                seed(ALICE.0, ALICE.1, vec![Role::Admin], true),
            ],
            dev_users: false,
        },
    }
}

/// 测试应用：路由 + 可控时钟
pub struct TestApp {
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    /// 直接签发令牌，不经过 /authenticate
    pub fn token_for(&self, username: &str) -> String {
        self.state.token_service.issue(username).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.router().oneshot(request).await.unwrap()
    }
}

/// 创建测试应用状态
pub fn create_test_app() -> TestApp {
    create_test_app_with_config(create_test_config())
}

pub fn create_test_app_with_config(config: AppConfig) -> TestApp {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    // 低成本参数，测试中快速哈希
    let hasher = PasswordHasher::with_params(1024, 1, 1).unwrap();
    let state = AppState::build(config, clock.clone(), hasher).unwrap();

    TestApp {
        state: Arc::new(state),
        clock,
    }
}

/// 构造请求
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// 读取 JSON 响应体
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn movie_json(title: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "writer": "Ridley Scott",
        "genre": "Sci-Fi",
        "runtime": "117 min",
        "releaseDate": "1982-06-25",
        "rate": 8.1
    })
}
