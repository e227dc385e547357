//! 配置系统
//! 从环境变量（以及可选的 TOML 文件）加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::models::auth::Role;

/// 指定额外配置文件路径的环境变量（用于种子用户等列表型配置）
pub const CONFIG_FILE_ENV: &str = "MOVIES_CONFIG_FILE";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8080"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

/// 启动时写入凭据存储的用户
#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    pub username: String,
    /// 明文密码，仅在启动时哈希一次
    pub password: Secret<String>,
    pub roles: Vec<Role>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// 开发用户，仅在 `security.dev_users = true` 且未配置任何用户时启用
fn dev_users() -> Vec<UserSeed> {
    vec![
        UserSeed {
            username: "javainuse".to_string(),
            password: Secret::new("123456789".to_string()),
            roles: vec![Role::Admin, Role::User],
            enabled: true,
        },
        UserSeed {
            username: "testuser".to_string(),
            password: Secret::new("12345678".to_string()),
            roles: vec![Role::User],
            enabled: true,
        },
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 签名密钥（必填，无默认值；使用 Secret 包装，防止日志泄露）
    pub jwt_secret: Secret<String>,
    /// 令牌有效期（秒）
    pub token_ttl_secs: u64,
    /// 允许跨域访问 /authenticate 的来源，为空表示任意来源
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
    /// 种子用户（通常来自配置文件）
    #[serde(default)]
    pub users: Vec<UserSeed>,
    /// 开发模式：没有种子用户时载入内置开发用户
    #[serde(default)]
    pub dev_users: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:8080")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.token_ttl_secs", 3600)?;

        // 可选配置文件
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            settings = settings.add_source(File::with_name(&path).required(true));
        }

        // 从环境变量加载配置（前缀为 MOVIES_）
        settings = settings.add_source(
            Environment::with_prefix("MOVIES")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("security.cors_allowed_origins")
                .try_parsing(true),
        );

        let mut config: AppConfig = settings.build()?.try_deserialize()?;

        if config.security.dev_users && config.security.users.is_empty() {
            config.security.users = dev_users();
        }

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证 JWT 密钥长度（至少 32 字符）
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // 验证令牌过期时间
        if self.security.token_ttl_secs < 60 || self.security.token_ttl_secs > 86400 {
            return Err(ConfigError::Message(
                "token_ttl_secs must be between 60 and 86400 (1 minute to 24 hours)".to_string(),
            ));
        }

        // 验证种子用户
        for user in &self.security.users {
            if user.username.trim().is_empty() {
                return Err(ConfigError::Message("Seed user with empty username".to_string()));
            }
            if user.roles.is_empty() {
                return Err(ConfigError::Message(format!(
                    "Seed user '{}' must have at least one role",
                    user.username
                )));
            }
        }

        Ok(())
    }
}
