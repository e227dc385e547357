//! 认证服务：校验用户名密码并签发令牌

use crate::{
    auth::{credentials::CredentialStore, jwt::TokenService, password::PasswordHasher},
    error::AppError,
    models::auth::{AuthenticateRequest, AuthenticateResponse, TOKEN_TYPE},
};
use std::sync::Arc;

pub struct AuthService {
    credential_store: Arc<dyn CredentialStore>,
    token_service: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        token_service: Arc<TokenService>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            credential_store,
            token_service,
            hasher,
        }
    }

    /// 用户认证
    pub fn authenticate(&self, req: &AuthenticateRequest) -> Result<AuthenticateResponse, AppError> {
        // 获取用户
        let user = self
            .credential_store
            .load_by_username(&req.username)
            .ok_or(AppError::InvalidCredentials)?;

        // 检查账户状态
        if !user.enabled {
            tracing::warn!(username = %user.username, "Login attempt for disabled user");
            return Err(AppError::UserDisabled);
        }

        // 验证密码
        self.hasher.verify(&req.password, &user.password_hash)?;

        // 生成令牌
        let token = self.token_service.issue(&user.username).map_err(|e| {
            tracing::error!(error = %e, "Failed to issue token");
            AppError::Internal(format!("Failed to issue token: {}", e))
        })?;
        let expires_at = self
            .token_service
            .extract_expiry(&token)
            .map_err(|e| AppError::Internal(format!("Issued token does not verify: {}", e)))?;

        tracing::info!(username = %user.username, "User authenticated");

        Ok(AuthenticateResponse {
            token_type: TOKEN_TYPE.to_string(),
            token,
            expires_in: self.token_service.ttl_secs(),
            expires_at,
        })
    }
}
