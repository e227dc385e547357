//! Authentication-related models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use super::role::Role;

/// Token type reported to clients; matches the `Authorization` scheme
pub const TOKEN_TYPE: &str = "Bearer";

/// Authenticate request
#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub username: String,
    pub password: String,
}

/// Authenticate response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateResponse {
    pub token_type: String,
    pub token: String,
    /// seconds until the token expires
    pub expires_in: u64,
    pub expires_at: DateTime<Utc>,
}
