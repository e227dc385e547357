//! Credential store consulted by the authentication gate and `/authenticate`

use crate::{
    auth::{middleware::Principal, password::PasswordHasher},
    config::UserSeed,
    error::AppError,
    models::auth::Role,
};
use secrecy::ExposeSecret;
use std::collections::HashMap;

/// Stored user record
#[derive(Debug, Clone)]
pub struct UserDetails {
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub enabled: bool,
}

impl UserDetails {
    pub fn to_principal(&self) -> Principal {
        Principal {
            username: self.username.clone(),
            roles: self.roles.clone(),
        }
    }
}

/// Read-only lookup of users by name
pub trait CredentialStore: Send + Sync {
    /// `None` when no such user exists
    fn load_by_username(&self, username: &str) -> Option<UserDetails>;

    fn user_count(&self) -> usize;
}

/// Credential store held in memory, populated once at startup
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: HashMap<String, UserDetails>,
}

impl InMemoryCredentialStore {
    pub fn new(users: impl IntoIterator<Item = UserDetails>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.username.clone(), user))
                .collect(),
        }
    }

    /// Hash the plaintext seed passwords and build the store
    pub fn from_seeds(seeds: &[UserSeed], hasher: &PasswordHasher) -> Result<Self, AppError> {
        let mut users = Vec::with_capacity(seeds.len());
        for seed in seeds {
            users.push(UserDetails {
                username: seed.username.clone(),
                password_hash: hasher.hash(seed.password.expose_secret())?,
                roles: seed.roles.clone(),
                enabled: seed.enabled,
            });
        }

        tracing::info!(count = users.len(), "Credential store seeded");
        Ok(Self::new(users))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load_by_username(&self, username: &str) -> Option<UserDetails> {
        self.users.get(username).cloned()
    }

    fn user_count(&self) -> usize {
        self.users.len()
    }
}
