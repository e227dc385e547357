//! Argon2id credential hashing
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`).
//! The cost travels with the hash, so a hash made under one cost setting
//! verifies under any other.

use crate::error::AppError;
use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Production cost: argon2's defaults (m=19 MiB, t=2, p=1), the OWASP baseline
    pub fn new() -> Self {
        Self::from_params(Params::DEFAULT)
    }

    /// Explicit cost; tests pass tiny values to keep seeding fast
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AppError> {
        Params::new(memory_kib, iterations, parallelism, None)
            .map(Self::from_params)
            .map_err(|e| AppError::Config(format!("argon2 cost rejected: {}", e)))
    }

    fn from_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Salted PHC string for `password`
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        match self.argon2.hash_password(password.as_bytes(), &salt) {
            Ok(phc) => Ok(phc.to_string()),
            Err(e) => {
                tracing::error!(error = %e, "Password hashing failed");
                Err(AppError::Internal(format!("password hashing failed: {}", e)))
            }
        }
    }

    /// `InvalidCredentials` on mismatch. A stored value that is not a
    /// readable PHC string is a server fault, not a login failure.
    pub fn verify(&self, password: &str, stored: &str) -> Result<(), AppError> {
        let phc = PasswordHash::new(stored).map_err(|e| {
            tracing::error!(error = %e, "Stored password hash is unreadable");
            AppError::Internal(format!("unreadable password hash: {}", e))
        })?;

        match self.argon2.verify_password(password.as_bytes(), &phc) {
            Ok(()) => Ok(()),
            Err(password_hash::Error::Password) => Err(AppError::InvalidCredentials),
            Err(e) => {
                tracing::error!(error = %e, "Password verification failed");
                Err(AppError::Internal(format!("password verification failed: {}", e)))
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
