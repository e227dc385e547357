//! Authentication and authorization module

pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use credentials::{CredentialStore, InMemoryCredentialStore, UserDetails};
pub use jwt::{Claims, TokenError, TokenService};
pub use middleware::{authentication_gate, extract_token, AuthenticationGate, GateDecision, Principal};
pub use password::PasswordHasher;
pub use policy::{access_policy_middleware, AccessPolicy, Requirement};
