//! Business logic services layer

pub mod auth_service;
pub mod movie_service;

pub use auth_service::AuthService;
pub use movie_service::MovieService;
