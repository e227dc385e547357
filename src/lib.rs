//! 电影目录服务库
//! JWT 认证、访问策略与电影目录 API

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
