//! 认证相关的 HTTP 处理器

use crate::{error::AppError, middleware::AppState, models::auth::AuthenticateRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 用户名密码换取令牌
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let response = state.auth_service.authenticate(&req)?;
    Ok(Json(response))
}
