//! 电影目录 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::movie::{Movie, MovieDto},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

pub const DELETED_MESSAGE: &str = "Movie is deleted successfully";

/// 全部电影
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Movie>>, AppError> {
    Ok(Json(state.movie_service.get_all().await?))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Movie>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.movie_service.get_by_id(id).await?))
}

/// 按类型查询（忽略大小写）
pub async fn list_by_genre(
    State(state): State<Arc<AppState>>,
    genre: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Movie>>, AppError> {
    let Path(genre) = genre?;
    Ok(Json(state.movie_service.get_by_genre(&genre).await?))
}

/// 按评分查询
pub async fn list_by_rate(
    State(state): State<Arc<AppState>>,
    rate: Result<Path<f64>, PathRejection>,
) -> Result<Json<Vec<Movie>>, AppError> {
    let Path(rate) = rate?;
    Ok(Json(state.movie_service.get_by_rate(rate).await?))
}

/// 新增电影，返回 201
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MovieDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(dto) = payload?;
    let movie = state.movie_service.insert(dto).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<MovieDto>, JsonRejection>,
) -> Result<Json<Movie>, AppError> {
    let Path(id) = id?;
    let Json(dto) = payload?;
    Ok(Json(state.movie_service.update(id, dto).await?))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    state.movie_service.delete(id).await?;
    Ok(DELETED_MESSAGE)
}

/// 未注册的路由
pub async fn fallback() -> AppError {
    AppError::NotFound
}

/// 路由存在但方法不支持
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
