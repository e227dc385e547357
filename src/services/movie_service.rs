//! 电影目录服务：查询、新增、更新、删除

use crate::{
    error::AppError,
    models::movie::{Movie, MovieDto},
    repository::movie_repo::MovieRepository,
};
use std::sync::Arc;
use validator::Validate;

pub struct MovieService {
    repo: Arc<MovieRepository>,
}

impl MovieService {
    pub fn new(repo: Arc<MovieRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Movie, AppError> {
        self.repo.find_by_id(id).await.ok_or(AppError::MovieNotFound)
    }

    /// 空结果按未找到处理
    pub async fn get_all(&self) -> Result<Vec<Movie>, AppError> {
        non_empty(self.repo.find_all().await)
    }

    pub async fn get_by_genre(&self, genre: &str) -> Result<Vec<Movie>, AppError> {
        non_empty(self.repo.find_by_genre_ignore_case(genre).await)
    }

    pub async fn get_by_rate(&self, rate: f64) -> Result<Vec<Movie>, AppError> {
        non_empty(self.repo.find_by_rate(rate).await)
    }

    /// 新增电影，标题+编剧（忽略大小写）重复时拒绝
    pub async fn insert(&self, dto: MovieDto) -> Result<Movie, AppError> {
        dto.validate()?;

        if self
            .repo
            .find_by_title_and_writer_ignore_case(&dto.title, &dto.writer)
            .await
            .is_some()
        {
            return Err(AppError::DuplicateRecords);
        }

        let movie = self.repo.insert(dto).await;
        tracing::info!(id = movie.id, title = %movie.title, "Movie created");
        Ok(movie)
    }

    /// 更新电影，不存在时以该 id 新建
    pub async fn update(&self, id: u64, dto: MovieDto) -> Result<Movie, AppError> {
        dto.validate()?;

        let movie = match self.repo.find_by_id(id).await {
            Some(mut existing) => {
                existing.apply(dto);
                existing
            }
            None => Movie::from_dto(id, dto),
        };

        let movie = self.repo.save(movie).await;
        tracing::info!(id = movie.id, "Movie saved");
        Ok(movie)
    }

    pub async fn delete(&self, id: u64) -> Result<(), AppError> {
        if !self.repo.delete_by_id(id).await {
            return Err(AppError::MovieNotFound);
        }

        tracing::info!(id, "Movie deleted");
        Ok(())
    }

    pub async fn count(&self) -> usize {
        self.repo.count().await
    }
}

fn non_empty(movies: Vec<Movie>) -> Result<Vec<Movie>, AppError> {
    if movies.is_empty() {
        return Err(AppError::MovieNotFound);
    }
    Ok(movies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sequence::SequenceGenerator;
    use chrono::NaiveDate;

    fn service() -> MovieService {
        MovieService::new(Arc::new(MovieRepository::new(Arc::new(SequenceGenerator::new()))))
    }

    fn dto(title: &str) -> MovieDto {
        MovieDto {
            title: title.to_string(),
            writer: "Ridley Scott".to_string(),
            genre: "Sci-Fi".to_string(),
            runtime: "117 min".to_string(),
            release_date: NaiveDate::from_ymd_opt(1982, 6, 25).unwrap(),
            rate: 8.1,
        }
    }

    #[tokio::test]
    async fn test_empty_catalog_is_not_found() {
        let service = service();
        assert!(matches!(service.get_all().await, Err(AppError::MovieNotFound)));
        assert!(matches!(service.get_by_genre("drama").await, Err(AppError::MovieNotFound)));
        assert!(matches!(service.get_by_rate(1.0).await, Err(AppError::MovieNotFound)));
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let service = service();
        let movie = service.insert(dto("Blade Runner")).await.unwrap();

        assert_eq!(service.get_by_id(movie.id).await.unwrap(), movie);
        assert_eq!(service.get_by_genre("sci-fi").await.unwrap().len(), 1);
        assert_eq!(service.get_by_rate(8.1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let service = service();
        service.insert(dto("Blade Runner")).await.unwrap();

        let duplicate = MovieDto { title: "BLADE RUNNER".to_string(), ..dto("x") };
        assert!(matches!(service.insert(duplicate).await, Err(AppError::DuplicateRecords)));
    }

    #[tokio::test]
    async fn test_invalid_insert_rejected() {
        let service = service();
        let invalid = MovieDto { rate: 11.0, ..dto("Blade Runner") };
        assert!(matches!(service.insert(invalid).await, Err(AppError::Validation(_))));
        assert_eq!(service.count().await, 0);
    }

    #[tokio::test]
    async fn test_update_existing_and_upsert() {
        let service = service();
        let movie = service.insert(dto("Blade Runner")).await.unwrap();

        let updated = service
            .update(movie.id, MovieDto { rate: 9.0, ..dto("Blade Runner") })
            .await
            .unwrap();
        assert_eq!(updated.id, movie.id);
        assert_eq!(updated.rate, 9.0);

        let created = service.update(50, dto("Legend")).await.unwrap();
        assert_eq!(created.id, 50);
        assert_eq!(service.count().await, 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let service = service();
        let movie = service.insert(dto("Blade Runner")).await.unwrap();

        service.delete(movie.id).await.unwrap();
        assert!(matches!(service.delete(movie.id).await, Err(AppError::MovieNotFound)));
        assert!(matches!(service.get_by_id(movie.id).await, Err(AppError::MovieNotFound)));
    }
}
