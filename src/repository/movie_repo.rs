//! Movie repository (电影数据访问)
//! 进程内存储，重启后数据不保留

use crate::{
    models::movie::{Movie, MovieDto, MOVIES_SEQUENCE},
    repository::sequence::SequenceGenerator,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct MovieRepository {
    movies: RwLock<BTreeMap<u64, Movie>>,
    sequence: Arc<SequenceGenerator>,
}

impl MovieRepository {
    pub fn new(sequence: Arc<SequenceGenerator>) -> Self {
        Self {
            movies: RwLock::new(BTreeMap::new()),
            sequence,
        }
    }

    /// 全部电影，按 id 升序
    pub async fn find_all(&self) -> Vec<Movie> {
        self.movies.read().await.values().cloned().collect()
    }

    pub async fn find_by_id(&self, id: u64) -> Option<Movie> {
        self.movies.read().await.get(&id).cloned()
    }

    pub async fn find_by_genre_ignore_case(&self, genre: &str) -> Vec<Movie> {
        let genre = genre.to_lowercase();
        self.movies
            .read()
            .await
            .values()
            .filter(|movie| movie.genre.to_lowercase() == genre)
            .cloned()
            .collect()
    }

    pub async fn find_by_rate(&self, rate: f64) -> Vec<Movie> {
        self.movies
            .read()
            .await
            .values()
            .filter(|movie| (movie.rate - rate).abs() < f64::EPSILON)
            .cloned()
            .collect()
    }

    pub async fn find_by_title_and_writer_ignore_case(
        &self,
        title: &str,
        writer: &str,
    ) -> Option<Movie> {
        let title = title.to_lowercase();
        let writer = writer.to_lowercase();
        self.movies
            .read()
            .await
            .values()
            .find(|movie| movie.title.to_lowercase() == title && movie.writer.to_lowercase() == writer)
            .cloned()
    }

    /// 插入新电影，id 由序列生成
    pub async fn insert(&self, dto: MovieDto) -> Movie {
        let id = self.sequence.generate_sequence(MOVIES_SEQUENCE);
        let movie = Movie::from_dto(id, dto);
        self.movies.write().await.insert(id, movie.clone());
        movie
    }

    /// 按 id 保存（存在则覆盖，不存在则以该 id 新建）
    pub async fn save(&self, movie: Movie) -> Movie {
        self.sequence.advance_past(MOVIES_SEQUENCE, movie.id);
        self.movies.write().await.insert(movie.id, movie.clone());
        movie
    }

    /// 返回是否确实删除了记录
    pub async fn delete_by_id(&self, id: u64) -> bool {
        self.movies.write().await.remove(&id).is_some()
    }

    pub async fn count(&self) -> usize {
        self.movies.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dto(title: &str, genre: &str, rate: f64) -> MovieDto {
        MovieDto {
            title: title.to_string(),
            writer: "Writer".to_string(),
            genre: genre.to_string(),
            runtime: "120 min".to_string(),
            release_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            rate,
        }
    }

    fn repo() -> MovieRepository {
        MovieRepository::new(Arc::new(SequenceGenerator::new()))
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let repo = repo();
        assert_eq!(repo.insert(dto("A", "Drama", 7.0)).await.id, 1);
        assert_eq!(repo.insert(dto("B", "Drama", 7.0)).await.id, 2);
        assert_eq!(repo.count().await, 2);
    }

    #[tokio::test]
    async fn test_find_by_genre_ignores_case() {
        let repo = repo();
        repo.insert(dto("A", "Drama", 7.0)).await;
        repo.insert(dto("B", "Comedy", 6.0)).await;

        let found = repo.find_by_genre_ignore_case("dRaMa").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "A");
    }

    #[tokio::test]
    async fn test_find_by_rate() {
        let repo = repo();
        repo.insert(dto("A", "Drama", 7.5)).await;
        repo.insert(dto("B", "Drama", 8.0)).await;

        let found = repo.find_by_rate(7.5).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "A");
    }

    #[tokio::test]
    async fn test_find_by_title_and_writer_ignores_case() {
        let repo = repo();
        repo.insert(dto("Alien", "Horror", 8.5)).await;

        assert!(repo.find_by_title_and_writer_ignore_case("ALIEN", "writer").await.is_some());
        assert!(repo.find_by_title_and_writer_ignore_case("Alien", "Other").await.is_none());
    }

    #[tokio::test]
    async fn test_save_with_explicit_id_bumps_sequence() {
        let repo = repo();
        repo.save(Movie::from_dto(10, dto("A", "Drama", 7.0))).await;

        let next = repo.insert(dto("B", "Drama", 7.0)).await;
        assert_eq!(next.id, 11);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo();
        let movie = repo.insert(dto("A", "Drama", 7.0)).await;

        assert!(repo.delete_by_id(movie.id).await);
        assert!(!repo.delete_by_id(movie.id).await);
        assert!(repo.find_by_id(movie.id).await.is_none());
    }
}
