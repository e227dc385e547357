//! Movie domain models

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Name of the sequence that hands out movie ids
pub const MOVIES_SEQUENCE: &str = "movies_sequence";

/// Stored movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub writer: String,
    pub genre: String,
    pub runtime: String,
    pub release_date: NaiveDate,
    pub rate: f64,
}

impl Movie {
    pub fn from_dto(id: u64, dto: MovieDto) -> Self {
        Self {
            id,
            title: dto.title,
            writer: dto.writer,
            genre: dto.genre,
            runtime: dto.runtime,
            release_date: dto.release_date,
            rate: dto.rate,
        }
    }

    /// Overwrite every field except the id
    pub fn apply(&mut self, dto: MovieDto) {
        self.title = dto.title;
        self.writer = dto.writer;
        self.genre = dto.genre;
        self.runtime = dto.runtime;
        self.release_date = dto.release_date;
        self.rate = dto.rate;
    }
}

/// Create / update movie request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MovieDto {
    #[validate(custom(function = "not_blank", message = "The title is required!"))]
    pub title: String,

    #[validate(custom(function = "not_blank", message = "The writer is required!"))]
    pub writer: String,

    #[validate(custom(function = "not_blank", message = "The genre is required!"))]
    pub genre: String,

    #[validate(custom(function = "not_blank", message = "The runtime is required!"))]
    pub runtime: String,

    #[validate(custom(function = "past_or_present", message = "Must be a past or present date!"))]
    pub release_date: NaiveDate,

    #[validate(range(min = 0.0, max = 10.0, message = "The rate must be between 0.0 and 10.0!"))]
    pub rate: f64,
}

impl From<Movie> for MovieDto {
    fn from(movie: Movie) -> Self {
        Self {
            title: movie.title,
            writer: movie.writer,
            genre: movie.genre,
            runtime: movie.runtime,
            release_date: movie.release_date,
            rate: movie.rate,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn past_or_present(value: &NaiveDate) -> Result<(), ValidationError> {
    if *value > Utc::now().date_naive() {
        return Err(ValidationError::new("future_date"));
    }
    Ok(())
}
