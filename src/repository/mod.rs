//! Repository layer

pub mod movie_repo;
pub mod sequence;

pub use movie_repo::*;
pub use sequence::*;
