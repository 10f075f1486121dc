pub mod repository;
pub mod sqlite;

pub use repository::ProgressionRepository;
pub use sqlite::{ProgressionDb, ProgressionDbError};
