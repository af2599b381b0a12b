pub mod error;
pub mod models;
pub mod pool;
pub mod reading_repository;
pub mod store;

pub use error::DbError;
pub use models::*;
pub use reading_repository::ReadingRepository;
pub use store::{MemoryReadingStore, ReadingStore, DEFAULT_HISTORY_LIMIT};
