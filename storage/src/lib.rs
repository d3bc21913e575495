//! Storage crate: persistence of forum topic mappings.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – TopicMapping
//! - [`topic_repo`] – TopicRepository (SQLite)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod models;
mod sqlite_pool;
mod topic_repo;


pub use error::StorageError;
pub use models::TopicMapping;
pub use sqlite_pool::{database_file, SqlitePoolManager};
pub use topic_repo::TopicRepository;
