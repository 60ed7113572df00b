/*!
 * Database module for the persistent string cache.
 *
 * Backend responses are stored in SQLite so that repeated runs over the same
 * documents do not call the backend again.
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{CacheRecord, CacheStats};
pub use repository::Repository;
