//! SQLite connection pool wrapper for the storage crate.

use crate::error::StorageError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Manages a single SQLite pool; creates the DB file (and its directory) if missing.
#[derive(Clone)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

impl SqlitePoolManager {
    /// Creates a pool for `database_url`: either a `sqlite:` URL or a plain file path.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        info!(database_url = %database_url, "Initializing SQLite pool");

        let options = connect_options(database_url)?;
        // An in-memory database only lives as long as its connection.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Returns the underlying pool for running queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every connection of the pool; later queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// On-disk file behind `database_url`, or `None` for in-memory databases.
pub fn database_file(database_url: &str) -> Option<PathBuf> {
    let location = match database_url.strip_prefix("sqlite:") {
        Some(rest) => {
            let rest = rest.strip_prefix("//").unwrap_or(rest);
            rest.split('?').next().unwrap_or(rest)
        }
        None => database_url,
    };
    if location.is_empty() || location == ":memory:" || database_url.contains("mode=memory") {
        None
    } else {
        Some(PathBuf::from(location))
    }
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, StorageError> {
    if database_url.starts_with("sqlite:") {
        return SqliteConnectOptions::from_str(database_url)
            .map(|o| o.create_if_missing(true))
            .map_err(|e| StorageError::InvalidUrl(format!("{}: {}", database_url, e)));
    }

    let path = Path::new(database_url);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::InvalidUrl(format!("{}: {}", database_url, e)))?;
        }
    }
    Ok(SqliteConnectOptions::new()
        .create_if_missing(true)
        .filename(path))
}
