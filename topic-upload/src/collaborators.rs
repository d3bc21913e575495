//! Download and upload capabilities injected into the orchestrator.
//!
//! Implementations live outside this crate (`media-tools`); tests use in-memory fakes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("{program} exited with {status}")]
    Process { program: String, status: String },
    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },
    #[error("key lookup failed: {0}")]
    Keys(String),
    #[error("no output file for {0}")]
    MissingOutput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("file not found: {0}")]
    MissingFile(PathBuf),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Fetches a remote asset to local storage.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Downloads `url`, naming the local file after `name`. Returns the path of the produced file.
    async fn download(&self, url: &str, name: &str) -> Result<PathBuf, DownloadError>;
}

/// Sends a local file into a forum thread of the target chat.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        chat_id: i64,
        topic_id: i32,
        path: &Path,
        caption: &str,
    ) -> Result<(), UploadError>;
}
