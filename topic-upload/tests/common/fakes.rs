//! In-memory [`Downloader`] and [`Uploader`] fakes.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use topic_upload::{DownloadError, Downloader, UploadError, Uploader};

/// Writes a small file per download into `dir`. URLs in `failing` fail with an HTTP error.
pub struct FakeDownloader {
    dir: PathBuf,
    failing: HashSet<String>,
    /// URLs that report success without leaving a file behind.
    no_output: HashSet<String>,
    /// Cancelled after the first download, to stop a run midway.
    cancel_after_first: Option<CancellationToken>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeDownloader {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            failing: HashSet::new(),
            no_output: HashSet::new(),
            cancel_after_first: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn without_output(mut self, url: &str) -> Self {
        self.no_output.insert(url.to_string());
        self
    }

    pub fn cancel_after_first(mut self, token: CancellationToken) -> Self {
        self.cancel_after_first = Some(token);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, url: &str, name: &str) -> Result<PathBuf, DownloadError> {
        let first = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(url.to_string());
            calls.len() == 1
        };
        if first {
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
        }
        if self.failing.contains(url) {
            return Err(DownloadError::Http(format!("404 Not Found: {}", url)));
        }

        let path = self.dir.join(format!("{}.mp4", name.replace(' ', "_")));
        if self.no_output.contains(url) {
            return Ok(path);
        }
        tokio::fs::write(&path, b"video").await?;
        Ok(path)
    }
}

/// One recorded upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub chat_id: i64,
    pub topic_id: i32,
    pub file_name: String,
    pub caption: String,
}

#[derive(Default)]
pub struct FakeUploader {
    uploads: Mutex<Vec<UploadRecord>>,
    fail_captions: HashSet<String>,
}

#[allow(dead_code)]
impl FakeUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, caption: &str) -> Self {
        self.fail_captions.insert(caption.to_string());
        self
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Uploader for FakeUploader {
    async fn upload(
        &self,
        chat_id: i64,
        topic_id: i32,
        path: &Path,
        caption: &str,
    ) -> Result<(), UploadError> {
        if !path.exists() {
            return Err(UploadError::MissingFile(path.to_path_buf()));
        }
        if self.fail_captions.contains(caption) {
            return Err(UploadError::Transport("Request Entity Too Large".to_string()));
        }
        self.uploads.lock().unwrap().push(UploadRecord {
            chat_id,
            topic_id,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}
