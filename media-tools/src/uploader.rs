//! [`BotUploader`]: sends downloaded files into a forum thread through the [`Bot`] transport.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use topic_upload::{UploadError, Uploader};
use topicbot_core::{Bot, VideoUpload};
use tracing::{info, instrument, warn};

use crate::format::human_readable_size;
use crate::media_info;

const VIDEO_WIDTH: u32 = 1280;
const VIDEO_HEIGHT: u32 = 720;

/// How a file is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Document,
    Video,
}

pub fn upload_kind(path: &Path) -> UploadKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => UploadKind::Document,
        _ => UploadKind::Video,
    }
}

pub struct BotUploader {
    bot: Arc<dyn Bot>,
}

impl BotUploader {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }

    async fn send_document(
        &self,
        chat_id: i64,
        topic_id: i32,
        path: &Path,
        caption: &str,
    ) -> Result<(), UploadError> {
        self.bot
            .send_document(chat_id, Some(topic_id), path, caption)
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))
    }

    async fn send_video(
        &self,
        chat_id: i64,
        topic_id: i32,
        path: &Path,
        caption: &str,
    ) -> Result<(), UploadError> {
        let thumbnail = media_info::thumbnail(path).await;
        let video = VideoUpload {
            path: path.to_path_buf(),
            caption: caption.to_string(),
            duration_secs: media_info::duration_secs(path).await,
            thumbnail: thumbnail.clone(),
            width: VIDEO_WIDTH,
            height: VIDEO_HEIGHT,
        };

        let result = match self.bot.send_video(chat_id, Some(topic_id), &video).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Video upload failed, sending as document");
                self.send_document(chat_id, topic_id, path, caption).await
            }
        };

        if let Some(thumb) = thumbnail {
            if let Err(e) = tokio::fs::remove_file(&thumb).await {
                warn!(error = %e, path = %thumb.display(), "Failed to remove thumbnail");
            }
        }
        result
    }
}

#[async_trait]
impl Uploader for BotUploader {
    #[instrument(skip(self, caption), fields(path = %path.display()))]
    async fn upload(
        &self,
        chat_id: i64,
        topic_id: i32,
        path: &Path,
        caption: &str,
    ) -> Result<(), UploadError> {
        let size = match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => return Err(UploadError::MissingFile(path.to_path_buf())),
        };
        let kind = upload_kind(path);
        info!(
            chat_id = chat_id,
            topic_id = topic_id,
            kind = ?kind,
            size = %human_readable_size(size),
            "step: uploading to topic"
        );

        match kind {
            UploadKind::Document => self.send_document(chat_id, topic_id, path, caption).await,
            UploadKind::Video => self.send_video(chat_id, topic_id, path, caption).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_kind() {
        assert_eq!(upload_kind(Path::new("a/notes.pdf")), UploadKind::Document);
        assert_eq!(upload_kind(Path::new("a/NOTES.PDF")), UploadKind::Document);
        assert_eq!(upload_kind(Path::new("a/clip.mp4")), UploadKind::Video);
        assert_eq!(upload_kind(Path::new("a/clip")), UploadKind::Video);
    }
}
