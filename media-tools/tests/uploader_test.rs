//! Integration tests for [`media_tools::BotUploader`] against a recording bot.

use async_trait::async_trait;
use media_tools::BotUploader;
use std::path::Path;
use std::sync::{Arc, Mutex};
use topic_upload::{UploadError, Uploader};
use topicbot_core::{Bot, Chat, ChatInfo, Document, Message, Result, TopicbotError, VideoUpload};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Video { thread_id: Option<i32>, caption: String, width: u32 },
    Document { thread_id: Option<i32>, caption: String },
}

#[derive(Default)]
struct RecordingBot {
    sent: Mutex<Vec<Sent>>,
    reject_videos: bool,
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, _chat: &Chat, _text: &str) -> Result<()> {
        Ok(())
    }
    async fn reply_to(&self, _message: &Message, _text: &str) -> Result<()> {
        Ok(())
    }
    async fn send_message_and_return_id(&self, _chat: &Chat, _text: &str) -> Result<String> {
        Ok("1".to_string())
    }
    async fn delete_message(&self, _chat: &Chat, _message_id: &str) -> Result<()> {
        Ok(())
    }
    async fn get_chat_info(&self, chat_id: i64) -> Result<ChatInfo> {
        Ok(ChatInfo {
            id: chat_id,
            title: None,
            is_forum: true,
        })
    }
    async fn create_forum_topic(&self, _chat_id: i64, _name: &str) -> Result<Option<i32>> {
        Ok(Some(1))
    }
    async fn send_video(&self, _chat_id: i64, thread_id: Option<i32>, video: &VideoUpload) -> Result<()> {
        if self.reject_videos {
            return Err(TopicbotError::Bot("Bad Request: wrong file type".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::Video {
            thread_id,
            caption: video.caption.clone(),
            width: video.width,
        });
        Ok(())
    }
    async fn send_document(
        &self,
        _chat_id: i64,
        thread_id: Option<i32>,
        _path: &Path,
        caption: &str,
    ) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Document {
            thread_id,
            caption: caption.to_string(),
        });
        Ok(())
    }
    async fn download_document(&self, _document: &Document, _dest: &Path) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_pdf_goes_as_document() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("Notes.pdf");
    tokio::fs::write(&pdf, b"%PDF-1.4").await.unwrap();
    let bot = Arc::new(RecordingBot::default());

    BotUploader::new(bot.clone())
        .upload(-1001, 7, &pdf, "Notes")
        .await
        .unwrap();

    assert_eq!(
        *bot.sent.lock().unwrap(),
        vec![Sent::Document {
            thread_id: Some(7),
            caption: "Notes".to_string()
        }]
    );
}

#[tokio::test]
async fn test_video_is_sent_into_thread() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("Lesson.mp4");
    tokio::fs::write(&video, b"not really a video").await.unwrap();
    let bot = Arc::new(RecordingBot::default());

    BotUploader::new(bot.clone())
        .upload(-1001, 9, &video, "Lesson")
        .await
        .unwrap();

    assert_eq!(
        *bot.sent.lock().unwrap(),
        vec![Sent::Video {
            thread_id: Some(9),
            caption: "Lesson".to_string(),
            width: 1280
        }]
    );
    assert!(!dir.path().join("Lesson.mp4.jpg").exists());
}

#[tokio::test]
async fn test_rejected_video_falls_back_to_document() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("Lesson.mkv");
    tokio::fs::write(&video, b"x").await.unwrap();
    let bot = Arc::new(RecordingBot {
        reject_videos: true,
        ..RecordingBot::default()
    });

    BotUploader::new(bot.clone())
        .upload(-1001, 3, &video, "Lesson")
        .await
        .unwrap();

    assert_eq!(
        *bot.sent.lock().unwrap(),
        vec![Sent::Document {
            thread_id: Some(3),
            caption: "Lesson".to_string()
        }]
    );
}

#[tokio::test]
async fn test_missing_file_is_rejected() {
    let bot = Arc::new(RecordingBot::default());
    let err = BotUploader::new(bot.clone())
        .upload(-1001, 3, Path::new("/nonexistent/clip.mp4"), "Clip")
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::MissingFile(_)));
    assert!(bot.sent.lock().unwrap().is_empty());
}
