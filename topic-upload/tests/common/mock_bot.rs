//! Mock implementation of [`topicbot_core::Bot`] for integration tests.
//!
//! Records every outbound message and topic creation so tests can assert on the conversation
//! without hitting Telegram. Chat lookups, topic creation failures and document contents are
//! configured up front.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;
use topicbot_core::{Bot, Chat, ChatInfo, Document, Message, Result, TopicbotError, VideoUpload};

/// One recorded `send_message` / `send_message_and_return_id` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub chat_id: i64,
    pub text: String,
}

pub struct MockBot {
    sent: Mutex<Vec<SentRecord>>,
    deleted: Mutex<Vec<String>>,
    chats: Mutex<HashMap<i64, ChatInfo>>,
    documents: Mutex<HashMap<String, Vec<u8>>>,
    created: Mutex<Vec<(i64, String)>>,
    /// Number of upcoming `create_forum_topic` calls that fail.
    create_failures: AtomicUsize,
    /// When set, created topics come back without a thread id.
    create_without_id: Mutex<bool>,
    next_thread_id: AtomicI32,
    next_message_id: AtomicI32,
}

impl Default for MockBot {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            chats: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
            create_failures: AtomicUsize::new(0),
            create_without_id: Mutex::new(false),
            next_thread_id: AtomicI32::new(100),
            next_message_id: AtomicI32::new(1),
        }
    }
}

#[allow(dead_code)]
impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `get_chat_info(chat_id)` succeed with the given title and forum flag.
    pub fn with_chat(self, chat_id: i64, title: &str, is_forum: bool) -> Self {
        self.chats.lock().unwrap().insert(
            chat_id,
            ChatInfo {
                id: chat_id,
                title: Some(title.to_string()),
                is_forum,
            },
        );
        self
    }

    /// Content served by `download_document` for `file_id`.
    pub fn with_document(self, file_id: &str, content: impl Into<Vec<u8>>) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert(file_id.to_string(), content.into());
        self
    }

    pub fn fail_next_creates(&self, count: usize) {
        self.create_failures.store(count, Ordering::SeqCst);
    }

    pub fn create_without_thread_id(&self) {
        *self.create_without_id.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to `chat_id`, in order.
    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|r| r.chat_id == chat_id)
            .map(|r| r.text)
            .collect()
    }

    pub fn last_text_to(&self, chat_id: i64) -> Option<String> {
        self.texts_to(chat_id).pop()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// `(chat_id, name)` of every successful topic creation.
    pub fn created_topics(&self) -> Vec<(i64, String)> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, chat_id: i64, text: &str) {
        self.sent.lock().unwrap().push(SentRecord {
            chat_id,
            text: text.to_string(),
        });
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.record(chat.id, text);
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.record(message.chat.id, text);
        Ok(())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        self.record(chat.id, text);
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst).to_string())
    }

    async fn delete_message(&self, _chat: &Chat, message_id: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(message_id.to_string());
        Ok(())
    }

    async fn get_chat_info(&self, chat_id: i64) -> Result<ChatInfo> {
        self.chats
            .lock()
            .unwrap()
            .get(&chat_id)
            .cloned()
            .ok_or_else(|| TopicbotError::Bot("Bad Request: chat not found".to_string()))
    }

    async fn create_forum_topic(&self, chat_id: i64, name: &str) -> Result<Option<i32>> {
        let failing = self
            .create_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TopicbotError::Bot("Too Many Requests".to_string()));
        }
        if *self.create_without_id.lock().unwrap() {
            return Ok(None);
        }
        self.created
            .lock()
            .unwrap()
            .push((chat_id, name.to_string()));
        Ok(Some(self.next_thread_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn send_video(&self, chat_id: i64, _thread_id: Option<i32>, video: &VideoUpload) -> Result<()> {
        self.record(chat_id, &video.caption);
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        _thread_id: Option<i32>,
        _path: &Path,
        caption: &str,
    ) -> Result<()> {
        self.record(chat_id, caption);
        Ok(())
    }

    async fn download_document(&self, document: &Document, dest: &Path) -> Result<()> {
        let content = self
            .documents
            .lock()
            .unwrap()
            .get(&document.file_id)
            .cloned()
            .ok_or_else(|| TopicbotError::Bot(format!("file not found: {}", document.file_id)))?;
        tokio::fs::write(dest, content).await?;
        Ok(())
    }
}
