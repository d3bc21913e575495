//! Bot abstraction: the chat transport operations the upload workflow needs.
//!
//! [`Bot`] is transport-agnostic; `topicbot-telegram` implements it over teloxide and tests
//! substitute recording mocks.

use crate::error::{Result, TopicbotError};
use crate::types::{Chat, ChatInfo, Document, Message, VideoUpload};
use async_trait::async_trait;
use std::path::Path;

/// Chat transport. Target chats (forum groups) are addressed by raw id; replies go to a [`Chat`].
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;
    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;
    /// Sends a message and returns its id so it can be deleted later. `message_id` is transport-specific (e.g. Telegram numeric string).
    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String>;
    /// Deletes a message previously sent by the bot.
    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()>;
    /// Fetches title and forum capability of a chat. Fails when the chat is unreachable.
    async fn get_chat_info(&self, chat_id: i64) -> Result<ChatInfo>;
    /// Creates a forum topic and returns its thread id, or `None` when the response carried no usable id.
    async fn create_forum_topic(&self, chat_id: i64, name: &str) -> Result<Option<i32>>;
    /// Sends a video into a chat, optionally inside a forum thread.
    async fn send_video(&self, chat_id: i64, thread_id: Option<i32>, video: &VideoUpload) -> Result<()>;
    /// Sends a file as a document, optionally inside a forum thread.
    async fn send_document(
        &self,
        chat_id: i64,
        thread_id: Option<i32>,
        path: &Path,
        caption: &str,
    ) -> Result<()>;
    /// Downloads a document attachment to `dest`.
    async fn download_document(&self, document: &Document, dest: &Path) -> Result<()>;
}

/// Parses a message id string into an i32. Used by delete_message.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| TopicbotError::Bot(format!("Invalid message_id: {}", s)))
}
