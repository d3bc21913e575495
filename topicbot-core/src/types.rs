//! Core types: user, chat, message, document attachment, chat info, and the Handler trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User identity (id, username, names).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Chat (private, group, supergroup or channel) identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    /// One of `private`, `group`, `supergroup`, `channel`.
    pub chat_type: String,
}

impl Chat {
    /// A chat addressed by id only (e.g. a target group picked by the user).
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            chat_type: "supergroup".to_string(),
        }
    }

    pub fn is_private(&self) -> bool {
        self.chat_type == "private"
    }
}

/// File attached to a message as a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Transport file id used to fetch the content.
    pub file_id: String,
    pub file_name: Option<String>,
    pub file_size: Option<u32>,
}

/// A single inbound or outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    /// Text, or the caption for documents; empty when neither is present.
    pub content: String,
    /// `text`, `document` or `other`.
    pub message_type: String,
    pub document: Option<Document>,
    /// Bot command recognised by the transport, if the text is one addressed to this bot.
    #[serde(default)]
    pub command: Option<Command>,
    pub direction: MessageDirection,
    pub created_at: DateTime<Utc>,
}

/// Bot commands, already parsed by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// `/topicupload`: start a session.
    TopicUpload,
    /// `/cancel`: drop the current session.
    Cancel,
    /// `/start` or `/help`: usage text.
    Help,
}

/// Direction of the message (from user or from bot).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MessageDirection {
    Incoming,
    Outgoing,
}

/// Chat metadata returned by a chat lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    pub id: i64,
    pub title: Option<String>,
    /// Whether forum topics are enabled in the chat.
    pub is_forum: bool,
}

/// Video file plus the metadata sent along with it.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub path: PathBuf,
    pub caption: String,
    pub duration_secs: Option<u32>,
    pub thumbnail: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

/// Handler result for the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; no response body.
    Stop,
    /// Skip this handler, try next.
    Ignore,
    /// Stop the chain and attach reply text.
    Reply(String),
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// Single handler concept: optional before / handle / after. Chain runs all before → handle until Stop/Reply → all after (reverse).
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs before the handle phase. Return false to stop the chain.
    async fn before(&self, _message: &Message) -> crate::error::Result<bool> {
        Ok(true)
    }
    /// Processes the message. Return Stop or Reply to end the handle phase. Default: Continue.
    async fn handle(&self, _message: &Message) -> crate::error::Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }
    /// Runs after the handle phase (reverse order), with the final response.
    async fn after(
        &self,
        _message: &Message,
        _response: &HandlerResponse,
    ) -> crate::error::Result<()> {
        Ok(())
    }
}
