//! Adapters from Telegram (teloxide) types to topicbot_core types.
//! Depends only on teloxide and topicbot_core type definitions.

use topicbot_core::{Chat, Document, Message, MessageDirection, ToCoreMessage, ToCoreUser, User};

use crate::commands::parse_command;

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    /// Converts without a known bot username: only bare `/command`s are recognised.
    fn to_core(&self) -> Message {
        self.to_core_for("")
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    /// Converts to a core message, recognising commands addressed to `bot_username`.
    pub fn to_core_for(&self, bot_username: &str) -> Message {
        let document = self.document();
        let content = self
            .0
            .text()
            .or_else(|| self.0.caption())
            .unwrap_or("")
            .to_string();
        let message_type = if document.is_some() {
            "document"
        } else if self.0.text().is_some() {
            "text"
        } else {
            "other"
        };

        let command = self
            .0
            .text()
            .and_then(|text| parse_command(text, bot_username));

        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: chat_type(&self.0.chat).to_string(),
            },
            content,
            message_type: message_type.to_string(),
            document,
            command,
            direction: MessageDirection::Incoming,
            created_at: chrono::Utc::now(),
        }
    }

    fn document(&self) -> Option<Document> {
        self.0.document().map(|d| Document {
            file_id: d.file.id.0.clone(),
            file_name: d.file_name.clone(),
            file_size: Some(d.file.size),
        })
    }
}

/// Core chat type name for a teloxide chat.
pub fn chat_type(chat: &teloxide::types::Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_supergroup() {
        "supergroup"
    } else if chat.is_group() {
        "group"
    } else {
        "channel"
    }
}
