//! Wraps teloxide::Bot and implements [`topicbot_core::Bot`]. Production code talks to Telegram;
//! tests substitute another Bot impl.

use async_trait::async_trait;
use std::path::Path;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{
    ChatFullInfo, ChatFullInfoKind, ChatFullInfoPublicKind, ChatId, FileId, ForumTopic, InputFile,
    MessageId, ThreadId,
};
use topicbot_core::{
    parse_message_id, Bot as CoreBot, Chat, ChatInfo, Document, Message, Result, TopicbotError,
    VideoUpload,
};
use tracing::{debug, instrument};

fn bot_error(e: impl std::fmt::Display) -> TopicbotError {
    TopicbotError::Bot(e.to_string())
}

fn thread(id: i32) -> ThreadId {
    ThreadId(MessageId(id))
}

/// Thin wrapper around teloxide::Bot that implements topicbot-core's Bot trait.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

/// Title and forum flag of a `getChat` result. Only supergroups can be forums.
pub fn chat_info(chat: &ChatFullInfo) -> ChatInfo {
    let is_forum = match &chat.kind {
        ChatFullInfoKind::Public(public) => match &public.kind {
            ChatFullInfoPublicKind::Supergroup(supergroup) => supergroup.is_forum,
            _ => false,
        },
        ChatFullInfoKind::Private(_) => false,
    };
    ChatInfo {
        id: chat.id.0,
        title: chat.title().map(str::to_string),
        is_forum,
    }
}

/// Thread id of a created forum topic.
pub fn topic_thread_id(topic: &ForumTopic) -> i32 {
    topic.thread_id.0 .0
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(bot_error)?;
        Ok(sent.id.to_string())
    }

    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .delete_message(ChatId(chat.id), MessageId(id))
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_chat_info(&self, chat_id: i64) -> Result<ChatInfo> {
        let chat = self.bot.get_chat(ChatId(chat_id)).await.map_err(bot_error)?;
        let info = chat_info(&chat);
        debug!(title = ?info.title, is_forum = info.is_forum, "Fetched chat info");
        Ok(info)
    }

    #[instrument(skip(self))]
    async fn create_forum_topic(&self, chat_id: i64, name: &str) -> Result<Option<i32>> {
        let topic = self
            .bot
            .create_forum_topic(ChatId(chat_id), name.to_string())
            .await
            .map_err(bot_error)?;
        Ok(Some(topic_thread_id(&topic)))
    }

    #[instrument(skip(self, video), fields(path = %video.path.display()))]
    async fn send_video(&self, chat_id: i64, thread_id: Option<i32>, video: &VideoUpload) -> Result<()> {
        let mut req = self
            .bot
            .send_video(ChatId(chat_id), InputFile::file(video.path.clone()));
        req.message_thread_id = thread_id.map(thread);
        req.caption = Some(video.caption.clone());
        req.supports_streaming = Some(true);
        req.width = Some(video.width);
        req.height = Some(video.height);
        req.duration = video.duration_secs;
        req.thumbnail = video.thumbnail.clone().map(InputFile::file);
        req.await.map_err(bot_error)?;
        Ok(())
    }

    #[instrument(skip(self, caption), fields(path = %path.display()))]
    async fn send_document(
        &self,
        chat_id: i64,
        thread_id: Option<i32>,
        path: &Path,
        caption: &str,
    ) -> Result<()> {
        let mut req = self
            .bot
            .send_document(ChatId(chat_id), InputFile::file(path.to_path_buf()));
        req.message_thread_id = thread_id.map(thread);
        req.caption = Some(caption.to_string());
        req.await.map_err(bot_error)?;
        Ok(())
    }

    #[instrument(skip(self, document), fields(file_id = %document.file_id))]
    async fn download_document(&self, document: &Document, dest: &Path) -> Result<()> {
        let file = self
            .bot
            .get_file(FileId(document.file_id.clone()))
            .await
            .map_err(bot_error)?;
        let mut out = tokio::fs::File::create(dest).await?;
        self.bot
            .download_file(&file.path, &mut out)
            .await
            .map_err(bot_error)?;
        Ok(())
    }
}
