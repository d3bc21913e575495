//! Chain handler for the topic upload workflow: turns core messages into workflow input.

use crate::flow::{Input, Outcome, TopicUploadFlow};
use async_trait::async_trait;
use std::sync::Arc;
use topicbot_core::{Handler, HandlerResponse, Message, Result};
use tracing::{debug, instrument};

/// Handles private-chat messages that belong to the upload workflow; everything else continues
/// down the chain.
#[derive(Clone)]
pub struct TopicUploadHandler {
    flow: Arc<TopicUploadFlow>,
}

impl TopicUploadHandler {
    pub fn new(flow: Arc<TopicUploadFlow>) -> Self {
        Self { flow }
    }

    fn input<'a>(message: &'a Message) -> Option<Input<'a>> {
        if let Some(document) = &message.document {
            return Some(Input::Document(document));
        }
        let text = message.content.trim();
        if text.is_empty() {
            return None;
        }
        match message.command {
            Some(command) => Some(Input::Command(command)),
            // Unknown commands, or ones addressed to another bot, belong to other handlers.
            None if text.starts_with('/') => None,
            None => Some(Input::Text(text)),
        }
    }
}

#[async_trait]
impl Handler for TopicUploadHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.chat.is_private() {
            debug!(chat_type = %message.chat.chat_type, "Not a private chat, skipping");
            return Ok(HandlerResponse::Continue);
        }
        let Some(input) = Self::input(message) else {
            return Ok(HandlerResponse::Continue);
        };

        match self
            .flow
            .dispatch(message.user.id, &message.chat, input)
            .await?
        {
            Outcome::Handled => Ok(HandlerResponse::Stop),
            Outcome::Ignored => Ok(HandlerResponse::Continue),
        }
    }
}
