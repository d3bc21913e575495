//! # Handler chain
//!
//! Runs a sequence of handlers for each inbound message. Each handler has optional
//! before/handle/after: every `before` runs in order (any false stops the chain), then `handle`
//! runs until one returns Stop or Reply, then every `after` runs in reverse order.
//!
//! A handler that does not recognise a message (e.g. the upload workflow receiving a document
//! while it waits for a chat id) returns Continue so later handlers can take it.

use std::sync::Arc;
use topicbot_core::{Handler, HandlerResponse, Message, Result};
use tracing::{debug, info, instrument};

/// Ordered list of handlers shared by every message task.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler (runs in order; first Stop/Reply ends the handle phase).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs before → handle → after for one message and returns the final response.
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        info!(message_id = %message.id, message_type = %message.message_type, "step: handler_chain started");

        if !self.run_before(message).await? {
            return Ok(HandlerResponse::Stop);
        }

        let final_response = self.run_handle(message).await?;
        self.run_after(message, &final_response).await?;

        info!(
            message_id = %message.id,
            response_type = response_kind(&final_response),
            "step: handler_chain finished"
        );
        Ok(final_response)
    }

    async fn run_before(&self, message: &Message) -> Result<bool> {
        for h in &self.handlers {
            let name = std::any::type_name_of_val(h.as_ref());
            if !h.before(message).await? {
                info!(handler = %name, "step: before returned false, chain stopped");
                return Ok(false);
            }
            debug!(handler = %name, "step: handler before done");
        }
        Ok(true)
    }

    async fn run_handle(&self, message: &Message) -> Result<HandlerResponse> {
        for h in &self.handlers {
            let name = std::any::type_name_of_val(h.as_ref());
            let response = h.handle(message).await?;
            info!(
                handler = %name,
                response_type = response_kind(&response),
                "step: handler handle done"
            );
            match response {
                HandlerResponse::Stop | HandlerResponse::Reply(_) => return Ok(response),
                HandlerResponse::Continue | HandlerResponse::Ignore => {}
            }
        }
        Ok(HandlerResponse::Continue)
    }

    async fn run_after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        for h in self.handlers.iter().rev() {
            h.after(message, response).await?;
            debug!(
                handler = %std::any::type_name_of_val(h.as_ref()),
                "step: handler after done"
            );
        }
        Ok(())
    }
}

fn response_kind(response: &HandlerResponse) -> &'static str {
    match response {
        HandlerResponse::Continue => "Continue",
        HandlerResponse::Stop => "Stop",
        HandlerResponse::Ignore => "Ignore",
        HandlerResponse::Reply(_) => "Reply",
    }
}

// Integration tests live in tests/handler_chain_test.rs
