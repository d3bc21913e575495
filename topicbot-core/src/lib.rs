//! # topicbot-core
//!
//! Core types and traits for the topic upload bot: [`Bot`] (chat transport), [`Handler`],
//! message/user/document types, errors, and tracing initialization. Transport-agnostic; used by
//! topicbot-telegram, handler-chain and topic-upload.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{parse_message_id, Bot};
pub use error::{HandlerError, Result, TopicbotError};
pub use logger::init_tracing;
pub use types::{
    Chat, ChatInfo, Command, Document, Handler, HandlerResponse, Message, MessageDirection,
    ToCoreMessage, ToCoreUser, User, VideoUpload,
};
