//! # topic-upload
//!
//! Uploads videos listed in a text manifest into forum topics of a Telegram group.
//!
//! ## Modules
//!
//! - [`manifest`] – `[Topic] - Name : URL` line grammar
//! - [`topic_store`] – topic name → thread id cache with on-demand topic creation
//! - [`orchestrator`] – sequential per-entry download/upload with progress notices
//! - [`session`] – per-user workflow sessions
//! - [`flow`] – the conversation state machine
//! - [`handler`] – [`topicbot_core::Handler`] adapter for the handler chain

pub mod collaborators;
pub mod flow;
pub mod handler;
pub mod manifest;
pub mod orchestrator;
pub mod session;
pub mod topic_store;

pub use collaborators::{DownloadError, Downloader, UploadError, Uploader};
pub use flow::{help_text, parse_chat_id, route, Input, Outcome, Route, TopicUploadFlow};
pub use handler::TopicUploadHandler;
pub use manifest::{entries, is_skipped, parse_line, ManifestEntry, ParsedLine};
pub use orchestrator::{summary_text, Summary, UploadOrchestrator};
pub use session::{BeginProcessing, Session, SessionStep, SessionStore};
pub use topic_store::{TopicCreationError, TopicStore, TopicStoreFactory};
