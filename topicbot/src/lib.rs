//! # Topic upload bot application
//!
//! Wires topicbot-core, handler-chain, storage, topic-upload, media-tools and topicbot-telegram.
//! Loads config from env and runs the REPL.

pub mod cli;
pub mod components;
pub mod config;
pub mod handlers;
pub mod runner;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, build_teloxide_bot, BotComponents};
pub use config::{BaseConfig, BotConfig, UploadConfig};
pub use handlers::LoggingHandler;
pub use runner::{clean_download_dir, list_topics, run_bot};
