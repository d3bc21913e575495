//! # topicbot-telegram
//!
//! Telegram 接入层：适配器、命令解析、基于 teloxide 的 [`topicbot_core::Bot`] 实现、REPL 运行。
//! 仅负责 Telegram 接入与消息链执行，不包含上传流程等业务逻辑。

mod adapters;
mod bot_adapter;
mod commands;
mod runner;

pub use adapters::{chat_type, TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{chat_info, topic_thread_id, TelegramBotAdapter};
pub use commands::{parse_command, TelegramCommand};
pub use runner::run_repl;
