//! Bot configuration: BaseConfig (Telegram + log + DB) + UploadConfig (work dir, media tools).

mod base;
mod bot_config;
mod upload;


pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use upload::UploadConfig;
