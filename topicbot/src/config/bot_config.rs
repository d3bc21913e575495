//! BotConfig: BaseConfig + UploadConfig. Use load() for env-based loading.

use anyhow::Result;
use std::path::PathBuf;

use super::{BaseConfig, UploadConfig};

/// Bot config. Use BotConfig::load() for env-based loading.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub base: BaseConfig,
    pub upload: UploadConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    /// Call validate() after load to check config before init.
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let upload = UploadConfig::from_env()?;
        Ok(Self { base, upload })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.upload.validate()
    }

    pub fn base(&self) -> &BaseConfig {
        &self.base
    }
    pub fn upload(&self) -> &UploadConfig {
        &self.upload
    }

    // --- Base config getters ---
    pub fn bot_token(&self) -> &str {
        &self.base.bot_token
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }

    /// Files the download directory cleanup must never touch: the topic database and the log file.
    pub fn protected_paths(&self) -> Vec<PathBuf> {
        storage::database_file(&self.base.database_url)
            .into_iter()
            .chain(std::iter::once(PathBuf::from(&self.base.log_file)))
            .collect()
    }
}
