//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::Result;
use handler_chain::HandlerChain;
use media_tools::{BotUploader, DownloaderConfig, MediaDownloader};
use std::sync::Arc;
use storage::TopicRepository;
use teloxide::prelude::*;
use topic_upload::{
    SessionStore, TopicStoreFactory, TopicUploadFlow, TopicUploadHandler, UploadOrchestrator,
};
use topicbot_core::Bot as CoreBot;
use topicbot_telegram::TelegramBotAdapter;
use tracing::{error, info, instrument};

use crate::config::BotConfig;
use crate::handlers::LoggingHandler;

/// Everything run_bot needs; produced by the component factory.
pub struct BotComponents {
    pub teloxide_bot: Bot,
    /// Bot used by the workflow. The Telegram adapter in production; tests inject a mock.
    pub bot: Arc<dyn CoreBot>,
    pub topic_repo: TopicRepository,
    pub sessions: Arc<SessionStore>,
    pub flow: Arc<TopicUploadFlow>,
}

/// Builds the teloxide Bot, pointing it at TELEGRAM_API_URL when set.
pub fn build_teloxide_bot(config: &BotConfig) -> Bot {
    let bot = Bot::new(config.bot_token().to_string());
    match config.telegram_api_url() {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}

/// Builds BotComponents. When `bot_override` is `Some`, the workflow talks to it instead of Telegram.
#[instrument(skip(config, bot_override))]
pub async fn build_bot_components(
    config: &BotConfig,
    bot_override: Option<Arc<dyn CoreBot>>,
) -> Result<BotComponents> {
    let topic_repo = TopicRepository::new(config.database_url())
        .await
        .map_err(|e| {
            error!(
                error = %e,
                database_url = %config.database_url(),
                "Failed to initialize topic storage"
            );
            anyhow::anyhow!("Failed to initialize topic storage: {}", e)
        })?;

    let teloxide_bot = build_teloxide_bot(config);
    let bot: Arc<dyn CoreBot> = match bot_override {
        Some(bot) => bot,
        None => Arc::new(TelegramBotAdapter::new(teloxide_bot.clone())),
    };

    let upload = config.upload();
    tokio::fs::create_dir_all(&upload.download_dir).await?;
    info!(
        download_dir = %upload.download_dir.display(),
        video_quality = upload.video_quality,
        drm = upload.drm_key_api.is_some(),
        "Configuring media tools"
    );

    let downloader = Arc::new(MediaDownloader::new(DownloaderConfig {
        work_dir: upload.download_dir.clone(),
        quality: upload.video_quality,
        drm_key_api: upload.drm_key_api.clone(),
    }));
    let uploader = Arc::new(BotUploader::new(bot.clone()));
    let orchestrator = Arc::new(
        UploadOrchestrator::new(bot.clone(), downloader, uploader)
            .with_entry_delay(upload.entry_delay()),
    );

    let sessions = Arc::new(SessionStore::new());
    let topics = TopicStoreFactory::new(topic_repo.clone(), bot.clone());
    let flow = Arc::new(TopicUploadFlow::new(
        bot.clone(),
        sessions.clone(),
        topics,
        orchestrator,
        upload.download_dir.clone(),
    ));

    Ok(BotComponents {
        teloxide_bot,
        bot,
        topic_repo,
        sessions,
        flow,
    })
}

/// Builds the handler chain (logging → topic upload).
pub fn build_handler_chain(components: &BotComponents) -> HandlerChain {
    HandlerChain::new()
        .add_handler(Arc::new(LoggingHandler))
        .add_handler(Arc::new(TopicUploadHandler::new(components.flow.clone())))
}
