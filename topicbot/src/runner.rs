use anyhow::Result;
use std::path::Path;
use media_tools::clean_work_dir;
use storage::TopicRepository;
use topicbot_core::init_tracing;
use topicbot_telegram::run_repl;
use tracing::{info, instrument, warn};

use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;

/// Main entry: validate config, init logging, clean the work dir, build components, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        database_url = %config.database_url(),
        download_dir = %config.upload().download_dir.display(),
        "Initializing bot"
    );

    if config.upload().cleanup_on_start {
        match clean_download_dir(&config).await {
            Ok(removed) => info!(removed, "step: cleaned download directory"),
            Err(e) => warn!(error = %e, "Failed to clean download directory"),
        }
    }

    let components = build_bot_components(&config, None).await?;
    let handler_chain = build_handler_chain(&components);
    let topic_repo = components.topic_repo.clone();

    info!("Bot started successfully");

    run_repl(components.teloxide_bot, handler_chain).await?;

    topic_repo.close().await;
    info!("Bot stopped");
    Ok(())
}

/// Empties DOWNLOAD_DIR, refusing when it holds the topic database or the log file.
pub async fn clean_download_dir(config: &BotConfig) -> std::io::Result<usize> {
    let protected = config.protected_paths();
    let keep: Vec<&Path> = protected.iter().map(|p| p.as_path()).collect();
    clean_work_dir(&config.upload().download_dir, &keep).await
}

/// Prints every cached topic mapping as `name<TAB>thread id`.
pub async fn list_topics(database_url: &str) -> Result<()> {
    let repo = TopicRepository::new(database_url).await?;
    let mappings = repo.list().await?;
    if mappings.is_empty() {
        println!("No topics cached in {}", database_url);
    }
    for mapping in &mappings {
        println!("{}\t{}", mapping.topic_name, mapping.topic_id);
    }
    repo.close().await;
    Ok(())
}
