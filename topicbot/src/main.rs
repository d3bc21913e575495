//! Binary for the topic upload bot.

use anyhow::Result;
use clap::Parser;
use topicbot::{list_topics, load_config, run_bot, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = load_config(token)?;
            run_bot(config).await
        }
        Commands::Topics { database_url } => {
            let database_url = database_url
                .or_else(|| std::env::var("DATABASE_URL").ok())
                .unwrap_or_else(|| "./data/topics.db".to_string());
            list_topics(&database_url).await
        }
    }
}
