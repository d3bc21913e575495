//! Telegram bot commands, parsed with teloxide's `BotCommands` and mapped onto core [`Command`].

use teloxide::utils::command::BotCommands;
use topicbot_core::Command;

/// Commands registered with Telegram.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Topic upload bot commands:")]
pub enum TelegramCommand {
    #[command(description = "start an upload session")]
    TopicUpload,
    #[command(description = "cancel the current session")]
    Cancel,
    #[command(description = "show usage")]
    Start,
    #[command(description = "show usage")]
    Help,
}

impl From<TelegramCommand> for Command {
    fn from(command: TelegramCommand) -> Self {
        match command {
            TelegramCommand::TopicUpload => Command::TopicUpload,
            TelegramCommand::Cancel => Command::Cancel,
            TelegramCommand::Start | TelegramCommand::Help => Command::Help,
        }
    }
}

/// Parses `text` as a command for the bot named `bot_username`.
///
/// `/cmd@other_bot`, unknown commands and plain text yield `None`.
pub fn parse_command(text: &str, bot_username: &str) -> Option<Command> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }
    TelegramCommand::parse(text, bot_username).ok().map(Command::from)
}
