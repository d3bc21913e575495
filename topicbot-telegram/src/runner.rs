//! REPL 运行：将 teloxide 消息转为 core::Message 后交给 HandlerChain 处理。
//! 与外部交互：调用 teloxide REPL、get_me 获取 bot 用户名、set_my_commands 注册命令列表。

use anyhow::Result;
use handler_chain::HandlerChain;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, instrument, warn};

use super::adapters::TelegramMessageWrapper;
use super::commands::TelegramCommand;

/// 使用给定的 teloxide Bot 和 HandlerChain 启动 REPL。
/// 启动前调用 get_me() 取得 bot 用户名，用于识别 `/command@botname`；每条消息在独立任务中交给
/// chain.handle，长时间的上传不会阻塞其他用户。
#[instrument(skip(bot, handler_chain))]
pub async fn run_repl(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!(username = ?me.user.username, "Connected to Telegram");
            me.user.username.clone().unwrap_or_default()
        }
        Err(e) => {
            error!(error = %e, "get_me failed, starting anyway");
            String::new()
        }
    };
    if let Err(e) = bot.set_my_commands(TelegramCommand::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let chain = handler_chain;
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();
        let bot_username = bot_username.clone();

        async move {
            let core_msg = TelegramMessageWrapper(&msg).to_core_for(&bot_username);
            info!(
                user_id = core_msg.user.id,
                chat_id = core_msg.chat.id,
                message_type = %core_msg.message_type,
                "Received message"
            );

            tokio::spawn(async move {
                info!(
                    user_id = core_msg.user.id,
                    chat_id = core_msg.chat.id,
                    message_id = %core_msg.id,
                    "step: processing message (handler chain started)"
                );
                if let Err(e) = chain.handle(&core_msg).await {
                    error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
