//! Telegram update routing
//!
//! Commands get a text reply. Messages carrying a file start an independent
//! transfer pipeline run. Everything else is ignored.

use std::path::Path;
use std::sync::Arc;

use log::{debug, error, info, warn};
use teloxide::prelude::*;
use teloxide::types::ReplyParameters;
use teloxide::utils::command::BotCommands;

use crate::chat::telegram::inbound_message;
use crate::chat::{ChatClient, TelegramChat};
use crate::commands::Command;
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::transfer::{HttpUploader, PipelineSettings, TransferOutcome, TransferPipeline};

/// Bot wiring: one Telegram client and the pipeline it feeds
pub struct RelayBot {
    bot: Bot,
    pipeline: Arc<TransferPipeline>,
}

impl RelayBot {
    /// Build the bot from validated configuration
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        let mut bot = Bot::new(config.bot_token()?);
        if let Some(api_url) = config.api_url()? {
            info!("Using Bot API server at {api_url}");
            bot = bot.set_api_url(api_url);
        }

        let chat: Arc<dyn ChatClient> = Arc::new(TelegramChat::new(bot.clone()));
        let uploader = Arc::new(HttpUploader::new(config.server_url()));
        info!("Uploads go to {}", uploader.endpoint());
        let settings = PipelineSettings {
            report_interval: config.report_interval(),
            transfer_timeout: config.transfer_timeout(),
            scratch_root: config.scratch_directory().map(Path::to_path_buf),
        };

        Ok(Self {
            bot,
            pipeline: Arc::new(TransferPipeline::new(chat, uploader, settings)),
        })
    }

    /// Poll for updates until interrupted
    pub async fn run(self) -> Result<()> {
        let me = self.bot.get_me().await?;
        info!("Telegram bot connected as @{}", me.username());

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Failed to register bot commands: {e}");
        }

        let handler = Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(handle_command),
            )
            .branch(
                dptree::filter(|msg: Message| inbound_message(&msg).file.is_some())
                    .endpoint(handle_file),
            );

        Dispatcher::builder(self.bot, handler)
            .dependencies(dptree::deps![self.pipeline])
            .default_handler(|update| async move {
                debug!("Ignoring update {:?} without a file", update.id);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram bot stopped");
        Ok(())
    }
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> ResponseResult<()> {
    debug!("Command {:?} from chat {}", cmd, msg.chat.id.0);
    bot.send_message(msg.chat.id, cmd.response())
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

async fn handle_file(msg: Message, pipeline: Arc<TransferPipeline>) -> ResponseResult<()> {
    let inbound = inbound_message(&msg);

    // Each file gets its own task so a long upload never blocks the chat
    tokio::spawn(async move {
        match pipeline.run(&inbound).await {
            Ok(Some(TransferOutcome::Uploaded { url })) => {
                info!("Chat {} file relayed to {}", inbound.chat_id, url);
            }
            Ok(Some(TransferOutcome::Failed { phase, reason })) => {
                warn!(
                    "Chat {} transfer failed while {}: {}",
                    inbound.chat_id, phase, reason
                );
            }
            Ok(None) => {}
            Err(e) => {
                error!("Chat {} transfer could not start: {}", inbound.chat_id, e);
            }
        }
    });

    Ok(())
}
