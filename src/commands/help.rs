//! Help text for the bot

use teloxide::utils::command::BotCommands;

use crate::commands::Command;

/// Returns the help text listing commands and upload instructions
pub fn help_text() -> String {
    format!(
        "{}\n\nSend any document, photo, video, audio or voice message and it will be \
         uploaded to storage. Progress is shown in a single status message.",
        Command::descriptions()
    )
}
