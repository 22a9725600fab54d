//! Bot command definitions

use teloxide::utils::command::BotCommands;

use crate::commands::help::help_text;

/// Commands understood by the bot; anything else is routed by content
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    /// /start - Greeting shown when a chat is opened
    #[command(description = "show the welcome message")]
    Start,

    /// /hii - Liveness check
    #[command(description = "say hello")]
    Hii,

    /// /help - List commands (also how to upload)
    #[command(description = "show this help")]
    Help,
}

impl Command {
    /// Text the bot replies with
    pub fn response(&self) -> String {
        match self {
            Command::Start => "Welcome! Send me a file to upload to Google Drive.".to_string(),
            Command::Hii => "hello".to_string(),
            Command::Help => help_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/start", "relay_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/hii", "relay_bot").unwrap(), Command::Hii);
        assert_eq!(
            Command::parse("/help@relay_bot", "relay_bot").unwrap(),
            Command::Help
        );
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Command::parse("/upload", "relay_bot").is_err());
        assert!(Command::parse("hello there", "relay_bot").is_err());
    }

    #[test]
    fn test_responses() {
        assert_eq!(
            Command::Start.response(),
            "Welcome! Send me a file to upload to Google Drive."
        );
        assert_eq!(Command::Hii.response(), "hello");
        assert!(Command::Help.response().contains("/hii"));
    }
}
