use std::time::Duration;

use thiserror::Error;

/// Longest cause shown to a chat user; the full error goes to the log
pub const MAX_SUMMARY_CHARS: usize = 200;

/// Main error type for the drive relay bot
#[derive(Debug, Error)]
pub enum BridgeError {
    // Configuration Errors
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] ::config::ConfigError),

    // Download Errors
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),

    // Upload Errors
    #[error("Upload API returned HTTP {status}: {body}")]
    UploadRejected { status: u16, body: String },

    #[error("Invalid response from upload API: {0}")]
    InvalidResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Shared
    #[error("Transfer timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether this error should stop the process before any session starts
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingConfiguration(_) | Self::InvalidConfigValue(_) | Self::ConfigSource(_)
        )
    }

    /// Single-line description suitable for a chat status message,
    /// truncated to [`MAX_SUMMARY_CHARS`]
    pub fn user_summary(&self) -> String {
        let line = self
            .to_string()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if line.chars().count() <= MAX_SUMMARY_CHARS {
            return line;
        }
        let mut short: String = line.chars().take(MAX_SUMMARY_CHARS).collect();
        short.push('…');
        short
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BridgeError>;
