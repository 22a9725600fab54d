use std::env;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{BridgeError, Result};

/// Default location of the optional TOML config file
pub const DEFAULT_CONFIG_FILE: &str = "drive-relay.toml";

/// Default upstream server when `SERVER_URL` is not set
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Configuration for the drive relay bot
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Chat platform configuration
    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Upload API configuration
    pub upload: UploadSettings,

    /// Transfer pipeline configuration
    pub transfer: TransferSettings,
}

#[derive(Clone, Default, Deserialize)]
pub struct TelegramSettings {
    /// Bot API token
    #[serde(default)]
    pub bot_token: Option<SecretString>,

    /// Base URL of a self-hosted Bot API server
    #[serde(default)]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Base URL of the storage server exposing `/api/upload-file`
    pub server_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferSettings {
    /// Seconds between progress edits
    pub report_interval: u64,

    /// Per-phase network timeout in seconds, 0 disables it
    pub timeout: u64,

    /// Parent directory for per-session scratch space
    #[serde(default)]
    pub scratch_directory: Option<String>,
}

impl BridgeConfig {
    /// Load configuration from defaults, the optional config file and the environment
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("DRIVE_RELAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = Self::from_file(&config_path)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from defaults layered under an optional TOML file
    pub fn from_file(config_path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .set_default("upload.server_url", DEFAULT_SERVER_URL)?
            .set_default("transfer.report_interval", 5_i64)?
            .set_default("transfer.timeout", 0_i64)?
            .add_source(::config::File::with_name(config_path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Apply overrides looked up by environment variable name
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Telegram overrides
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(SecretString::new(token));
        }

        if let Some(api_url) = lookup("TELEGRAM_API_URL") {
            self.telegram.api_url = Some(api_url);
        }

        // Upload overrides
        if let Some(server_url) = lookup("SERVER_URL") {
            self.upload.server_url = server_url;
        }

        // Transfer overrides
        if let Some(interval) = lookup("DRIVE_RELAY_REPORT_INTERVAL") {
            self.transfer.report_interval = interval.parse().map_err(|_| {
                BridgeError::InvalidConfigValue(
                    "DRIVE_RELAY_REPORT_INTERVAL must be a number of seconds".to_string(),
                )
            })?;
        }

        if let Some(timeout) = lookup("DRIVE_RELAY_TRANSFER_TIMEOUT") {
            self.transfer.timeout = timeout.parse().map_err(|_| {
                BridgeError::InvalidConfigValue(
                    "DRIVE_RELAY_TRANSFER_TIMEOUT must be a number of seconds".to_string(),
                )
            })?;
        }

        if let Some(scratch) = lookup("DRIVE_RELAY_SCRATCH_DIR") {
            self.transfer.scratch_directory = Some(scratch);
        }

        Ok(())
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<()> {
        // Token must be present
        match &self.telegram.bot_token {
            Some(token) if !token.expose_secret().trim().is_empty() => {}
            _ => {
                return Err(BridgeError::MissingConfiguration(
                    "TELEGRAM_BOT_TOKEN".to_string(),
                ));
            }
        }

        if let Some(api_url) = &self.telegram.api_url {
            parse_http_url("TELEGRAM_API_URL", api_url)?;
        }

        parse_http_url("SERVER_URL", &self.upload.server_url)?;

        if self.transfer.report_interval == 0 {
            return Err(BridgeError::InvalidConfigValue(
                "Report interval cannot be 0".to_string(),
            ));
        }

        if let Some(dir) = &self.transfer.scratch_directory {
            if !Path::new(dir).is_dir() {
                return Err(BridgeError::InvalidConfigValue(format!(
                    "Scratch directory '{dir}' does not exist"
                )));
            }
        }

        Ok(())
    }

    pub fn bot_token(&self) -> Result<&str> {
        self.telegram
            .bot_token
            .as_ref()
            .map(|token| token.expose_secret().as_str())
            .ok_or_else(|| BridgeError::MissingConfiguration("TELEGRAM_BOT_TOKEN".to_string()))
    }

    pub fn api_url(&self) -> Result<Option<Url>> {
        self.telegram
            .api_url
            .as_deref()
            .map(|url| parse_http_url("TELEGRAM_API_URL", url))
            .transpose()
    }

    pub fn server_url(&self) -> &str {
        &self.upload.server_url
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.transfer.report_interval)
    }

    /// Per-phase timeout, `None` when unbounded
    pub fn transfer_timeout(&self) -> Option<Duration> {
        (self.transfer.timeout > 0).then(|| Duration::from_secs(self.transfer.timeout))
    }

    pub fn scratch_directory(&self) -> Option<&Path> {
        self.transfer.scratch_directory.as_deref().map(Path::new)
    }
}

fn parse_http_url(name: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| BridgeError::InvalidConfigValue(format!("{name} '{value}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BridgeError::InvalidConfigValue(format!(
            "{name} must use http or https, got '{other}'"
        ))),
    }
}

impl std::fmt::Display for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match &self.telegram.bot_token {
            Some(_) => "<set>",
            None => "<missing>",
        };
        let timeout = match self.transfer_timeout() {
            Some(limit) => format!("{}s", limit.as_secs()),
            None => "none".to_string(),
        };
        write!(
            f,
            "Drive Relay Config - Token: {}, Upload Server: {}, Report Interval: {}s, Timeout: {}, Scratch Dir: {}",
            token,
            self.upload.server_url,
            self.transfer.report_interval,
            timeout,
            self.transfer
                .scratch_directory
                .as_deref()
                .unwrap_or("system temp"),
        )
    }
}
