//! Chat platform boundary
//!
//! The pipeline only talks to the platform through [`ChatClient`], so a
//! Telegram bot and the in-memory test double are interchangeable.

pub mod status;
pub mod telegram;

#[cfg(test)]
pub mod recording;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

pub use status::StatusMessage;
pub use telegram::TelegramChat;

/// Callback receiving `(bytes_so_far, total_bytes)` during a download
pub type DownloadProgress = dyn Fn(u64, u64) + Send + Sync;

/// Reference to a message that can be edited in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub chat_id: i64,
    pub message_id: i32,
}

/// File attached to an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFile {
    pub file_id: String,
    pub file_name: Option<String>,
    /// Declared size in bytes, 0 when the platform did not report one
    pub size: u64,
}

/// Inbound chat message as seen by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub file: Option<InboundFile>,
}

impl InboundMessage {
    pub fn display_name(&self) -> &str {
        self.file
            .as_ref()
            .and_then(|file| file.file_name.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// Operations the transfer pipeline needs from a chat platform
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Reply to `to` and return a handle to the new message
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<MessageHandle>;

    /// Replace the text of an existing message
    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<()>;

    /// Download `file` into `dest_dir`, reporting progress, and return the written path
    async fn download(
        &self,
        file: &InboundFile,
        dest_dir: &Path,
        on_progress: &DownloadProgress,
    ) -> Result<PathBuf>;
}
