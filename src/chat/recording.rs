//! In-memory chat client that records every reply and edit

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::chat::{ChatClient, DownloadProgress, InboundFile, InboundMessage, MessageHandle};
use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Reply(String),
    Edit(String),
}

impl ChatEvent {
    pub fn text(&self) -> &str {
        match self {
            Self::Reply(text) | Self::Edit(text) => text,
        }
    }
}

/// Simulated download: `chunks` writes of `chunk_size` bytes, `delay` apart
#[derive(Debug, Clone)]
struct DownloadScript {
    chunks: usize,
    chunk_size: usize,
    delay: Duration,
    fail_at: Option<usize>,
}

pub struct RecordingChat {
    events: Mutex<Vec<ChatEvent>>,
    download_dirs: Mutex<Vec<PathBuf>>,
    next_message_id: AtomicI32,
    script: DownloadScript,
    fail_edits: bool,
    reply_limit: Option<usize>,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            download_dirs: Mutex::new(Vec::new()),
            next_message_id: AtomicI32::new(100),
            script: DownloadScript {
                chunks: 1,
                chunk_size: 1024,
                delay: Duration::ZERO,
                fail_at: None,
            },
            fail_edits: false,
            reply_limit: None,
        }
    }

    pub fn with_download(mut self, chunks: usize, chunk_size: usize, delay: Duration) -> Self {
        self.script.chunks = chunks;
        self.script.chunk_size = chunk_size;
        self.script.delay = delay;
        self
    }

    /// Fail the download when chunk `index` would be written
    pub fn failing_download_at(mut self, index: usize) -> Self {
        self.script.fail_at = Some(index);
        self
    }

    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    /// Accept the first `count` replies and reject every later one
    pub fn failing_replies_after(mut self, count: usize) -> Self {
        self.reply_limit = Some(count);
        self
    }

    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ChatEvent::Edit(text) => Some(text),
                ChatEvent::Reply(_) => None,
            })
            .collect()
    }

    pub fn replies(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ChatEvent::Reply(text) => Some(text),
                ChatEvent::Edit(_) => None,
            })
            .collect()
    }

    /// Directories the pipeline handed to `download`
    pub fn download_dirs(&self) -> Vec<PathBuf> {
        self.download_dirs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<MessageHandle> {
        if self.reply_limit.is_some_and(|limit| self.replies().len() >= limit) {
            return Err(BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "chat unavailable",
            )));
        }
        self.events
            .lock()
            .unwrap()
            .push(ChatEvent::Reply(text.to_string()));
        Ok(MessageHandle {
            chat_id: to.chat_id,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
        })
    }

    async fn edit(&self, _handle: &MessageHandle, text: &str) -> Result<()> {
        if self.fail_edits {
            return Err(BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "message to edit not found",
            )));
        }
        self.events
            .lock()
            .unwrap()
            .push(ChatEvent::Edit(text.to_string()));
        Ok(())
    }

    async fn download(
        &self,
        file: &InboundFile,
        dest_dir: &Path,
        on_progress: &DownloadProgress,
    ) -> Result<PathBuf> {
        self.download_dirs
            .lock()
            .unwrap()
            .push(dest_dir.to_path_buf());

        let name = file.file_name.as_deref().unwrap_or("file.bin");
        let path = dest_dir.join(name);
        let mut out = tokio::fs::File::create(&path).await?;
        let chunk = vec![0u8; self.script.chunk_size];
        let mut written = 0u64;

        for index in 0..self.script.chunks {
            tokio::time::sleep(self.script.delay).await;
            if self.script.fail_at == Some(index) {
                return Err(BridgeError::DownloadFailed("connection reset".to_string()));
            }
            out.write_all(&chunk).await?;
            written += chunk.len() as u64;
            on_progress(written, file.size);
        }

        out.flush().await?;
        Ok(path)
    }
}
