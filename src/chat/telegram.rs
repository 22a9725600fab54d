//! Telegram implementation of the chat boundary

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileMeta, MessageId, ReplyParameters};
use tokio::io::AsyncWriteExt;

use crate::chat::{ChatClient, DownloadProgress, InboundFile, InboundMessage, MessageHandle};
use crate::error::{BridgeError, Result};

/// Chat client backed by a teloxide bot
#[derive(Clone)]
pub struct TelegramChat {
    bot: Bot,
}

impl TelegramChat {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatClient for TelegramChat {
    async fn reply(&self, to: &InboundMessage, text: &str) -> Result<MessageHandle> {
        let sent = self
            .bot
            .send_message(ChatId(to.chat_id), text)
            .reply_parameters(
                ReplyParameters::new(MessageId(to.message_id)).allow_sending_without_reply(),
            )
            .await?;

        Ok(MessageHandle {
            chat_id: sent.chat.id.0,
            message_id: sent.id.0,
        })
    }

    async fn edit(&self, handle: &MessageHandle, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(ChatId(handle.chat_id), MessageId(handle.message_id), text)
            .await?;
        Ok(())
    }

    async fn download(
        &self,
        file: &InboundFile,
        dest_dir: &Path,
        on_progress: &DownloadProgress,
    ) -> Result<PathBuf> {
        // Resolve the remote path first
        let remote = self
            .bot
            .get_file(file.file_id.clone())
            .await
            .map_err(|e| BridgeError::DownloadFailed(format!("cannot resolve file: {e}")))?;

        let total = if file.size > 0 {
            file.size
        } else {
            u64::from(remote.meta.size)
        };

        let name = local_file_name(file.file_name.as_deref(), &remote.path, &file.file_id);
        let local_path = dest_dir.join(&name);
        info!(
            "Downloading '{}' ({} bytes) to {}",
            remote.path,
            total,
            local_path.display()
        );

        let mut out = tokio::fs::File::create(&local_path).await?;
        let mut stream = self.bot.download_file_stream(&remote.path);
        let mut received = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| BridgeError::DownloadFailed(e.to_string()))?;
            out.write_all(&chunk).await?;
            received += chunk.len() as u64;
            on_progress(received, total);
        }

        out.flush().await?;
        debug!("Wrote {received} bytes to {}", local_path.display());
        Ok(local_path)
    }
}

/// Extract the pipeline's view of a Telegram message
pub fn inbound_message(msg: &Message) -> InboundMessage {
    InboundMessage {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        file: attached_file(msg),
    }
}

/// The file carried by a message, if any media is attached
fn attached_file(msg: &Message) -> Option<InboundFile> {
    fn from_meta(meta: &FileMeta, file_name: Option<&String>) -> InboundFile {
        InboundFile {
            file_id: meta.id.clone(),
            file_name: file_name.cloned(),
            size: u64::from(meta.size),
        }
    }

    if let Some(doc) = msg.document() {
        return Some(from_meta(&doc.file, doc.file_name.as_ref()));
    }
    if let Some(video) = msg.video() {
        return Some(from_meta(&video.file, video.file_name.as_ref()));
    }
    if let Some(audio) = msg.audio() {
        return Some(from_meta(&audio.file, audio.file_name.as_ref()));
    }
    if let Some(animation) = msg.animation() {
        return Some(from_meta(&animation.file, animation.file_name.as_ref()));
    }
    if let Some(voice) = msg.voice() {
        return Some(from_meta(&voice.file, None));
    }
    if let Some(note) = msg.video_note() {
        return Some(from_meta(&note.file, None));
    }
    // Photos arrive in several sizes, keep the largest
    msg.photo()
        .and_then(|sizes| {
            sizes
                .iter()
                .max_by_key(|size| u64::from(size.width) * u64::from(size.height))
        })
        .map(|largest| from_meta(&largest.file, None))
}

/// Bare file name for the downloaded artifact.
///
/// Prefers the sender's name, then the remote path's basename, then the
/// file id. Directory components are dropped so the result stays inside
/// the session's temp directory.
pub fn local_file_name(declared: Option<&str>, remote_path: &str, file_id: &str) -> String {
    [declared, Some(remote_path)]
        .into_iter()
        .flatten()
        .filter_map(|candidate| {
            Path::new(candidate)
                .file_name()
                .and_then(|name| name.to_str())
                .filter(|name| !name.is_empty() && *name != "..")
                .map(str::to_string)
        })
        .next()
        .unwrap_or_else(|| file_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_name_preferred() {
        assert_eq!(
            local_file_name(Some("report.pdf"), "documents/file_7.pdf", "AbC"),
            "report.pdf"
        );
    }

    #[test]
    fn test_remote_basename_fallback() {
        assert_eq!(
            local_file_name(None, "photos/file_3.jpg", "AbC"),
            "file_3.jpg"
        );
    }

    #[test]
    fn test_traversal_is_stripped() {
        assert_eq!(
            local_file_name(Some("../../etc/passwd"), "documents/file_1", "AbC"),
            "passwd"
        );
        assert_eq!(local_file_name(Some(".."), "", "AbC"), "AbC");
    }

    #[test]
    fn test_file_id_last_resort() {
        assert_eq!(local_file_name(None, "", "AgADBAAD"), "AgADBAAD");
    }
}
