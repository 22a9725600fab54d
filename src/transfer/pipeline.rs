//! Download-then-upload pipeline for a single inbound file

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};

use crate::chat::{ChatClient, InboundFile, InboundMessage, StatusMessage};
use crate::error::{BridgeError, Result};
use crate::transfer::progress::{TransferVerb, complete_message};
use crate::transfer::reporter::PeriodicReporter;
use crate::transfer::session::{TransferPhase, TransferSession};
use crate::transfer::upload::{UPLOAD_TARGET_FOLDER, Uploader};

const INITIAL_STATUS: &str = "Downloading your file...";

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The file was stored; carries the URL reported by the upload API
    Uploaded { url: String },
    /// The run failed in the given phase; the user already saw the error
    Failed { phase: TransferPhase, reason: String },
}

/// Timing knobs for a pipeline
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub report_interval: Duration,
    pub transfer_timeout: Option<Duration>,
    pub scratch_root: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            report_interval: Duration::from_secs(5),
            transfer_timeout: None,
            scratch_root: None,
        }
    }
}

/// Relays inbound chat files to the upload API, reporting progress in chat.
///
/// Each call to [`TransferPipeline::run`] owns its own session, trackers and
/// reporters, so concurrent runs share nothing mutable.
pub struct TransferPipeline {
    chat: Arc<dyn ChatClient>,
    uploader: Arc<dyn Uploader>,
    settings: PipelineSettings,
}

impl TransferPipeline {
    pub fn new(
        chat: Arc<dyn ChatClient>,
        uploader: Arc<dyn Uploader>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            chat,
            uploader,
            settings,
        }
    }

    /// Download the file attached to `message` and upload it.
    ///
    /// Returns `Ok(None)` for messages without a file. Transfer failures are
    /// reported in chat and returned as [`TransferOutcome::Failed`]. Only a
    /// failure to post the initial status message or to create scratch space
    /// is returned as an error.
    pub async fn run(&self, message: &InboundMessage) -> Result<Option<TransferOutcome>> {
        let Some(file) = &message.file else {
            return Ok(None);
        };

        let session_id = format!("{}:{}", message.chat_id, message.message_id);
        info!(
            "Session {} received '{}' ({} bytes declared)",
            session_id,
            message.display_name(),
            file.size
        );

        let handle = self.chat.reply(message, INITIAL_STATUS).await?;
        let status = StatusMessage::new(Arc::clone(&self.chat), handle);
        let scratch_root = self.settings.scratch_root.as_deref();
        let mut session = match TransferSession::start(session_id, file.size, scratch_root) {
            Ok(session) => session,
            Err(e) => {
                status
                    .set(&failure_message(TransferPhase::Downloading, &e))
                    .await;
                return Err(e);
            }
        };

        let result = self.transfer(&mut session, message, file, &status).await;

        let outcome = match result {
            Ok(url) => {
                session.complete();
                TransferOutcome::Uploaded { url }
            }
            Err(e) => {
                let phase = session.phase();
                session.fail();
                error!("Session {} failed while {}: {}", session.id(), phase, e);
                status.set(&failure_message(phase, &e)).await;
                TransferOutcome::Failed {
                    phase,
                    reason: e.user_summary(),
                }
            }
        };

        session.close();
        Ok(Some(outcome))
    }

    async fn transfer(
        &self,
        session: &mut TransferSession,
        message: &InboundMessage,
        file: &InboundFile,
        status: &StatusMessage,
    ) -> Result<String> {
        let local_path = self.download(session, file, status).await?;
        let url = self.upload(session, &local_path, status).await?;

        self.chat
            .reply(
                message,
                &format!("✅ File uploaded successfully!\n🔗 URL: {url}"),
            )
            .await?;
        Ok(url)
    }

    async fn download(
        &self,
        session: &TransferSession,
        file: &InboundFile,
        status: &StatusMessage,
    ) -> Result<PathBuf> {
        let tracker = session.progress().clone();
        let reporter = PeriodicReporter::spawn(
            tracker.clone(),
            status.clone(),
            TransferVerb::Downloading,
            self.settings.report_interval,
        );

        let on_progress = move |bytes: u64, _total: u64| tracker.update(bytes);
        let result = self
            .bounded(
                self.chat
                    .download(file, session.scratch_dir(), &on_progress),
            )
            .await;
        reporter.stop().await;
        let local_path = result?;

        // Declared size may be missing; fall back to what landed on disk
        let total = match file.size {
            0 => tokio::fs::metadata(&local_path).await?.len(),
            declared => declared,
        };
        status
            .set(&complete_message(TransferVerb::Downloading, total))
            .await;
        Ok(local_path)
    }

    async fn upload(
        &self,
        session: &mut TransferSession,
        local_path: &Path,
        status: &StatusMessage,
    ) -> Result<String> {
        let tracker = session.begin_upload(local_path).await?;
        let total = tracker.total_bytes();
        let reporter = PeriodicReporter::spawn(
            tracker.clone(),
            status.clone(),
            TransferVerb::Uploading,
            self.settings.report_interval,
        );

        let result = self
            .bounded(
                self.uploader
                    .upload(local_path, UPLOAD_TARGET_FOLDER, tracker),
            )
            .await;
        reporter.stop().await;
        let url = result?;

        status
            .set(&complete_message(TransferVerb::Uploading, total))
            .await;
        Ok(url)
    }

    /// Apply the configured per-phase timeout to `operation`
    async fn bounded<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.settings.transfer_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .map_err(|_| BridgeError::Timeout(limit))?,
            None => operation.await,
        }
    }
}

/// Single-line failure status for the phase that failed
pub fn failure_message(phase: TransferPhase, err: &BridgeError) -> String {
    let action = match phase {
        TransferPhase::Downloading => "downloading",
        _ => "uploading",
    };
    format!("❌ Error {action} file: {}", err.user_summary())
}
