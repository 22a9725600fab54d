//! Per-file transfer session state

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tempfile::TempDir;

use crate::error::Result;
use crate::transfer::progress::ProgressTracker;

/// Lifecycle phase of a transfer session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Downloading,
    Uploading,
    Complete,
    Failed,
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferPhase::Downloading => write!(f, "downloading"),
            TransferPhase::Uploading => write!(f, "uploading"),
            TransferPhase::Complete => write!(f, "complete"),
            TransferPhase::Failed => write!(f, "failed"),
        }
    }
}

/// One file's journey from inbound message to uploaded artifact.
///
/// Owns the scratch directory exclusively; [`TransferSession::close`]
/// consumes the session, so the directory is released exactly once.
pub struct TransferSession {
    id: String,
    phase: TransferPhase,
    progress: ProgressTracker,
    scratch: TempDir,
    started_at: DateTime<Utc>,
}

impl TransferSession {
    /// Start a session, creating its scratch directory under `scratch_root`
    /// (or the system temp directory)
    pub fn start(id: impl Into<String>, declared_size: u64, scratch_root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("drive-relay-");
        let scratch = match scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let session = Self {
            id: id.into(),
            phase: TransferPhase::Downloading,
            progress: ProgressTracker::new(declared_size),
            scratch,
            started_at: Utc::now(),
        };
        info!(
            "Session {} started, scratch at {}",
            session.id,
            session.scratch.path().display()
        );
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Tracker of the phase currently in flight
    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Move to the upload phase with a fresh tracker sized to `local_path`.
    ///
    /// The phase switches before the file is sized, so a failure here is an
    /// upload failure.
    pub async fn begin_upload(&mut self, local_path: &Path) -> Result<ProgressTracker> {
        self.phase = TransferPhase::Uploading;
        let total_bytes = tokio::fs::metadata(local_path).await?.len();
        self.progress = ProgressTracker::new(total_bytes);
        Ok(self.progress.clone())
    }

    pub fn complete(&mut self) {
        self.phase = TransferPhase::Complete;
    }

    pub fn fail(&mut self) {
        self.phase = TransferPhase::Failed;
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }

    /// Release the scratch directory and return the final phase
    pub fn close(self) -> TransferPhase {
        let elapsed_ms = self.elapsed().num_milliseconds();
        let path = self.scratch.path().to_path_buf();
        match self.scratch.close() {
            Ok(()) => info!(
                "Session {} {} after {}ms, released {}",
                self.id,
                self.phase,
                elapsed_ms,
                path.display()
            ),
            Err(e) => warn!(
                "Session {} {} after {}ms, failed to remove {}: {}",
                self.id,
                self.phase,
                elapsed_ms,
                path.display(),
                e
            ),
        }
        self.phase
    }
}
