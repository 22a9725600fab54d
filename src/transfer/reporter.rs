//! Periodic progress reporting

use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::chat::StatusMessage;
use crate::transfer::progress::{ProgressTracker, TransferVerb, progress_message};

/// Background task that edits the status message on a fixed interval.
///
/// The task stops on its own once the tracker reaches a known total, or when
/// [`PeriodicReporter::stop`] is called. `stop` joins the task, so once it
/// returns no further progress edit can land.
pub struct PeriodicReporter {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicReporter {
    /// Spawn a reporter for `tracker`
    pub fn spawn(
        tracker: ProgressTracker,
        status: StatusMessage,
        verb: TransferVerb,
        interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                if token.is_cancelled() || tracker.is_complete() {
                    break;
                }

                let text = progress_message(verb, tracker.read(), tracker.total_bytes());
                status.set(&text).await;

                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            debug!("{verb} reporter finished at {} bytes", tracker.read());
        });

        Self { cancel, handle }
    }

    /// Cancel the reporter and wait for it to exit
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!("Progress reporter task ended abnormally: {e}");
        }
    }
}
