//! Transfer progress tracking

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Direction of a tracked transfer, used as the verb in status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferVerb {
    Downloading,
    Uploading,
}

impl TransferVerb {
    fn completed(self) -> &'static str {
        match self {
            Self::Downloading => "Download",
            Self::Uploading => "Upload",
        }
    }
}

impl fmt::Display for TransferVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloading => write!(f, "Downloading"),
            Self::Uploading => write!(f, "Uploading"),
        }
    }
}

/// Byte counter shared between one transfer and its reporter.
///
/// Clones share the same counter. Updates are monotonic and clamped to the
/// total when the total is known.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total_bytes: u64,
    transferred_bytes: Arc<AtomicU64>,
}

impl ProgressTracker {
    /// Create a tracker at 0 bytes; `total_bytes` of 0 means unknown
    pub fn new(total_bytes: u64) -> Self {
        Self {
            total_bytes,
            transferred_bytes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record the number of bytes transferred so far
    pub fn update(&self, bytes_so_far: u64) {
        let bytes = if self.total_bytes > 0 {
            bytes_so_far.min(self.total_bytes)
        } else {
            bytes_so_far
        };
        self.transferred_bytes.fetch_max(bytes, Ordering::Relaxed);
    }

    pub fn read(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Whether a known total has been reached
    pub fn is_complete(&self) -> bool {
        self.total_bytes > 0 && self.read() >= self.total_bytes
    }
}

pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Percentage done, `None` when the total is unknown
pub fn percentage(bytes: u64, total_bytes: u64) -> Option<f64> {
    (total_bytes > 0).then(|| bytes as f64 / total_bytes as f64 * 100.0)
}

/// Periodic status line, e.g. `Downloading: 2.00 MB (20.0%)`
pub fn progress_message(verb: TransferVerb, bytes: u64, total_bytes: u64) -> String {
    match percentage(bytes, total_bytes) {
        Some(pct) => format!("{verb}: {:.2} MB ({pct:.1}%)", megabytes(bytes)),
        None => format!("{verb}: {:.2} MB", megabytes(bytes)),
    }
}

/// Final status line, e.g. `Download complete: 10.00 MB (100%)`
pub fn complete_message(verb: TransferVerb, total_bytes: u64) -> String {
    format!(
        "{} complete: {:.2} MB (100%)",
        verb.completed(),
        megabytes(total_bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_tracker_starts_at_zero() {
        let tracker = ProgressTracker::new(10 * MIB);
        assert_eq!(tracker.read(), 0);
        assert_eq!(percentage(tracker.read(), tracker.total_bytes()), Some(0.0));
        assert!(!tracker.is_complete());
    }

    #[test]
    fn test_tracker_is_monotonic() {
        let tracker = ProgressTracker::new(100);
        tracker.update(40);
        tracker.update(20);
        assert_eq!(tracker.read(), 40);
    }

    #[test]
    fn test_tracker_clamps_to_total() {
        let tracker = ProgressTracker::new(100);
        tracker.update(150);
        assert_eq!(tracker.read(), 100);
        assert!(tracker.is_complete());
    }

    #[test]
    fn test_clones_share_counter() {
        let tracker = ProgressTracker::new(100);
        let writer = tracker.clone();
        writer.update(75);
        assert_eq!(tracker.read(), 75);
    }

    #[test]
    fn test_unknown_total_never_completes() {
        let tracker = ProgressTracker::new(0);
        tracker.update(5 * MIB);
        assert_eq!(tracker.read(), 5 * MIB);
        assert_eq!(percentage(tracker.read(), tracker.total_bytes()), None);
        assert!(!tracker.is_complete());
    }

    #[test]
    fn test_progress_message_with_total() {
        let total = 10 * MIB;
        assert_eq!(
            progress_message(TransferVerb::Downloading, 0, total),
            "Downloading: 0.00 MB (0.0%)"
        );
        assert_eq!(
            progress_message(TransferVerb::Downloading, 2 * MIB, total),
            "Downloading: 2.00 MB (20.0%)"
        );
        assert_eq!(
            progress_message(TransferVerb::Uploading, 3_500_000, total),
            "Uploading: 3.34 MB (33.4%)"
        );
    }

    #[test]
    fn test_progress_message_rounding() {
        // 1/3 of the total
        assert_eq!(
            progress_message(TransferVerb::Uploading, MIB, 3 * MIB),
            "Uploading: 1.00 MB (33.3%)"
        );
        // 2/3 of the total
        assert_eq!(
            progress_message(TransferVerb::Uploading, 2 * MIB, 3 * MIB),
            "Uploading: 2.00 MB (66.7%)"
        );
    }

    #[test]
    fn test_progress_message_unknown_total() {
        assert_eq!(
            progress_message(TransferVerb::Downloading, 1_572_864, 0),
            "Downloading: 1.50 MB"
        );
    }

    #[test]
    fn test_complete_message() {
        assert_eq!(
            complete_message(TransferVerb::Downloading, 10 * MIB),
            "Download complete: 10.00 MB (100%)"
        );
        assert_eq!(
            complete_message(TransferVerb::Uploading, 512 * 1024),
            "Upload complete: 0.50 MB (100%)"
        );
    }
}
