//! File transfer module for the drive relay bot

pub mod pipeline;
pub mod progress;
pub mod reporter;
pub mod session;
pub mod upload;

// Re-export main types
pub use pipeline::{PipelineSettings, TransferOutcome, TransferPipeline};
pub use upload::HttpUploader;
