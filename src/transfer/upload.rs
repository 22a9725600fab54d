//! Upload API client

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, error, info};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::error::{BridgeError, Result};
use crate::transfer::progress::ProgressTracker;

/// Folder every upload is placed in
pub const UPLOAD_TARGET_FOLDER: &str = "/";

const UPLOAD_PATH: &str = "/api/upload-file";

/// Uploads a finished download to remote storage
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Upload `path` into `target_folder`, recording file bytes sent in
    /// `progress`, and return the stored file's URL (empty if none given)
    async fn upload(
        &self,
        path: &Path,
        target_folder: &str,
        progress: ProgressTracker,
    ) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    url: Option<String>,
}

/// Streams files to `POST {server}/api/upload-file` as multipart form data
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
    endpoint: String,
}

impl HttpUploader {
    pub fn new(server_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}{}", server_url.trim_end_matches('/'), UPLOAD_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(
        &self,
        path: &Path,
        target_folder: &str,
        progress: ProgressTracker,
    ) -> Result<String> {
        let file = tokio::fs::File::open(path).await?;
        let file_size = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        info!(
            "Uploading '{}' ({} bytes) to {}",
            file_name, file_size, self.endpoint
        );

        // Count bytes as the body is pulled by the HTTP client
        let mut sent = 0u64;
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                progress.update(sent);
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), file_size)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part("file", part)
            .text("targetFolder", target_folder.to_string());

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Upload rejected with HTTP {status}: {body}");
            return Err(BridgeError::UploadRejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| BridgeError::InvalidResponse(format!("{e}: {body}")))?;
        let url = parsed.url.unwrap_or_default();
        debug!("Upload API answered with url '{url}'");
        Ok(url)
    }
}
