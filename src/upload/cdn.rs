//! Direct-to-CDN upload client.
//!
//! DESIGN
//! ======
//! The file is sent as a multipart form whose `file` part is a chunked
//! stream. Each chunk handed to the HTTP client advances `loaded`, which is
//! what drives progress reporting. Total is the file size, known up front.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};

use super::error::UploadError;
use super::types::{Progress, SelectedFile, UploadCredential, UploadedFile};
use crate::config::ImageKitConfig;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const CHUNK_SIZE: usize = 64 * 1024;

/// Progress observer; called from inside the transfer.
pub type ProgressFn = Arc<dyn Fn(Progress) + Send + Sync>;

/// One upload attempt.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: SelectedFile,
    pub folder: String,
    pub use_unique_file_name: bool,
    pub credential: UploadCredential,
}

#[async_trait::async_trait]
pub trait MediaCdn: Send + Sync {
    /// Upload `request.file`, reporting progress through `on_progress`.
    ///
    /// # Errors
    ///
    /// Returns an [`UploadError`] if the file cannot be read, the request
    /// fails, or the CDN rejects the upload.
    async fn upload(&self, request: UploadRequest, on_progress: ProgressFn) -> Result<UploadedFile, UploadError>;
}

// =============================================================================
// IMAGEKIT
// =============================================================================

pub struct ImageKitCdn {
    http: reqwest::Client,
    public_key: String,
    upload_url: String,
}

impl ImageKitCdn {
    /// # Errors
    ///
    /// Returns [`UploadError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &ImageKitConfig) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| UploadError::Request(e.to_string()))?;
        Ok(Self { http, public_key: config.public_key.clone(), upload_url: config.upload_url.clone() })
    }

    fn form(&self, request: &UploadRequest, data: Bytes, on_progress: ProgressFn) -> Form {
        let total = data.len() as u64;
        let part = Part::stream_with_length(progress_body(data, on_progress), total).file_name(request.file.name.clone());

        Form::new()
            .part("file", part)
            .text("fileName", request.file.name.clone())
            .text("publicKey", self.public_key.clone())
            .text("signature", request.credential.signature.clone())
            .text("expire", request.credential.expire.to_string())
            .text("token", request.credential.token.clone())
            .text("useUniqueFileName", request.use_unique_file_name.to_string())
            .text("folder", request.folder.clone())
    }
}

#[async_trait::async_trait]
impl MediaCdn for ImageKitCdn {
    async fn upload(&self, request: UploadRequest, on_progress: ProgressFn) -> Result<UploadedFile, UploadError> {
        let data = request.file.read().await?;
        tracing::debug!(file = %request.file.name, size = data.len(), folder = %request.folder, "uploading to CDN");

        let response = self
            .http
            .post(&self.upload_url)
            .multipart(self.form(&request, data, on_progress))
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(UploadError::Cdn { status, message: error_message(&text) });
        }

        parse_upload_response(&text)
    }
}

/// Split `data` into a chunk stream that reports cumulative progress.
fn progress_body(data: Bytes, on_progress: ProgressFn) -> reqwest::Body {
    let total = data.len() as u64;
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(CHUNK_SIZE)
        .map(|start| data.slice(start..data.len().min(start + CHUNK_SIZE)))
        .collect();

    let mut loaded = 0_u64;
    let stream = futures::stream::iter(chunks).map(move |chunk| {
        loaded += chunk.len() as u64;
        on_progress(Progress { loaded, total });
        Ok::<Bytes, std::io::Error>(chunk)
    });
    reqwest::Body::wrap_stream(stream)
}

fn parse_upload_response(text: &str) -> Result<UploadedFile, UploadError> {
    let uploaded: UploadedFile = serde_json::from_str(text).map_err(|e| UploadError::Parse(e.to_string()))?;
    if uploaded.file_path.trim().is_empty() {
        return Err(UploadError::Parse("response has an empty filePath".into()));
    }
    Ok(uploaded)
}

/// The CDN's `message` field when the body is JSON, else the raw body.
fn error_message(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("message").and_then(serde_json::Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| text.to_owned())
}

#[cfg(test)]
#[path = "cdn_test.rs"]
mod tests;
