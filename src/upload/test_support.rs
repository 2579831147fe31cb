//! Shared helpers for upload tests: a throwaway HTTP server and trait mocks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use axum::Router;
use tokio::sync::watch;

use super::authenticator::Authenticator;
use super::cdn::{MediaCdn, ProgressFn, UploadRequest};
use super::error::UploadError;
use super::types::{Progress, Toast, UploadCredential, UploadedFile};
use super::widget::Notifier;

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

pub fn credential() -> UploadCredential {
    UploadCredential { token: "tok-1".into(), expire: 1_700_001_800, signature: "sig-1".into() }
}

pub fn uploaded(path: &str) -> UploadedFile {
    UploadedFile {
        file_id: "file-1".into(),
        name: path.rsplit('/').next().unwrap_or(path).into(),
        file_path: path.into(),
        url: format!("https://ik.imagekit.io/test{path}"),
        thumbnail_url: None,
        size: Some(4),
        file_type: Some("image".into()),
    }
}

// =============================================================================
// MOCKS
// =============================================================================

pub struct MockAuthenticator {
    pub calls: AtomicUsize,
    fail_with: Option<String>,
}

impl MockAuthenticator {
    pub fn ok() -> Self {
        Self { calls: AtomicUsize::new(0), fail_with: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self { calls: AtomicUsize::new(0), fail_with: Some(reason.into()) }
    }
}

#[async_trait::async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self) -> Result<UploadCredential, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(reason) => Err(UploadError::Authentication(reason.clone())),
            None => Ok(credential()),
        }
    }
}

/// Scripted CDN. Reports half the file, then either the rest and the
/// scripted success, or the scripted error with the transfer left halfway.
pub struct MockCdn {
    pub requests: Mutex<Vec<UploadRequest>>,
    responses: Mutex<Vec<Result<UploadedFile, UploadError>>>,
    progress: Mutex<Option<watch::Receiver<u8>>>,
    progress_at_start: Mutex<Vec<u8>>,
}

impl MockCdn {
    pub fn new(responses: Vec<Result<UploadedFile, UploadError>>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses),
            progress: Mutex::new(None),
            progress_at_start: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("mock mutex should lock").len()
    }

    /// Sample `progress` each time an upload starts.
    pub fn observe_progress(&self, progress: watch::Receiver<u8>) {
        *self.progress.lock().expect("mock mutex should lock") = Some(progress);
    }

    pub fn progress_at_start(&self) -> Vec<u8> {
        self.progress_at_start.lock().expect("mock mutex should lock").clone()
    }
}

#[async_trait::async_trait]
impl MediaCdn for MockCdn {
    async fn upload(&self, request: UploadRequest, on_progress: ProgressFn) -> Result<UploadedFile, UploadError> {
        if let Some(progress) = self.progress.lock().expect("mock mutex should lock").as_ref() {
            self.progress_at_start.lock().expect("mock mutex should lock").push(*progress.borrow());
        }

        let total = request.file.size;
        on_progress(Progress { loaded: total / 2, total });
        self.requests.lock().expect("mock mutex should lock").push(request);

        let response = {
            let mut responses = self.responses.lock().expect("mock mutex should lock");
            if responses.is_empty() { Ok(uploaded("/uploads/default.png")) } else { responses.remove(0) }
        };
        if response.is_ok() {
            on_progress(Progress { loaded: total, total });
        }
        response
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().expect("mock mutex should lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().expect("mock mutex should lock").push(toast);
    }
}
