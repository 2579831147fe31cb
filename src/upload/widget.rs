//! Headless upload widget.
//!
//! ARCHITECTURE
//! ============
//! The widget owns the client-side flow: validate -> fresh credential ->
//! direct CDN upload -> callback. It renders nothing itself. Front ends read
//! the view model (`progress_bar`, `file_label`, `preview`, `styles`) and
//! receive notifications through a [`Notifier`].
//!
//! `select` takes `&mut self`, so a widget never has two uploads in flight.
//! Progress lives on a `watch` channel so observers can follow a running
//! upload without borrowing the widget.

use std::sync::Arc;

use tokio::sync::watch;

use super::authenticator::Authenticator;
use super::cdn::{MediaCdn, ProgressFn, UploadRequest};
use super::error::UploadError;
use super::types::{
    MIB, MediaKind, PREVIEW_IMAGE_SIZE, Preview, Progress, SelectedFile, Toast, ToastVariant, UploadedFile,
    Variant, WidgetStyles, media_url,
};

/// Receives user-visible notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Default => tracing::info!(title = %toast.title, description = %toast.description, "notification"),
            ToastVariant::Destructive => {
                tracing::warn!(title = %toast.title, description = %toast.description, "notification");
            }
        }
    }
}

/// Host-supplied widget inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetProps {
    pub kind: MediaKind,
    /// Picker filter such as `image/*`.
    pub accept: String,
    pub placeholder: String,
    pub folder: String,
    pub variant: Variant,
}

pub type FileChangeFn = Box<dyn FnMut(&str) + Send>;

pub struct UploadWidget {
    props: WidgetProps,
    url_endpoint: String,
    authenticator: Arc<dyn Authenticator>,
    cdn: Arc<dyn MediaCdn>,
    notifier: Arc<dyn Notifier>,
    on_file_change: FileChangeFn,
    file: Option<UploadedFile>,
    progress: Arc<watch::Sender<u8>>,
}

impl UploadWidget {
    #[must_use]
    pub fn new(
        props: WidgetProps,
        url_endpoint: impl Into<String>,
        authenticator: Arc<dyn Authenticator>,
        cdn: Arc<dyn MediaCdn>,
        notifier: Arc<dyn Notifier>,
        on_file_change: impl FnMut(&str) + Send + 'static,
    ) -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            props,
            url_endpoint: url_endpoint.into(),
            authenticator,
            cdn,
            notifier,
            on_file_change: Box::new(on_file_change),
            file: None,
            progress: Arc::new(progress),
        }
    }

    // =========================================================================
    // VIEW MODEL
    // =========================================================================

    #[must_use]
    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    #[must_use]
    pub fn styles(&self) -> WidgetStyles {
        self.props.variant.styles()
    }

    #[must_use]
    pub fn progress(&self) -> u8 {
        *self.progress.borrow()
    }

    #[must_use]
    pub fn subscribe_progress(&self) -> watch::Receiver<u8> {
        self.progress.subscribe()
    }

    /// Percentage to draw, only while a transfer is under way.
    #[must_use]
    pub fn progress_bar(&self) -> Option<u8> {
        let pct = self.progress();
        (pct > 0 && pct < 100).then_some(pct)
    }

    #[must_use]
    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    /// Last path segment of the stored file.
    #[must_use]
    pub fn file_label(&self) -> Option<&str> {
        let path = &self.file.as_ref()?.file_path;
        path.rsplit('/').next()
    }

    #[must_use]
    pub fn preview(&self) -> Option<Preview> {
        let path = &self.file.as_ref()?.file_path;
        let src = media_url(&self.url_endpoint, path);
        Some(match self.props.kind {
            MediaKind::Image => {
                Preview::Image { src, alt: path.clone(), width: PREVIEW_IMAGE_SIZE, height: PREVIEW_IMAGE_SIZE }
            }
            MediaKind::Video => Preview::Video { src, controls: true },
        })
    }

    // =========================================================================
    // FLOW
    // =========================================================================

    /// Size check against the kind's ceiling; warns the user on failure.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::TooLarge`] when the file exceeds the ceiling.
    pub fn validate(&self, file: &SelectedFile) -> Result<(), UploadError> {
        self.props.kind.check_size(file.size).inspect_err(|_| {
            self.notifier.notify(Toast {
                title: "File size too Large".into(),
                description: format!("Please upload a file less than {}MB Size", self.props.kind.max_bytes() / MIB),
                variant: ToastVariant::Destructive,
            });
        })
    }

    /// Run the whole flow for a newly selected file.
    ///
    /// On success the stored descriptor is replaced and the host callback
    /// runs once with the stored path. On failure the previous descriptor is
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns the [`UploadError`] from validation, credential fetch, or the CDN.
    pub async fn select(&mut self, file: SelectedFile) -> Result<UploadedFile, UploadError> {
        self.validate(&file)?;
        self.progress.send_replace(0);

        match self.upload(file).await {
            Ok(uploaded) => {
                self.on_success(uploaded.clone());
                Ok(uploaded)
            }
            Err(e) => {
                self.on_error(&e);
                Err(e)
            }
        }
    }

    async fn upload(&self, file: SelectedFile) -> Result<UploadedFile, UploadError> {
        let credential = self.authenticator.authenticate().await?;
        let request = UploadRequest { file, folder: self.props.folder.clone(), use_unique_file_name: true, credential };

        let progress = Arc::clone(&self.progress);
        let on_progress: ProgressFn = Arc::new(move |p: Progress| {
            progress.send_replace(p.percent());
        });
        self.cdn.upload(request, on_progress).await
    }

    fn on_success(&mut self, uploaded: UploadedFile) {
        let path = uploaded.file_path.clone();
        self.file = Some(uploaded);
        (self.on_file_change)(&path);

        self.notifier.notify(Toast {
            title: format!("{} Uploaded successfully", self.props.kind),
            description: format!("{path} uploaded successfully!"),
            variant: ToastVariant::Default,
        });
    }

    fn on_error(&self, error: &UploadError) {
        tracing::error!(kind = %self.props.kind, error = %error, "upload failed");

        self.notifier.notify(Toast {
            title: format!("{} Uploaded Failed", self.props.kind),
            description: format!("Your {} could not be uploaded. Please try again", self.props.kind),
            variant: ToastVariant::Destructive,
        });
    }
}

#[cfg(test)]
#[path = "widget_test.rs"]
mod tests;
