//! Client-side media upload: size validation, credential fetch, direct CDN
//! upload with progress, and the widget view model that ties them together.

pub mod authenticator;
pub mod cdn;
pub mod error;
pub mod types;
pub mod widget;

#[cfg(test)]
mod test_support;

pub use authenticator::{Authenticator, HttpAuthenticator};
pub use cdn::{ImageKitCdn, MediaCdn, ProgressFn, UploadRequest};
pub use error::UploadError;
pub use types::{
    MediaKind, Preview, Progress, SelectedFile, Toast, ToastVariant, UploadCredential, UploadedFile, Variant,
    WidgetStyles,
};
pub use widget::{Notifier, TracingNotifier, UploadWidget, WidgetProps};
