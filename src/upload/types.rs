//! Upload widget types: media kinds, credentials, CDN descriptors, view model.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::error::UploadError;

pub const MIB: u64 = 1024 * 1024;
pub const MAX_IMAGE_BYTES: u64 = 20 * MIB;
pub const MAX_VIDEO_BYTES: u64 = 50 * MIB;

/// Preview dimensions for uploaded images.
pub const PREVIEW_IMAGE_SIZE: u32 = 500;

// =============================================================================
// MEDIA KIND
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Largest accepted file size, inclusive.
    #[must_use]
    pub fn max_bytes(self) -> u64 {
        match self {
            Self::Image => MAX_IMAGE_BYTES,
            Self::Video => MAX_VIDEO_BYTES,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// # Errors
    ///
    /// Returns [`UploadError::TooLarge`] when `size` exceeds [`Self::max_bytes`].
    pub fn check_size(self, size: u64) -> Result<(), UploadError> {
        let limit = self.max_bytes();
        if size > limit {
            return Err(UploadError::TooLarge { kind: self, size, limit });
        }
        Ok(())
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(format!("unknown media kind '{other}' (expected 'image' or 'video')")),
        }
    }
}

// =============================================================================
// VARIANT
// =============================================================================

/// CSS classes for the widget's button, placeholder, and filename label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetStyles {
    pub button: &'static str,
    pub placeholder: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Dark,
    Light,
}

impl Variant {
    #[must_use]
    pub fn styles(self) -> WidgetStyles {
        match self {
            Self::Dark => WidgetStyles { button: "bg-dark-300", placeholder: "text-light-100", text: "text-light-100" },
            Self::Light => WidgetStyles {
                button: "bg-light-600 border-gray-100 border",
                placeholder: "text-slate-500",
                text: "text-dark-400",
            },
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(format!("unknown variant '{other}' (expected 'dark' or 'light')")),
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Short-lived, single-use upload authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadCredential {
    pub token: String,
    pub expire: i64,
    pub signature: String,
}

/// CDN descriptor of a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub name: String,
    pub file_path: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub file_type: Option<String>,
}

// =============================================================================
// SELECTED FILE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Memory(Bytes),
    Disk(PathBuf),
}

/// A file the user picked. Size is known up front; content is read at upload time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub source: FileSource,
}

impl SelectedFile {
    #[must_use]
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self { name: name.into(), size: data.len() as u64, source: FileSource::Memory(data) }
    }

    /// Stat a file on disk without reading it.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the path cannot be stat'ed or is not a file.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"));
        }
        let name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
        Ok(Self { name, size: metadata.len(), source: FileSource::Disk(path.to_path_buf()) })
    }

    /// # Errors
    ///
    /// Returns the I/O error if a disk-backed file cannot be read.
    pub async fn read(&self) -> std::io::Result<Bytes> {
        match &self.source {
            FileSource::Memory(data) => Ok(data.clone()),
            FileSource::Disk(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

// =============================================================================
// PROGRESS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub loaded: u64,
    pub total: u64,
}

impl Progress {
    /// `round(loaded / total * 100)`, clamped to 100. An empty transfer is complete.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn percent(self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = (self.loaded as f64 / self.total as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

/// User-visible, dismissable notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

// =============================================================================
// PREVIEW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Image { src: String, alt: String, width: u32, height: u32 },
    Video { src: String, controls: bool },
}

/// Delivery URL for a stored path under the CDN endpoint.
#[must_use]
pub fn media_url(url_endpoint: &str, path: &str) -> String {
    format!("{}/{}", url_endpoint.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
