//! Upload errors. Every variant is user-visible and non-fatal.

use super::types::{MIB, MediaKind};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Rejected before any network call.
    #[error("{kind} is {size} bytes; the limit is {}MB", .limit / MIB)]
    TooLarge { kind: MediaKind, size: u64, limit: u64 },

    /// The credential endpoint failed or returned a malformed body.
    #[error("Authentication Request Failed!: {0}")]
    Authentication(String),

    /// The CDN answered with a non-success status.
    #[error("upload rejected: status {status}: {message}")]
    Cdn { status: u16, message: String },

    /// The CDN request could not be sent or its response not read.
    #[error("upload request failed: {0}")]
    Request(String),

    /// The CDN success body did not describe a stored file.
    #[error("unexpected upload response: {0}")]
    Parse(String),

    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
}
