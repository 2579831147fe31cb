//! Upload credential issuance for the media CDN.
//!
//! The CDN accepts a client-side upload when it carries a `token`, an
//! `expire` unix timestamp, and `signature = hex(HMAC-SHA1(private_key,
//! token ++ expire))`. Only the backend holds the private key.

use std::fmt::Write;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use uuid::Uuid;

use crate::upload::UploadCredential;

/// Credential lifetime in seconds.
pub const CREDENTIAL_TTL_SECS: i64 = 30 * 60;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

#[derive(Debug, thiserror::Error)]
#[error("invalid upload signing key")]
pub struct SigningError;

/// Signature over `token ++ expire` with the CDN private key.
///
/// # Errors
///
/// Returns [`SigningError`] if the key is rejected by the HMAC.
pub fn sign(private_key: &str, token: &str, expire: i64) -> Result<String, SigningError> {
    let mut mac = Hmac::<Sha1>::new_from_slice(private_key.as_bytes()).map_err(|_| SigningError)?;
    mac.update(token.as_bytes());
    mac.update(expire.to_string().as_bytes());
    Ok(bytes_to_hex(&mac.finalize().into_bytes()))
}

/// Fresh single-use credential valid for [`CREDENTIAL_TTL_SECS`] from `now`.
///
/// # Errors
///
/// Returns [`SigningError`] if the key is rejected by the HMAC.
pub fn authentication_parameters(private_key: &str, now: i64) -> Result<UploadCredential, SigningError> {
    let token = Uuid::new_v4().to_string();
    let expire = now + CREDENTIAL_TTL_SECS;
    let signature = sign(private_key, &token, expire)?;
    Ok(UploadCredential { token, expire, signature })
}

#[cfg(test)]
#[path = "imagekit_test.rs"]
mod tests;
