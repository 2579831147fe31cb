//! Credential acquisition for uploads.
//!
//! Every upload attempt calls [`Authenticator::authenticate`] once. Nothing is
//! cached: credentials are single-use and time-boxed.

use std::time::Duration;

use super::error::UploadError;
use super::types::UploadCredential;
use crate::config::AppConfig;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Fetch a fresh upload credential.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Authentication`] if the backend cannot supply one.
    async fn authenticate(&self) -> Result<UploadCredential, UploadError>;
}

/// Fetches credentials from the backend's `GET /api/auth/imagekit`.
pub struct HttpAuthenticator {
    http: reqwest::Client,
    url: String,
}

impl HttpAuthenticator {
    /// # Errors
    ///
    /// Returns [`UploadError::Request`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| UploadError::Request(e.to_string()))?;
        Ok(Self { http, url: url.into() })
    }

    /// # Errors
    ///
    /// Returns [`UploadError::Request`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, UploadError> {
        Self::new(config.credential_url())
    }

    async fn fetch(&self) -> Result<UploadCredential, String> {
        let response = self.http.get(&self.url).send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("Request failed with status {} : {body}", status.as_u16()));
        }

        response
            .json::<UploadCredential>()
            .await
            .map_err(|e| e.to_string())
    }
}

#[async_trait::async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(&self) -> Result<UploadCredential, UploadError> {
        self.fetch().await.map_err(|reason| {
            tracing::warn!(url = %self.url, %reason, "upload credential request failed");
            UploadError::Authentication(reason)
        })
    }
}

#[cfg(test)]
#[path = "authenticator_test.rs"]
mod tests;
