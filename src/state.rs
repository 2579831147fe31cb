//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers and the route gate via the
//! `State` extractor. It carries the startup configuration and the session
//! token keys. There is no per-request or cross-request mutable state.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::token::{TokenError, TokenKeys};

/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenKeys,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if `auth_secret` cannot be used as an HMAC key.
    pub fn new(config: Arc<AppConfig>) -> Result<Self, TokenError> {
        let tokens = TokenKeys::new(&config.auth_secret)?;
        Ok(Self { config, tokens })
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
