//! Session token verification, issuance, and request lookup.
//!
//! ARCHITECTURE
//! ============
//! Session tokens are HS256 JWTs signed with `AUTH_SECRET`. The claim set is
//! kept as an open JSON map so claims this crate does not know about survive
//! a verify/issue round trip untouched.
//!
//! TRADE-OFFS
//! ==========
//! Verification failures collapse into a small error enum. Callers on the
//! request path (the route gate) treat every variant as "no token".

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::CookieJar;
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::Sha256;

use super::session;

/// Cookie names searched for a session token, most specific first.
pub const SESSION_COOKIE_NAMES: [&str; 4] = [
    "__Secure-authjs.session-token",
    "authjs.session-token",
    "__Secure-next-auth.session-token",
    "next-auth.session-token",
];

/// Cookie name this server writes when it rolls a session.
#[must_use]
pub fn session_cookie_name(secure: bool) -> &'static str {
    if secure { SESSION_COOKIE_NAMES[0] } else { SESSION_COOKIE_NAMES[1] }
}

#[must_use]
pub fn unix_now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed session token: {0}")]
    Malformed(String),
    #[error("session token expired")]
    Expired,
    #[error("session token signing failed: {0}")]
    Signing(String),
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

// =============================================================================
// CLAIMS
// =============================================================================

/// Verified claim set of a session token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken {
    claims: Map<String, Value>,
}

impl SessionToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.claims.get(key)
    }

    #[must_use]
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// `sub`, when it is a non-empty string.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.str_claim("sub").filter(|s| !s.is_empty())
    }

    /// `name`, when it is a string. Empty names are kept.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.str_claim("name")
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.str_claim("email")
    }

    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.str_claim("picture")
    }

    /// `exp` as unix seconds, `None` when absent. Fractional values are truncated.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`] when `exp` is present but not a number.
    #[allow(clippy::cast_possible_truncation)]
    pub fn expires_at(&self) -> Result<Option<i64>, TokenError> {
        let Some(exp) = self.claims.get("exp") else {
            return Ok(None);
        };
        exp.as_i64()
            .or_else(|| exp.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| TokenError::Malformed(format!("exp is not a number: {exp}")))
    }

    /// Pass the claims through the issuance hook and stamp fresh `iat`/`exp`.
    #[must_use]
    pub fn refreshed(self, now: i64, max_age_secs: u64) -> Self {
        let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
        session::on_jwt(self)
            .with_claim("iat", now)
            .with_claim("exp", now.saturating_add(max_age))
    }

    fn str_claim(&self, key: &str) -> Option<&str> {
        self.claims.get(key).and_then(Value::as_str)
    }
}

// =============================================================================
// KEYS
// =============================================================================

/// HS256 key material for verifying and signing session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    key: Hmac<Sha256>,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

impl TokenKeys {
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] if the HMAC key cannot be built.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        let key = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Check signature and expiry of a raw token.
    ///
    /// # Errors
    ///
    /// [`TokenError::Malformed`] for bad encoding, signature, algorithm, or a
    /// non-numeric `exp`;
    /// [`TokenError::Expired`] when `exp <= now`.
    pub fn verify(&self, raw: &str, now: i64) -> Result<SessionToken, TokenError> {
        let token = VerifyWithKey::<SessionToken>::verify_with_key(raw, &self.key)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        if let Some(exp) = token.expires_at()? {
            if exp <= now {
                return Err(TokenError::Expired);
            }
        }

        Ok(token)
    }

    /// Sign a claim set after running it through the issuance hook.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if serialization or signing fails.
    pub fn issue(&self, token: SessionToken) -> Result<String, TokenError> {
        session::on_jwt(token)
            .sign_with_key(&self.key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

// =============================================================================
// REQUEST LOOKUP
// =============================================================================

/// Find the raw session token on a request: cookies first, then a bearer header.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    SESSION_COOKIE_NAMES
        .iter()
        .find_map(|name| cookie_token(&jar, name))
        .or_else(|| bearer_token(headers).map(str::to_owned))
}

/// Whole cookie, or its `<name>.0`, `<name>.1`, ... chunks joined in index order.
/// A chunk set with a missing index yields nothing.
fn cookie_token(jar: &CookieJar, name: &str) -> Option<String> {
    if let Some(cookie) = jar.get(name) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_owned());
        }
    }

    let prefix = format!("{name}.");
    let mut chunks: Vec<(usize, &str)> = jar
        .iter()
        .filter_map(|cookie| {
            let index = cookie.name().strip_prefix(&prefix)?.parse::<usize>().ok()?;
            Some((index, cookie.value()))
        })
        .collect();
    if chunks.is_empty() {
        return None;
    }

    chunks.sort_by_key(|(index, _)| *index);
    if chunks.iter().enumerate().any(|(expected, (index, _))| *index != expected) {
        tracing::debug!(cookie = name, "session cookie chunks are not contiguous");
        return None;
    }
    Some(chunks.into_iter().map(|(_, value)| value).collect())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
