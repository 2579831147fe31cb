//! Process-wide configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Loaded once at startup and handed to constructors as an explicit
//! `Arc<AppConfig>`. Nothing else in the crate reads the environment.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;
pub const DEFAULT_IMAGEKIT_UPLOAD_URL: &str = "https://upload.imagekit.io/api/v1/files/upload";
pub const DEFAULT_SITE_DIR: &str = "./site";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Media CDN settings shared by the credential endpoint and the upload widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageKitConfig {
    pub public_key: String,
    /// Only the backend needs this; the widget never sees it.
    pub private_key: Option<String>,
    pub url_endpoint: String,
    pub upload_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub auth_secret: String,
    pub session_max_age_secs: u64,
    pub cookie_secure: bool,
    /// Base URL of the backend serving `/api/auth/imagekit`.
    pub api_endpoint: String,
    pub site_dir: String,
    pub imagekit: ImageKitConfig,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `AUTH_SECRET` (or `NEXTAUTH_SECRET`)
    /// - `IMAGEKIT_PUBLIC_KEY`, `IMAGEKIT_URL_ENDPOINT`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `SESSION_MAX_AGE_SECS`: default 30 days
    /// - `COOKIE_SECURE`: default false
    /// - `API_ENDPOINT`: default `http://127.0.0.1:$PORT`
    /// - `SITE_DIR`: default `./site`
    /// - `IMAGEKIT_PRIVATE_KEY`: enables the credential endpoint
    /// - `IMAGEKIT_UPLOAD_URL`: default ImageKit upload API
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing or malformed variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env_parse("PORT", DEFAULT_PORT)?;
        let auth_secret = non_empty("AUTH_SECRET")
            .or_else(|| non_empty("NEXTAUTH_SECRET"))
            .ok_or(ConfigError::Missing("AUTH_SECRET"))?;
        let session_max_age_secs = env_parse("SESSION_MAX_AGE_SECS", DEFAULT_SESSION_MAX_AGE_SECS)?;
        let cookie_secure = match std::env::var("COOKIE_SECURE") {
            Ok(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "COOKIE_SECURE", value: raw })?,
            Err(_) => false,
        };
        let api_endpoint = non_empty("API_ENDPOINT")
            .unwrap_or_else(|| format!("http://127.0.0.1:{port}"))
            .trim_end_matches('/')
            .to_string();
        let site_dir = non_empty("SITE_DIR").unwrap_or_else(|| DEFAULT_SITE_DIR.to_string());

        let imagekit = ImageKitConfig {
            public_key: non_empty("IMAGEKIT_PUBLIC_KEY").ok_or(ConfigError::Missing("IMAGEKIT_PUBLIC_KEY"))?,
            private_key: non_empty("IMAGEKIT_PRIVATE_KEY"),
            url_endpoint: non_empty("IMAGEKIT_URL_ENDPOINT")
                .ok_or(ConfigError::Missing("IMAGEKIT_URL_ENDPOINT"))?
                .trim_end_matches('/')
                .to_string(),
            upload_url: non_empty("IMAGEKIT_UPLOAD_URL").unwrap_or_else(|| DEFAULT_IMAGEKIT_UPLOAD_URL.to_string()),
        };

        Ok(Self { port, auth_secret, session_max_age_secs, cookie_secure, api_endpoint, site_dir, imagekit })
    }

    /// URL the upload widget calls for fresh credentials.
    #[must_use]
    pub fn credential_url(&self) -> String {
        format!("{}/api/auth/imagekit", self.api_endpoint)
    }
}

/// Parse a permissive boolean (`1/true/yes/on`, `0/false/no/off`).
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
