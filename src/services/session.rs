//! Session normalization: verified token claims -> session object.
//!
//! DESIGN
//! ======
//! Two hooks mirror the identity provider's extension points. `on_jwt` runs
//! whenever a token is issued or refreshed and passes claims through as-is.
//! `on_session` runs when a session is materialized and copies the subject
//! and display name onto the session user. Both are pure.

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::token::SessionToken;

/// User view exposed to handlers and clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Per-request session, built from a verified token and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: SessionUser,
    /// RFC 3339 timestamp at which the session lapses.
    pub expires: String,
}

/// Token issuance/refresh hook. Claims are returned unchanged.
#[must_use]
pub fn on_jwt(token: SessionToken) -> SessionToken {
    token
}

/// Session hook: subject becomes `user.id`, a string `name` becomes `user.name`.
#[must_use]
pub fn on_session(mut session: Session, token: &SessionToken) -> Session {
    if let Some(sub) = token.subject() {
        session.user.id = Some(sub.to_owned());
    }
    if let Some(name) = token.name() {
        session.user.name = Some(name.to_owned());
    }
    session
}

/// Build the default session for `token` and apply [`on_session`].
#[must_use]
pub fn materialize(token: &SessionToken, now: i64, max_age_secs: u64) -> Session {
    let session = Session {
        user: SessionUser {
            id: None,
            name: token.name().map(str::to_owned),
            email: token.email().map(str::to_owned),
            image: token.picture().map(str::to_owned),
        },
        expires: expires_at(now, max_age_secs),
    };
    on_session(session, token)
}

fn expires_at(now: i64, max_age_secs: u64) -> String {
    let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
    OffsetDateTime::from_unix_timestamp(now.saturating_add(max_age))
        .ok()
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
