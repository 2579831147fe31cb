//! Route gate: redirect-or-continue decision in front of every route.
//!
//! DESIGN
//! ======
//! Only paths in [`GATED_PATHS`] (or beneath them) are inspected; everything
//! else passes straight through without touching the session token. For a
//! gated path the policy is:
//!
//! - no valid token under `/my-profile` -> `/sign-in?callbackUrl=<path>`
//! - valid token on `/sign-in` or `/sign-up` -> `/`
//! - anything else -> continue
//!
//! A token that fails verification for any reason counts as no token.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::services::token::{self, SessionToken};
use crate::state::AppState;

pub const PROFILE_PATH: &str = "/my-profile";
pub const SIGN_IN_PATH: &str = "/sign-in";
pub const SIGN_UP_PATH: &str = "/sign-up";
pub const HOME_PATH: &str = "/";

/// Path prefixes the gate applies to.
pub const GATED_PATHS: [&str; 3] = [PROFILE_PATH, SIGN_IN_PATH, SIGN_UP_PATH];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Bounce to sign-in, remembering where the user was headed.
    RedirectToSignIn { callback_url: String },
    RedirectToHome,
    Continue,
}

impl GateDecision {
    /// Redirect target, or `None` for [`GateDecision::Continue`].
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::RedirectToSignIn { callback_url } => Some(sign_in_location(callback_url)),
            Self::RedirectToHome => Some(HOME_PATH.to_owned()),
            Self::Continue => None,
        }
    }
}

/// True when `path` equals a gated prefix or sits beneath one.
#[must_use]
pub fn is_gated(path: &str) -> bool {
    GATED_PATHS
        .iter()
        .any(|prefix| path.strip_prefix(prefix).is_some_and(|rest| rest.is_empty() || rest.starts_with('/')))
}

/// Apply the routing policy to a request path.
#[must_use]
pub fn decide(path: &str, authenticated: bool) -> GateDecision {
    let is_auth_page = path.starts_with(SIGN_IN_PATH) || path.starts_with(SIGN_UP_PATH);

    if !authenticated && path.starts_with(PROFILE_PATH) {
        return GateDecision::RedirectToSignIn { callback_url: path.to_owned() };
    }

    if authenticated && is_auth_page {
        return GateDecision::RedirectToHome;
    }

    GateDecision::Continue
}

/// `/sign-in?callbackUrl=<form-encoded callback>`.
#[must_use]
pub fn sign_in_location(callback_url: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", callback_url)
        .finish();
    format!("{SIGN_IN_PATH}?{query}")
}

/// Resolve and verify the request's session token. Any failure yields `None`.
pub(crate) fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<SessionToken> {
    let raw = token::token_from_headers(headers)?;
    match state.tokens.verify(&raw, token::unix_now()) {
        Ok(session_token) => Some(session_token),
        Err(e) => {
            tracing::debug!(error = %e, "session token rejected");
            None
        }
    }
}

/// Axum middleware applying [`decide`] to gated paths.
pub async fn route_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if !is_gated(&path) {
        return next.run(request).await;
    }

    let authenticated = authenticate(&state, request.headers()).is_some();
    let decision = decide(&path, authenticated);
    match decision.location() {
        Some(location) => {
            tracing::debug!(%path, authenticated, %location, "route gate redirect");
            Redirect::temporary(&location).into_response()
        }
        None => next.run(request).await,
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
