//! Auth routes: upload credentials and session materialization.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::gate;
use crate::services::{imagekit, session, token};
use crate::state::AppState;

/// `GET /api/auth/imagekit`: fresh `{ token, expire, signature }` for one upload.
pub async fn imagekit_credentials(State(state): State<AppState>) -> Response {
    let Some(private_key) = state.config.imagekit.private_key.as_deref() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "ImageKit private key not configured").into_response();
    };

    match imagekit::authentication_parameters(private_key, token::unix_now()) {
        Ok(credential) => {
            tracing::debug!(expire = credential.expire, "issued upload credential");
            Json(credential).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "upload credential signing failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `GET /api/auth/session`: current session, or `null`.
///
/// A valid token is rolled forward: re-issued with fresh `iat`/`exp` and set
/// back as the session cookie.
pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(current) = gate::authenticate(&state, &headers) else {
        return Json(serde_json::Value::Null).into_response();
    };

    let now = token::unix_now();
    let max_age = state.config.session_max_age_secs;
    let refreshed = current.refreshed(now, max_age);
    let body = session::materialize(&refreshed, now, max_age);

    let raw = match state.tokens.issue(refreshed) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(error = %e, "session refresh failed");
            return Json(body).into_response();
        }
    };

    let secure = state.config.cookie_secure;
    let cookie = Cookie::build((token::session_cookie_name(secure), raw))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(i64::try_from(max_age).unwrap_or(i64::MAX)));

    let jar = CookieJar::new().add(cookie);
    (jar, Json(body)).into_response()
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
