use super::*;
use crate::routes::app;
use crate::services::imagekit::CREDENTIAL_TTL_SECS;
use crate::services::token::SessionToken;
use crate::state::test_helpers;
use crate::upload::UploadCredential;
use axum::body::Body;
use axum::http::Request;
use axum::http::header::{COOKIE, SET_COOKIE};
use tower::ServiceExt;

async fn get(state: AppState, path: &str, cookie: Option<String>) -> Response {
    let mut builder = Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    app(state).oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(state: &AppState, claims: SessionToken) -> String {
    format!("authjs.session-token={}", state.tokens.issue(claims).unwrap())
}

// =============================================================================
// imagekit_credentials
// =============================================================================

#[tokio::test]
async fn imagekit_credentials_returns_signed_triple() {
    let state = test_helpers::test_app_state();
    let before = token::unix_now();
    let response = get(state, "/api/auth/imagekit", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let credential: UploadCredential = serde_json::from_value(json_body(response).await).unwrap();
    assert!(!credential.token.is_empty());
    assert!(credential.expire >= before + CREDENTIAL_TTL_SECS);
    assert_eq!(credential.signature, imagekit::sign("private_test", &credential.token, credential.expire).unwrap());
}

#[tokio::test]
async fn imagekit_credentials_are_fresh_per_request() {
    let state = test_helpers::test_app_state();
    let a: UploadCredential = serde_json::from_value(json_body(get(state.clone(), "/api/auth/imagekit", None).await).await).unwrap();
    let b: UploadCredential = serde_json::from_value(json_body(get(state, "/api/auth/imagekit", None).await).await).unwrap();
    assert_ne!(a.token, b.token);
}

#[tokio::test]
async fn imagekit_credentials_unavailable_without_private_key() {
    let mut config = test_helpers::test_config();
    config.imagekit.private_key = None;
    let response = get(test_helpers::test_app_state_with(config), "/api/auth/imagekit", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// session
// =============================================================================

#[tokio::test]
async fn session_is_null_without_token() {
    let response = get(test_helpers::test_app_state(), "/api/auth/session", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(json_body(response).await, serde_json::Value::Null);
}

#[tokio::test]
async fn session_is_null_for_expired_token() {
    let state = test_helpers::test_app_state();
    let cookie = session_cookie(&state, SessionToken::new().with_claim("sub", "u").with_claim("exp", 10));
    let response = get(state, "/api/auth/session", Some(cookie)).await;
    assert_eq!(json_body(response).await, serde_json::Value::Null);
}

#[tokio::test]
async fn session_exposes_normalized_user() {
    let state = test_helpers::test_app_state();
    let claims = SessionToken::new()
        .with_claim("sub", "user-42")
        .with_claim("name", "Ada Lovelace")
        .with_claim("email", "ada@example.com");
    let cookie = session_cookie(&state, claims);
    let response = get(state, "/api/auth/session", Some(cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["id"], "user-42");
    assert_eq!(body["user"]["name"], "Ada Lovelace");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["expires"].as_str().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn session_rolls_cookie_forward() {
    let state = test_helpers::test_app_state();
    let cookie = session_cookie(&state, SessionToken::new().with_claim("sub", "user-42").with_claim("custom", "kept"));
    let response = get(state.clone(), "/api/auth/session", Some(cookie)).await;

    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_owned();
    assert!(set_cookie.starts_with("authjs.session-token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=3600"));

    let raw = set_cookie
        .trim_start_matches("authjs.session-token=")
        .split(';')
        .next()
        .unwrap();
    let rolled = state.tokens.verify(raw, token::unix_now()).unwrap();
    assert_eq!(rolled.subject(), Some("user-42"));
    assert_eq!(rolled.get("custom").and_then(serde_json::Value::as_str), Some("kept"));
    assert!(rolled.expires_at().unwrap().unwrap() > token::unix_now());
}

#[tokio::test]
async fn session_uses_secure_cookie_name_when_configured() {
    let mut config = test_helpers::test_config();
    config.cookie_secure = true;
    let state = test_helpers::test_app_state_with(config);
    let cookie = session_cookie(&state, SessionToken::new().with_claim("sub", "u"));
    let response = get(state, "/api/auth/session", Some(cookie)).await;

    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("__Secure-authjs.session-token="));
    assert!(set_cookie.contains("; Secure"));
}
