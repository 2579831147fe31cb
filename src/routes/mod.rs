//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the auth API endpoints and serves the static site directory as the
//! fallback. The route gate wraps everything, so gated pages are redirected
//! before the static service ever sees them.

pub mod auth;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::gate;
use crate::state::AppState;

/// Full application router: API routes, static site fallback, route gate.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let site = ServeDir::new(&state.config.site_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/api/auth/imagekit", get(auth::imagekit_credentials))
        .route("/api/auth/session", get(auth::session))
        .route("/healthz", get(healthz))
        .fallback_service(site)
        .layer(middleware::from_fn_with_state(state.clone(), gate::route_gate))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
