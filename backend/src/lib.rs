// backend/src/lib.rs

//! Sign in with GitHub, Google, FeiShu, Gitee, Linux.do, OSChina or WeChat
//! through the OAuth2 authorization-code flow, keeping the resulting profile
//! in a server-side session.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

use std::sync::Arc;
use axum::Router;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn app_router(state: Arc<AppState>) -> Router {
    with_layers(
        Router::new()
            .merge(routes::pages::router())
            .merge(routes::api::router())
            .merge(routes::oauth::router())
            .merge(routes::health::router())
            .with_state(state),
    )
}

/// Panic-to-JSON, CORS and request tracing, outermost last.
pub fn with_layers(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
