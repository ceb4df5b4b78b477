// backend/src/routes/pages.rs

use std::sync::Arc;
use axum::{
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Router,
};
use tracing::info;

use crate::{
    error::AppError,
    models::HomeQuery,
    session::Session,
    state::AppState,
    views::{IndexPage, INDEX_TEMPLATE},
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/logout", get(logout))
}

/// Home page: sign-in buttons for every configured provider, or the current user.
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(q): Query<HomeQuery>,
) -> Result<Html<String>, AppError> {
    let user = state.sessions.user(session.id());
    let page = IndexPage::build(&state.config, user.as_ref(), &q);
    Ok(Html(state.templates.render(INDEX_TEMPLATE, &page)?))
}

/// Drops the session and expires its cookie.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> impl IntoResponse {
    if let Some(user) = state.sessions.user(session.id()) {
        info!("{} user logged out", user.provider);
    }
    state.sessions.clear(session.id());
    ([(SET_COOKIE, Session::removal_cookie())], Redirect::to("/"))
}
