// backend/src/routes/api.rs

use std::sync::Arc;
use axum::{extract::State, routing::get, Json, Router};
use oauth_demo_common::{ProvidersResponse, SessionUser};

use crate::{error::AppError, session::Session, state::AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/user", get(current_user))
        .route("/api/providers", get(providers))
}

/// Returns the signed-in user.
///
/// # Returns
/// * `200 OK` with `{"provider": .., "data": {..}}`.
/// * `401 Unauthorized` with `{"error": "Not authenticated"}`.
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<SessionUser>, AppError> {
    state
        .sessions
        .user(session.id())
        .map(Json)
        .ok_or(AppError::Unauthorized)
}

/// Lists the providers that have credentials configured.
pub async fn providers(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    let enabled = state
        .config
        .enabled_providers()
        .into_iter()
        .map(|id| id.as_str().to_string())
        .collect();
    Json(ProvidersResponse::new(enabled))
}
