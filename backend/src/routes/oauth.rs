// backend/src/routes/oauth.rs

use std::sync::Arc;
use anyhow::{bail, ensure, Context};
use axum::{
    extract::{Path, Query, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use oauth_demo_common::SessionUser;
use tracing::{info, warn};
use url::form_urlencoded;

use crate::{
    auth::provider::{truncate, OAuthProviderDyn},
    error::AppError,
    models::{CallbackQuery, ProviderId},
    session::{now, Session},
    state::AppState,
};

/// Longest error detail forwarded to the home page.
pub const MAX_ERROR_DETAILS: usize = 100;

pub const PROVIDER_NOT_SUPPORTED: &str = "/?error=provider_not_supported";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/oauth2/{provider}/authorize", get(authorize))
        .route("/api/v1/oauth2/{provider}/callback", get(callback))
}

/// Starts the authorization-code flow for a provider.
///
/// # Arguments
/// * `state` - The application state.
/// * `session` - The caller's session; receives the CSRF state.
/// * `slug` - Provider route segment, e.g. `github` or `linux-do`.
///
/// # Returns
/// * `307 Temporary Redirect` to the provider's authorization page.
/// * `307 Temporary Redirect` to `/?error=provider_not_supported` if the provider has no credentials.
/// * `404 Not Found` for an unknown provider.
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let id = ProviderId::parse(&slug).ok_or(AppError::UnknownProvider(slug))?;

    let Some(provider) = configured_provider(&state, id).await else {
        return Ok(Redirect::temporary(PROVIDER_NOT_SUPPORTED).into_response());
    };

    let redirect_uri = redirect_uri(&state, id)?;
    let csrf_state = state.sessions.begin_login(session.id(), id);
    let url = provider.authorization_url(&redirect_uri, &csrf_state)?;

    info!("redirecting to {} for sign-in", id.display_name());
    Ok((
        [(SET_COOKIE, session.cookie(&state.config)?)],
        Redirect::temporary(url.as_str()),
    )
        .into_response())
}

/// Completes the flow: checks the state, exchanges the code and stores the profile.
///
/// # Arguments
/// * `state` - The application state.
/// * `session` - The caller's session, holding the pending sign-in.
/// * `slug` - Provider route segment.
/// * `q` - `code`/`state`, or `error` when the user declined.
///
/// # Returns
/// * `303 See Other` to `/` with the user stored in the session.
/// * `303 See Other` to `/?error=oauth_failed&provider=..&details=..` on any provider failure.
/// * `404 Not Found` for an unknown provider.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(slug): Path<String>,
    Query(q): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let id = ProviderId::parse(&slug).ok_or(AppError::UnknownProvider(slug))?;

    let Some(provider) = configured_provider(&state, id).await else {
        return Ok(Redirect::temporary(PROVIDER_NOT_SUPPORTED).into_response());
    };

    match complete_login(&state, &session, id, provider, q).await {
        Ok(user) => {
            info!("{} sign-in complete", id.display_name());
            state.sessions.set_user(session.id(), user);
            Ok((
                [(SET_COOKIE, session.cookie(&state.config)?)],
                Redirect::to("/"),
            )
                .into_response())
        }
        Err(e) => {
            let details = format!("{e:#}");
            warn!("{} OAuth error: {details}", id.display_name());
            Ok(Redirect::to(&failure_location(id, &details)).into_response())
        }
    }
}

async fn configured_provider(state: &AppState, id: ProviderId) -> Option<OAuthProviderDyn> {
    match state.get_or_create_provider(id).await {
        Ok(provider) => Some(provider),
        Err(e) => {
            warn!("sign-in with {} refused: {e:#}", id.display_name());
            None
        }
    }
}

fn redirect_uri(state: &AppState, id: ProviderId) -> anyhow::Result<String> {
    state
        .config
        .provider(id)
        .map(|creds| creds.redirect_uri.clone())
        .with_context(|| format!("no redirect URI configured for {id}"))
}

async fn complete_login(
    state: &AppState,
    session: &Session,
    id: ProviderId,
    provider: OAuthProviderDyn,
    q: CallbackQuery,
) -> anyhow::Result<SessionUser> {
    // Consumed up front so a failed attempt cannot be replayed.
    let pending = state.sessions.take_pending(session.id());

    if let Some(error) = q.error {
        match q.error_description {
            Some(description) => bail!("{error}: {description}"),
            None => bail!("{error}"),
        }
    }

    let code = q
        .code
        .filter(|c| !c.is_empty())
        .context("callback is missing the authorization code")?;
    let pending = pending.context("no sign-in in progress for this session")?;

    ensure!(
        pending.provider == id,
        "sign-in was started with {} but returned from {}",
        pending.provider,
        id
    );
    ensure!(
        q.state.as_deref() == Some(pending.csrf_state.as_str()),
        "state parameter mismatch"
    );
    ensure!(!pending.is_stale(now()), "sign-in attempt expired, please retry");

    let redirect_uri = redirect_uri(state, id)?;
    let grant = provider
        .exchange_code(&code, &redirect_uri)
        .await
        .context("token exchange failed")?;
    let data = provider
        .fetch_userinfo(&grant)
        .await
        .context("fetching user profile failed")?;

    Ok(SessionUser::new(id.as_str(), data))
}

/// Home-page location that reports a failed sign-in.
pub fn failure_location(id: ProviderId, details: &str) -> String {
    let details = truncate(details, MAX_ERROR_DETAILS);
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("error", "oauth_failed")
        .append_pair("provider", id.as_str())
        .append_pair("details", &details)
        .finish();
    format!("/?{query}")
}
