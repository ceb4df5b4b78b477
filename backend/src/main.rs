// backend/src/main.rs

use std::net::SocketAddr;
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use oauth_demo_backend::{app_router, config::{self, Config}, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before tracing so RUST_LOG may come from the file; reported after.
    let dotenv = config::check_dotenv(dotenvy::dotenv());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    match dotenv {
        Ok(Some(path)) => tracing::debug!("loaded environment from {}", path.display()),
        // A missing .env file is fine; real deployments use the environment.
        Ok(None) => {}
        Err(e) => tracing::warn!("ignoring {e:#}"),
    }

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let state = AppState::try_new(config)?;

    let enabled: Vec<&str> = state.config.enabled_providers().iter().map(|id| id.as_str()).collect();
    if enabled.is_empty() {
        tracing::warn!("no OAuth providers configured; set <PROVIDER>_CLIENT_ID and <PROVIDER>_CLIENT_SECRET");
    } else {
        tracing::info!("enabled providers: {}", enabled.join(", "));
    }

    let app = app_router(state.clone());

    tracing::info!("{} listening on http://{addr}", state.config.app_name);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
