// backend/src/state.rs

use std::{sync::Arc, time::Duration};
use anyhow::{anyhow, Context, Result};
use dashmap::DashMap;
use handlebars::Handlebars;
use reqwest::Client;
use tracing::info;

use crate::auth;
use crate::auth::provider::{OAuthProviderDyn, OAuthProviderFactoryDyn};
use crate::config::Config;
use crate::models::ProviderId;
use crate::session::SessionStore;
use crate::views;

pub const USER_AGENT: &str = concat!("oauth-demo-backend/", env!("CARGO_PKG_VERSION"));

// --- AppState Definition ---
pub struct AppState {
    pub http: Client,
    pub config: Config,
    pub sessions: SessionStore,
    pub templates: Handlebars<'static>,

    // Built lazily from the registered factories on first use.
    providers: DashMap<ProviderId, OAuthProviderDyn>,
    provider_factories: DashMap<ProviderId, OAuthProviderFactoryDyn>,
}

impl AppState {
    pub fn try_new(config: Config) -> Result<Arc<Self>> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(8)
            .build()
            .context("build reqwest client")?;

        let state = Arc::new(Self {
            http,
            sessions: SessionStore::new(config.session_max_age),
            templates: views::templates()?,
            config,
            providers: DashMap::new(),
            provider_factories: DashMap::new(),
        });

        auth::register_builtin_providers(&state);

        Ok(state)
    }

    pub fn register_provider_factory(&self, factory: OAuthProviderFactoryDyn) {
        self.provider_factories.insert(factory.id(), factory);
    }

    pub async fn get_or_create_provider(&self, id: ProviderId) -> Result<OAuthProviderDyn> {
        if let Some(provider) = self.providers.get(&id) {
            return Ok(provider.clone());
        }

        let factory = self.provider_factories
            .get(&id)
            .ok_or_else(|| anyhow!("No factory registered for provider '{id}'"))?
            .clone();

        let provider = factory.build(self).await?;
        info!("Initialized OAuth provider: {}", id.display_name());
        self.providers.insert(id, provider.clone());
        Ok(provider)
    }
}
