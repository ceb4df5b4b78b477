// backend/src/auth/github.rs

use std::sync::Arc;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;
use url::Url;

use crate::auth::provider::{
    configured_credentials, Endpoints, OAuthProvider, OAuthProviderDyn, OAuthProviderFactory,
    TokenGrant,
};
use crate::auth::standard::StandardOAuth2;
use crate::models::ProviderId;
use crate::state::AppState;

pub const SCOPES: &[&str] = &["user", "user:email"];

pub fn default_endpoints() -> Endpoints {
    Endpoints::new(
        "https://github.com/login/oauth/authorize",
        "https://github.com/login/oauth/access_token",
        "https://api.github.com/user",
    )
}

// --- Provider Implementation ---

#[derive(Debug)]
pub struct GitHubAuth {
    inner: StandardOAuth2,
}

impl GitHubAuth {
    pub fn new(inner: StandardOAuth2) -> Arc<Self> {
        Arc::new(Self { inner })
    }

    // `/user` only reports a public email; the primary one lives under `/user/emails`.
    async fn primary_email(&self, access_token: &str) -> anyhow::Result<Option<String>> {
        let emails_url = format!("{}/emails", self.inner.endpoints().userinfo_url.trim_end_matches('/'));

        let emails = self.inner.http()
            .get(&emails_url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<GhEmail>>()
            .await?;

        Ok(emails
            .into_iter()
            .find(|e| e.primary && e.verified)
            .map(|e| e.email))
    }
}

#[async_trait]
impl OAuthProvider for GitHubAuth {
    fn id(&self) -> ProviderId {
        ProviderId::GitHub
    }

    fn authorization_url(&self, redirect_uri: &str, state: &str) -> anyhow::Result<Url> {
        self.inner.authorization_url(redirect_uri, state)
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> anyhow::Result<TokenGrant> {
        self.inner.exchange_code(code, redirect_uri).await
    }

    async fn fetch_userinfo(&self, grant: &TokenGrant) -> anyhow::Result<Map<String, Value>> {
        let mut profile = self.inner.fetch_userinfo(grant).await?;

        let has_email = profile
            .get("email")
            .and_then(Value::as_str)
            .is_some_and(|e| !e.is_empty());
        if !has_email {
            match self.primary_email(&grant.access_token).await {
                Ok(Some(email)) => {
                    profile.insert("email".into(), Value::String(email));
                }
                Ok(None) => {}
                Err(e) => warn!("could not look up GitHub primary email: {e:#}"),
            }
        }

        Ok(profile)
    }
}

// --- Factory Implementation ---

pub struct GitHubFactory;

#[async_trait]
impl OAuthProviderFactory for GitHubFactory {
    fn id(&self) -> ProviderId { ProviderId::GitHub }

    async fn build(self: Arc<Self>, state: &AppState) -> anyhow::Result<OAuthProviderDyn> {
        let creds = configured_credentials(state, self.id())?;
        let inner = StandardOAuth2::new(self.id(), state.http.clone(), creds, default_endpoints())?
            .with_scopes(SCOPES);

        Ok(GitHubAuth::new(inner))
    }
}

// --- DTOs for GitHub API ---

#[derive(Deserialize)]
struct GhEmail {
    email: String,
    primary: bool,
    verified: bool,
}
