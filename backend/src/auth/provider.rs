// backend/src/auth/provider.rs

use std::sync::Arc;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::Response;
use serde_json::{Map, Value};
use url::Url;

use crate::{
    config::{EndpointOverrides, ProviderCredentials},
    models::ProviderId,
    state::AppState,
};

/// Upper bound on how much of an error body ends up in a message.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Clone, Debug, PartialEq)]
pub struct Endpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Endpoints {
    pub fn new(authorize_url: &str, token_url: &str, userinfo_url: &str) -> Self {
        Self {
            authorize_url: authorize_url.into(),
            token_url: token_url.into(),
            userinfo_url: userinfo_url.into(),
        }
    }

    pub fn with_overrides(mut self, overrides: &EndpointOverrides) -> Self {
        if let Some(url) = &overrides.authorize_url {
            self.authorize_url = url.clone();
        }
        if let Some(url) = &overrides.token_url {
            self.token_url = url.clone();
        }
        if let Some(url) = &overrides.userinfo_url {
            self.userinfo_url = url.clone();
        }
        self
    }
}

/// What the token endpoint handed back.
#[derive(Clone, Debug)]
pub struct TokenGrant {
    pub access_token: String,
    /// WeChat identifies the user by `openid` next to the token.
    pub openid: Option<String>,
    pub raw: Map<String, Value>,
}

impl TokenGrant {
    pub fn from_json(value: Value) -> anyhow::Result<Self> {
        let raw = into_object(value, "token response")?;

        if let Some(error) = raw.get("error").and_then(Value::as_str) {
            match raw.get("error_description").and_then(Value::as_str) {
                Some(description) => bail!("{error}: {description}"),
                None => bail!("{error}"),
            }
        }

        let access_token = raw
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .context("token response is missing access_token")?
            .to_string();
        let openid = raw.get("openid").and_then(Value::as_str).map(str::to_string);

        Ok(Self { access_token, openid, raw })
    }
}

// Any type implementing OAuthProvider must also implement Debug, Send, and Sync.
#[async_trait]
pub trait OAuthProvider: std::fmt::Debug + Send + Sync {
    fn id(&self) -> ProviderId;

    fn authorization_url(&self, redirect_uri: &str, state: &str) -> anyhow::Result<Url>;

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> anyhow::Result<TokenGrant>;

    async fn fetch_userinfo(&self, grant: &TokenGrant) -> anyhow::Result<Map<String, Value>>;
}

pub type OAuthProviderDyn = Arc<dyn OAuthProvider>;

#[async_trait]
pub trait OAuthProviderFactory: Send + Sync {
    fn id(&self) -> ProviderId;
    async fn build(self: Arc<Self>, state: &AppState) -> anyhow::Result<OAuthProviderDyn>;
}

pub type OAuthProviderFactoryDyn = Arc<dyn OAuthProviderFactory>;

// --- Helpers shared by the provider implementations ---

pub(crate) fn configured_credentials(
    state: &AppState,
    id: ProviderId,
) -> anyhow::Result<ProviderCredentials> {
    state.config.provider(id).cloned().with_context(|| {
        format!(
            "{prefix}_CLIENT_ID / {prefix}_CLIENT_SECRET are not configured on the server",
            prefix = id.env_prefix()
        )
    })
}

/// Reads a JSON body, turning non-2xx statuses into errors that carry the body.
/// Parses from text because some providers label JSON as `text/plain`.
pub(crate) async fn read_json(resp: Response, what: &str) -> anyhow::Result<Value> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .with_context(|| format!("{what}: failed to read response body"))?;

    if !status.is_success() {
        bail!("{what} returned HTTP {status}: {}", truncate(&body, MAX_ERROR_BODY_CHARS));
    }

    serde_json::from_str(&body).with_context(|| {
        format!("{what} returned invalid JSON: {}", truncate(&body, MAX_ERROR_BODY_CHARS))
    })
}

pub(crate) fn into_object(value: Value, what: &str) -> anyhow::Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("{what} is not a JSON object: {other}")),
    }
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
