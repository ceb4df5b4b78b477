// backend/src/config.rs

use std::collections::HashMap;
use tracing::warn;

use crate::models::ProviderId;

pub const DEFAULT_APP_NAME: &str = "OAuth2 Sign-in Demo";
pub const DEFAULT_APP_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 3600;

/// Replacement endpoints for a provider, e.g. a proxy or a self-hosted instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EndpointOverrides {
    pub authorize_url: Option<String>,
    pub token_url: Option<String>,
    pub userinfo_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub endpoints: EndpointOverrides,
}

// --- Centralized Configuration ---
#[derive(Clone, Debug)]
pub struct Config {
    pub app_name: String,
    pub app_url: String,
    pub host: String,
    pub port: u16,
    pub session_max_age: u64,
    pub secure_cookies: bool,
    providers: HashMap<ProviderId, ProviderCredentials>,
}

impl Config {
    /// A configuration with no providers enabled.
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_url: app_url.into().trim_end_matches('/').to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            session_max_age: DEFAULT_SESSION_MAX_AGE_SECS,
            secure_cookies: false,
            providers: HashMap::new(),
        }
    }

    pub fn from_env() -> Self {
        let mut config = Self::new(env_var("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.into()));

        if let Some(name) = env_var("APP_NAME") {
            config.app_name = name;
        }
        if let Some(host) = env_var("HOST") {
            config.host = host;
        }
        config.port = env_parse("PORT").unwrap_or(DEFAULT_PORT);
        config.session_max_age =
            env_parse("SESSION_MAX_AGE_SECS").unwrap_or(DEFAULT_SESSION_MAX_AGE_SECS);
        config.secure_cookies = env_var("SESSION_COOKIE_SECURE")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        for id in ProviderId::ALL {
            let prefix = id.env_prefix();
            let client_id = env_var(&format!("{prefix}_CLIENT_ID"));
            let client_secret = env_var(&format!("{prefix}_CLIENT_SECRET"));

            let (client_id, client_secret) = match (client_id, client_secret) {
                (Some(client_id), Some(client_secret)) => (client_id, client_secret),
                (None, None) => continue,
                _ => {
                    warn!(
                        "{prefix}_CLIENT_ID and {prefix}_CLIENT_SECRET must both be set; {} stays disabled",
                        id.display_name()
                    );
                    continue;
                }
            };

            config = config.with_provider(id, client_id, client_secret);

            if let Some(redirect_uri) = env_var(&format!("{prefix}_REDIRECT_URI")) {
                config = config.with_redirect_uri(id, redirect_uri);
            }
            config = config.with_endpoints(
                id,
                EndpointOverrides {
                    authorize_url: env_var(&format!("{prefix}_AUTHORIZE_URL")),
                    token_url: env_var(&format!("{prefix}_TOKEN_URL")),
                    userinfo_url: env_var(&format!("{prefix}_USERINFO_URL")),
                },
            );
        }

        config
    }

    /// Enables a provider with the default callback under `app_url`.
    pub fn with_provider(
        mut self,
        id: ProviderId,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let redirect_uri = self.default_redirect_uri(id);
        self.providers.insert(id, ProviderCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri,
            endpoints: EndpointOverrides::default(),
        });
        self
    }

    /// No-op unless the provider was enabled first.
    pub fn with_redirect_uri(mut self, id: ProviderId, redirect_uri: impl Into<String>) -> Self {
        if let Some(creds) = self.providers.get_mut(&id) {
            creds.redirect_uri = redirect_uri.into();
        }
        self
    }

    /// No-op unless the provider was enabled first.
    pub fn with_endpoints(mut self, id: ProviderId, endpoints: EndpointOverrides) -> Self {
        if let Some(creds) = self.providers.get_mut(&id) {
            creds.endpoints = endpoints;
        }
        self
    }

    pub fn provider(&self, id: ProviderId) -> Option<&ProviderCredentials> {
        self.providers.get(&id)
    }

    pub fn is_enabled(&self, id: ProviderId) -> bool {
        self.providers.contains_key(&id)
    }

    pub fn enabled_providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.is_enabled(*id))
            .collect()
    }

    pub fn default_redirect_uri(&self, id: ProviderId) -> String {
        format!("{}{}", self.app_url, id.callback_path())
    }
}

/// Interprets the result of loading an optional `.env` file: a missing file
/// is `Ok(None)`, a file that exists but cannot be read or parsed is an error.
pub fn check_dotenv<T>(result: Result<T, dotenvy::Error>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(loaded) => Ok(Some(loaded)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(anyhow::Error::new(e).context("unreadable .env file")),
    }
}

// Empty values count as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_var(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring unparsable {key}={raw:?}");
            None
        }
    }
}
