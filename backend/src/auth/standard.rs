// backend/src/auth/standard.rs

use std::borrow::Cow;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use oauth2::{
    basic::{BasicClient, BasicErrorResponse, BasicTokenResponse},
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet,
    EndpointSet, RedirectUrl, RequestTokenError, Scope, TokenUrl,
};
use reqwest::{header::ACCEPT, Client};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::auth::provider::{
    into_object, read_json, truncate, Endpoints, OAuthProvider, TokenGrant, MAX_ERROR_BODY_CHARS,
};
use crate::config::ProviderCredentials;
use crate::models::ProviderId;

type CodeClient = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// How the access token is presented to the userinfo endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenPlacement {
    BearerHeader,
    QueryParam,
}

/// RFC 6749 authorization-code client on top of `oauth2::BasicClient`.
/// Most providers are this plus a few knobs; the quirkier ones wrap it.
#[derive(Debug)]
pub struct StandardOAuth2 {
    id: ProviderId,
    http: Client,
    oauth: CodeClient,
    endpoints: Endpoints,
    scopes: Vec<Scope>,
    token_placement: TokenPlacement,
    // Appended to token and userinfo requests.
    extra_params: Vec<(String, String)>,
}

impl StandardOAuth2 {
    pub fn new(
        id: ProviderId,
        http: Client,
        creds: ProviderCredentials,
        default_endpoints: Endpoints,
    ) -> anyhow::Result<Self> {
        let endpoints = default_endpoints.with_overrides(&creds.endpoints);
        let auth_url = AuthUrl::new(endpoints.authorize_url.clone())
            .with_context(|| format!("invalid {id} authorize URL"))?;
        let token_url = TokenUrl::new(endpoints.token_url.clone())
            .with_context(|| format!("invalid {id} token URL"))?;

        // BasicClient defaults to HTTP Basic; most of these providers want the form body.
        let oauth = BasicClient::new(ClientId::new(creds.client_id))
            .set_client_secret(ClientSecret::new(creds.client_secret))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_auth_type(AuthType::RequestBody);

        Ok(Self {
            id,
            http,
            oauth,
            endpoints,
            scopes: Vec::new(),
            token_placement: TokenPlacement::BearerHeader,
            extra_params: Vec::new(),
        })
    }

    pub fn with_scopes(mut self, scopes: &[&str]) -> Self {
        self.scopes = scopes.iter().map(|s| Scope::new(s.to_string())).collect();
        self
    }

    pub fn with_auth_type(mut self, auth_type: AuthType) -> Self {
        self.oauth = self.oauth.set_auth_type(auth_type);
        self
    }

    pub fn with_token_placement(mut self, placement: TokenPlacement) -> Self {
        self.token_placement = placement;
        self
    }

    pub fn with_extra_param(mut self, key: &str, value: &str) -> Self {
        self.extra_params.push((key.into(), value.into()));
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn http(&self) -> &Client {
        &self.http
    }
}

fn redirect_url(redirect_uri: &str) -> anyhow::Result<RedirectUrl> {
    RedirectUrl::new(redirect_uri.to_string())
        .with_context(|| format!("invalid redirect URI '{redirect_uri}'"))
}

fn token_error<RE>(id: ProviderId, err: RequestTokenError<RE, BasicErrorResponse>) -> anyhow::Error
where
    RE: std::error::Error + 'static,
{
    match err {
        RequestTokenError::ServerResponse(resp) => match resp.error_description() {
            Some(description) => anyhow!("{}: {description}", resp.error()),
            None => anyhow!("{}", resp.error()),
        },
        RequestTokenError::Request(e) => anyhow!("{id} token request failed: {e}"),
        RequestTokenError::Parse(e, body) => anyhow!(
            "{id} token endpoint returned an unreadable response ({e}): {}",
            truncate(&String::from_utf8_lossy(&body), MAX_ERROR_BODY_CHARS)
        ),
        RequestTokenError::Other(message) => anyhow!("{id} token endpoint: {message}"),
    }
}

fn grant_from(token: &BasicTokenResponse) -> anyhow::Result<TokenGrant> {
    let raw = serde_json::to_value(token).context("re-encode token response")?;
    TokenGrant::from_json(raw)
}

#[async_trait]
impl OAuthProvider for StandardOAuth2 {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn authorization_url(&self, redirect_uri: &str, state: &str) -> anyhow::Result<Url> {
        let (url, _) = self.oauth
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scopes(self.scopes.iter().cloned())
            .set_redirect_uri(Cow::Owned(redirect_url(redirect_uri)?))
            .url();
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> anyhow::Result<TokenGrant> {
        let mut request = self.oauth
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_redirect_uri(Cow::Owned(redirect_url(redirect_uri)?));
        for (key, value) in &self.extra_params {
            request = request.add_extra_param(key.as_str(), value.as_str());
        }

        debug!("exchanging authorization code with {}", self.id);
        let token = request
            .request_async(&self.http)
            .await
            .map_err(|e| token_error(self.id, e))?;
        grant_from(&token)
    }

    async fn fetch_userinfo(&self, grant: &TokenGrant) -> anyhow::Result<Map<String, Value>> {
        let mut req = self.http
            .get(&self.endpoints.userinfo_url)
            .header(ACCEPT, "application/json")
            .query(&self.extra_params);
        req = match self.token_placement {
            TokenPlacement::BearerHeader => req.bearer_auth(&grant.access_token),
            TokenPlacement::QueryParam => req.query(&[("access_token", &grant.access_token)]),
        };

        let resp = req.send().await?;
        let what = format!("{} userinfo endpoint", self.id);
        let body = read_json(resp, &what).await?;
        into_object(body, &what)
    }
}
