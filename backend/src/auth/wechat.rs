// backend/src/auth/wechat.rs

use std::sync::Arc;
use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::auth::provider::{
    configured_credentials, into_object, read_json, Endpoints, OAuthProvider, OAuthProviderDyn,
    OAuthProviderFactory, TokenGrant,
};
use crate::config::ProviderCredentials;
use crate::models::ProviderId;
use crate::state::AppState;

const TOKEN_URL: &str = "https://api.weixin.qq.com/sns/oauth2/access_token";
const USERINFO_URL: &str = "https://api.weixin.qq.com/sns/userinfo";

/// The two WeChat sign-in surfaces share token and profile APIs and differ
/// only in the authorize page and scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeChatFlavor {
    MiniProgram,
    OpenPlatform,
}

impl WeChatFlavor {
    pub fn id(self) -> ProviderId {
        match self {
            Self::MiniProgram => ProviderId::WeChatMp,
            Self::OpenPlatform => ProviderId::WeChatOpen,
        }
    }

    pub fn scope(self) -> &'static str {
        match self {
            Self::MiniProgram => "snsapi_userinfo",
            Self::OpenPlatform => "snsapi_login",
        }
    }

    pub fn default_endpoints(self) -> Endpoints {
        let authorize_url = match self {
            Self::MiniProgram => "https://open.weixin.qq.com/connect/oauth2/authorize",
            // QR-code login for websites
            Self::OpenPlatform => "https://open.weixin.qq.com/connect/qrconnect",
        };
        Endpoints::new(authorize_url, TOKEN_URL, USERINFO_URL)
    }
}

// --- Provider Implementation ---

#[derive(Debug)]
pub struct WeChatAuth {
    flavor: WeChatFlavor,
    http: Client,
    app_id: String,
    app_secret: String,
    endpoints: Endpoints,
}

impl WeChatAuth {
    pub fn new(flavor: WeChatFlavor, http: Client, creds: ProviderCredentials) -> Arc<Self> {
        Arc::new(Self {
            flavor,
            http,
            endpoints: flavor.default_endpoints().with_overrides(&creds.endpoints),
            app_id: creds.client_id,
            app_secret: creds.client_secret,
        })
    }
}

/// WeChat answers failures with HTTP 200 and an `errcode` body.
fn check_errcode(value: &Value) -> anyhow::Result<()> {
    let code = value.get("errcode").and_then(Value::as_i64).unwrap_or(0);
    if code != 0 {
        let message = value.get("errmsg").and_then(Value::as_str).unwrap_or("unknown error");
        bail!("WeChat error {code}: {message}");
    }
    Ok(())
}

#[async_trait]
impl OAuthProvider for WeChatAuth {
    fn id(&self) -> ProviderId {
        self.flavor.id()
    }

    fn authorization_url(&self, redirect_uri: &str, state: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.endpoints.authorize_url)
            .with_context(|| format!("invalid {} authorize URL", self.id()))?;
        url.query_pairs_mut()
            .append_pair("appid", &self.app_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", self.flavor.scope())
            .append_pair("state", state);
        url.set_fragment(Some("wechat_redirect"));
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, _redirect_uri: &str) -> anyhow::Result<TokenGrant> {
        debug!("exchanging authorization code with {}", self.id());
        let resp = self.http
            .get(&self.endpoints.token_url)
            .query(&[
                ("appid", self.app_id.as_str()),
                ("secret", self.app_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let body = read_json(resp, "WeChat token endpoint").await?;
        check_errcode(&body)?;

        let grant = TokenGrant::from_json(body)?;
        if grant.openid.is_none() {
            bail!("WeChat token response is missing openid");
        }
        Ok(grant)
    }

    async fn fetch_userinfo(&self, grant: &TokenGrant) -> anyhow::Result<Map<String, Value>> {
        let openid = grant.openid.as_deref().context("WeChat userinfo requires an openid")?;

        let resp = self.http
            .get(&self.endpoints.userinfo_url)
            .query(&[
                ("access_token", grant.access_token.as_str()),
                ("openid", openid),
                ("lang", "zh_CN"),
            ])
            .send()
            .await?;

        let body = read_json(resp, "WeChat userinfo endpoint").await?;
        check_errcode(&body)?;
        into_object(body, "WeChat userinfo")
    }
}

// --- Factory Implementation ---

pub struct WeChatFactory(pub WeChatFlavor);

#[async_trait]
impl OAuthProviderFactory for WeChatFactory {
    fn id(&self) -> ProviderId {
        self.0.id()
    }

    async fn build(self: Arc<Self>, state: &AppState) -> anyhow::Result<OAuthProviderDyn> {
        let creds = configured_credentials(state, self.id())?;
        Ok(WeChatAuth::new(self.0, state.http.clone(), creds))
    }
}
