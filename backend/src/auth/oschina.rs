// backend/src/auth/oschina.rs

use std::sync::Arc;
use async_trait::async_trait;

use crate::auth::provider::{
    configured_credentials, Endpoints, OAuthProviderDyn, OAuthProviderFactory,
};
use crate::auth::standard::{StandardOAuth2, TokenPlacement};
use crate::models::ProviderId;
use crate::state::AppState;

pub fn default_endpoints() -> Endpoints {
    Endpoints::new(
        "https://www.oschina.net/action/oauth2/authorize",
        "https://www.oschina.net/action/openapi/token",
        "https://www.oschina.net/action/openapi/user",
    )
}

pub struct OsChinaFactory;

#[async_trait]
impl OAuthProviderFactory for OsChinaFactory {
    fn id(&self) -> ProviderId {
        ProviderId::OsChina
    }

    async fn build(self: Arc<Self>, state: &AppState) -> anyhow::Result<OAuthProviderDyn> {
        let creds = configured_credentials(state, self.id())?;
        // Without dataType=json the open API answers in XML.
        Ok(Arc::new(
            StandardOAuth2::new(self.id(), state.http.clone(), creds, default_endpoints())?
                .with_token_placement(TokenPlacement::QueryParam)
                .with_extra_param("dataType", "json"),
        ))
    }
}
