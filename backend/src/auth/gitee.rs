// backend/src/auth/gitee.rs

use std::sync::Arc;
use async_trait::async_trait;

use crate::auth::provider::{
    configured_credentials, Endpoints, OAuthProviderDyn, OAuthProviderFactory,
};
use crate::auth::standard::{StandardOAuth2, TokenPlacement};
use crate::models::ProviderId;
use crate::state::AppState;

pub const SCOPES: &[&str] = &["user_info"];

pub fn default_endpoints() -> Endpoints {
    Endpoints::new(
        "https://gitee.com/oauth/authorize",
        "https://gitee.com/oauth/token",
        "https://gitee.com/api/v5/user",
    )
}

pub struct GiteeFactory;

#[async_trait]
impl OAuthProviderFactory for GiteeFactory {
    fn id(&self) -> ProviderId {
        ProviderId::Gitee
    }

    async fn build(self: Arc<Self>, state: &AppState) -> anyhow::Result<OAuthProviderDyn> {
        let creds = configured_credentials(state, self.id())?;
        // Gitee's v5 API takes the token as a query parameter.
        Ok(Arc::new(
            StandardOAuth2::new(self.id(), state.http.clone(), creds, default_endpoints())?
                .with_scopes(SCOPES)
                .with_token_placement(TokenPlacement::QueryParam),
        ))
    }
}
