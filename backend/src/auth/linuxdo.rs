// backend/src/auth/linuxdo.rs

use std::sync::Arc;
use async_trait::async_trait;
use oauth2::AuthType;

use crate::auth::provider::{
    configured_credentials, Endpoints, OAuthProviderDyn, OAuthProviderFactory,
};
use crate::auth::standard::StandardOAuth2;
use crate::models::ProviderId;
use crate::state::AppState;

pub fn default_endpoints() -> Endpoints {
    Endpoints::new(
        "https://connect.linux.do/oauth2/authorize",
        "https://connect.linux.do/oauth2/token",
        "https://connect.linux.do/api/user",
    )
}

pub struct LinuxDoFactory;

#[async_trait]
impl OAuthProviderFactory for LinuxDoFactory {
    fn id(&self) -> ProviderId {
        ProviderId::LinuxDo
    }

    async fn build(self: Arc<Self>, state: &AppState) -> anyhow::Result<OAuthProviderDyn> {
        let creds = configured_credentials(state, self.id())?;
        Ok(Arc::new(
            StandardOAuth2::new(self.id(), state.http.clone(), creds, default_endpoints())?
                .with_auth_type(AuthType::BasicAuth),
        ))
    }
}
