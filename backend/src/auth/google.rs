// backend/src/auth/google.rs

use std::sync::Arc;
use async_trait::async_trait;

use crate::auth::provider::{
    configured_credentials, Endpoints, OAuthProviderDyn, OAuthProviderFactory,
};
use crate::auth::standard::StandardOAuth2;
use crate::models::ProviderId;
use crate::state::AppState;

pub const SCOPES: &[&str] = &["openid", "email", "profile"];

pub fn default_endpoints() -> Endpoints {
    Endpoints::new(
        "https://accounts.google.com/o/oauth2/v2/auth",
        "https://oauth2.googleapis.com/token",
        "https://www.googleapis.com/oauth2/v1/userinfo",
    )
}

pub struct GoogleFactory;

#[async_trait]
impl OAuthProviderFactory for GoogleFactory {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    async fn build(self: Arc<Self>, state: &AppState) -> anyhow::Result<OAuthProviderDyn> {
        let creds = configured_credentials(state, self.id())?;
        Ok(Arc::new(
            StandardOAuth2::new(self.id(), state.http.clone(), creds, default_endpoints())?
                .with_scopes(SCOPES),
        ))
    }
}
