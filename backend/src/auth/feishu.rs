// backend/src/auth/feishu.rs

use std::sync::Arc;
use async_trait::async_trait;

use crate::auth::provider::{
    configured_credentials, Endpoints, OAuthProviderDyn, OAuthProviderFactory,
};
use crate::auth::standard::StandardOAuth2;
use crate::models::ProviderId;
use crate::state::AppState;

pub const SCOPES: &[&str] = &[
    "contact:user.employee_id:readonly",
    "contact:user.base:readonly",
    "contact:user.email:readonly",
];

pub fn default_endpoints() -> Endpoints {
    Endpoints::new(
        "https://passport.feishu.cn/suite/passport/oauth/authorize",
        "https://passport.feishu.cn/suite/passport/oauth/token",
        "https://passport.feishu.cn/suite/passport/oauth/userinfo",
    )
}

pub struct FeiShuFactory;

#[async_trait]
impl OAuthProviderFactory for FeiShuFactory {
    fn id(&self) -> ProviderId {
        ProviderId::FeiShu
    }

    async fn build(self: Arc<Self>, state: &AppState) -> anyhow::Result<OAuthProviderDyn> {
        let creds = configured_credentials(state, self.id())?;
        Ok(Arc::new(
            StandardOAuth2::new(self.id(), state.http.clone(), creds, default_endpoints())?
                .with_scopes(SCOPES),
        ))
    }
}
