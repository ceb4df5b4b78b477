// backend/src/auth/mod.rs

pub mod provider;
pub mod standard;
pub mod github;
pub mod google;
pub mod feishu;
pub mod gitee;
pub mod linuxdo;
pub mod oschina;
pub mod wechat;

use std::sync::Arc;
use crate::state::AppState;
use wechat::{WeChatFactory, WeChatFlavor};

/// Registers all the built-in OAuth provider factories.
/// This is the *only* place that needs to be modified to add a new provider.
pub fn register_builtin_providers(state: &AppState) {
    state.register_provider_factory(Arc::new(github::GitHubFactory));
    state.register_provider_factory(Arc::new(google::GoogleFactory));
    state.register_provider_factory(Arc::new(feishu::FeiShuFactory));
    state.register_provider_factory(Arc::new(gitee::GiteeFactory));
    state.register_provider_factory(Arc::new(linuxdo::LinuxDoFactory));
    state.register_provider_factory(Arc::new(oschina::OsChinaFactory));
    state.register_provider_factory(Arc::new(WeChatFactory(WeChatFlavor::MiniProgram)));
    state.register_provider_factory(Arc::new(WeChatFactory(WeChatFlavor::OpenPlatform)));
}
