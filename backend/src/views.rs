// backend/src/views.rs

use anyhow::Context;
use handlebars::Handlebars;
use oauth_demo_common::SessionUser;
use serde::Serialize;

use crate::config::Config;
use crate::models::{HomeQuery, ProviderId};

pub const INDEX_TEMPLATE: &str = "index";

pub fn templates() -> anyhow::Result<Handlebars<'static>> {
    let mut hb = Handlebars::new();
    hb.register_template_string(INDEX_TEMPLATE, include_str!("../templates/index.hbs"))
        .context("register index template")?;
    Ok(hb)
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub app_name: String,
    pub providers: Vec<ProviderButton>,
    pub user: Option<UserCard>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProviderButton {
    pub name: &'static str,
    pub label: &'static str,
    pub authorize_path: String,
}

#[derive(Debug, Serialize)]
pub struct UserCard {
    pub provider: String,
    pub provider_label: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_json: String,
}

impl IndexPage {
    pub fn build(config: &Config, user: Option<&SessionUser>, query: &HomeQuery) -> Self {
        let providers = config
            .enabled_providers()
            .into_iter()
            .map(|id| ProviderButton {
                name: id.as_str(),
                label: id.display_name(),
                authorize_path: id.authorize_path(),
            })
            .collect();

        Self {
            app_name: config.app_name.clone(),
            providers,
            user: user.map(UserCard::from),
            error: error_message(query),
        }
    }
}

impl From<&SessionUser> for UserCard {
    fn from(user: &SessionUser) -> Self {
        let provider_label = ProviderId::parse(&user.provider)
            .map(|id| id.display_name().to_string())
            .unwrap_or_else(|| user.provider.clone());

        Self {
            provider: user.provider.clone(),
            provider_label,
            display_name: user.display_name().map(str::to_string),
            avatar_url: user.avatar_url().map(str::to_string),
            profile_json: serde_json::to_string_pretty(&user.data).unwrap_or_default(),
        }
    }
}

/// Human-readable banner for the `error` query parameter set by failed sign-ins.
pub fn error_message(query: &HomeQuery) -> Option<String> {
    let code = query.error.as_deref()?;
    let provider = query
        .provider
        .as_deref()
        .map(|p| ProviderId::parse(p).map(|id| id.display_name()).unwrap_or(p));

    let message = match code {
        "provider_not_supported" => "That sign-in provider is not configured on this server.".to_string(),
        "oauth_failed" => {
            let mut msg = match provider {
                Some(p) => format!("Sign-in with {p} failed"),
                None => "Sign-in failed".to_string(),
            };
            if let Some(details) = query.details.as_deref().filter(|d| !d.is_empty()) {
                msg.push_str(": ");
                msg.push_str(details);
            }
            msg
        }
        other => format!("Error: {other}"),
    };
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(error: Option<&str>, provider: Option<&str>, details: Option<&str>) -> HomeQuery {
        HomeQuery {
            error: error.map(Into::into),
            provider: provider.map(Into::into),
            details: details.map(Into::into),
        }
    }

    #[test]
    fn no_error_without_query() {
        assert_eq!(error_message(&HomeQuery::default()), None);
    }

    #[test]
    fn oauth_failure_names_provider_and_details() {
        let msg = error_message(&query(Some("oauth_failed"), Some("linuxdo"), Some("access_denied"))).unwrap();
        assert_eq!(msg, "Sign-in with Linux.do failed: access_denied");
    }

    #[test]
    fn unknown_error_codes_pass_through() {
        let msg = error_message(&query(Some("weird"), None, None)).unwrap();
        assert_eq!(msg, "Error: weird");
    }

    #[test]
    fn page_escapes_untrusted_text() {
        let hb = templates().unwrap();
        let config = Config::new("http://127.0.0.1:8000").with_provider(ProviderId::Gitee, "a", "b");
        let page = IndexPage::build(
            &config,
            None,
            &query(Some("oauth_failed"), Some("gitee"), Some("<script>alert(1)</script>")),
        );

        let html = hb.render(INDEX_TEMPLATE, &page).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("/api/v1/oauth2/gitee/authorize"));
    }

    #[test]
    fn signed_in_page_shows_profile() {
        let hb = templates().unwrap();
        let config = Config::new("http://127.0.0.1:8000");
        let user = SessionUser::new(
            "wechat_open",
            json!({"nickname": "小明", "headimgurl": "https://wx.qlogo.cn/x.png"}).as_object().cloned().unwrap(),
        );

        let html = hb.render(INDEX_TEMPLATE, &IndexPage::build(&config, Some(&user), &HomeQuery::default())).unwrap();
        assert!(html.contains("Signed in as 小明"));
        assert!(html.contains("WeChat Open Platform"));
        assert!(html.contains("/logout"));
    }
}
