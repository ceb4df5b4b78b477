// backend/src/models.rs

use std::fmt;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ProviderId {
    GitHub,
    Google,
    FeiShu,
    Gitee,
    LinuxDo,
    OsChina,
    WeChatMp,
    WeChatOpen,
}

impl ProviderId {
    /// Every supported provider, in the order they are listed to users.
    pub const ALL: [ProviderId; 8] = [
        Self::GitHub,
        Self::Google,
        Self::FeiShu,
        Self::Gitee,
        Self::LinuxDo,
        Self::OsChina,
        Self::WeChatMp,
        Self::WeChatOpen,
    ];

    /// Accepts either the route slug (`linux-do`) or the provider name (`linuxdo`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.route_slug() == s || p.as_str() == s)
    }

    /// Name stored in the session and reported by `/api/providers`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::Google => "google",
            Self::FeiShu => "feishu",
            Self::Gitee => "gitee",
            Self::LinuxDo => "linuxdo",
            Self::OsChina => "oschina",
            Self::WeChatMp => "wechat_mp",
            Self::WeChatOpen => "wechat_open",
        }
    }

    /// Path segment under `/api/v1/oauth2/`.
    pub fn route_slug(&self) -> &'static str {
        match self {
            Self::LinuxDo => "linux-do",
            other => other.as_str(),
        }
    }

    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::GitHub => "GITHUB",
            Self::Google => "GOOGLE",
            Self::FeiShu => "FEISHU",
            Self::Gitee => "GITEE",
            Self::LinuxDo => "LINUXDO",
            Self::OsChina => "OSCHINA",
            Self::WeChatMp => "WECHAT_MP",
            Self::WeChatOpen => "WECHAT_OPEN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::GitHub => "GitHub",
            Self::Google => "Google",
            Self::FeiShu => "FeiShu",
            Self::Gitee => "Gitee",
            Self::LinuxDo => "Linux.do",
            Self::OsChina => "OSChina",
            Self::WeChatMp => "WeChat Mini Program",
            Self::WeChatOpen => "WeChat Open Platform",
        }
    }

    pub fn authorize_path(&self) -> String {
        format!("/api/v1/oauth2/{}/authorize", self.route_slug())
    }

    pub fn callback_path(&self) -> String {
        format!("/api/v1/oauth2/{}/callback", self.route_slug())
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string a provider sends back to the callback route.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Query string of the home page; set by failed sign-in redirects.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub error: Option<String>,
    pub provider: Option<String>,
    pub details: Option<String>,
}
