use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The signed-in user as kept in the session and served by `/api/user`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub provider: String,
    pub data: Map<String, Value>,
}

impl SessionUser {
    pub fn new(provider: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            provider: provider.into(),
            data,
        }
    }

    /// Best-effort display name across the providers' profile shapes.
    pub fn display_name(&self) -> Option<&str> {
        ["name", "nickname", "login", "username", "en_name"]
            .iter()
            .find_map(|key| self.data.get(*key).and_then(Value::as_str))
            .filter(|s| !s.is_empty())
    }

    pub fn avatar_url(&self) -> Option<&str> {
        ["avatar_url", "picture", "headimgurl", "avatar", "avatar_template"]
            .iter()
            .find_map(|key| self.data.get(*key).and_then(Value::as_str))
            .filter(|s| s.starts_with("http"))
    }
}

// Body of `/api/providers`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvidersResponse {
    pub providers: Vec<String>,
    pub count: usize,
}

impl ProvidersResponse {
    pub fn new(providers: Vec<String>) -> Self {
        let count = providers.len();
        Self { providers, count }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
