// backend/src/session.rs

use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use dashmap::DashMap;
use oauth_demo_common::SessionUser;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::ProviderId;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "oauth_demo_session";

/// How long a started sign-in may take before its state is rejected.
pub const PENDING_LOGIN_TTL_SECS: u64 = 600;

#[derive(Clone, Debug, PartialEq)]
pub struct PendingLogin {
    pub provider: ProviderId,
    pub csrf_state: String,
    pub created_at: u64,
}

impl PendingLogin {
    pub fn is_stale(&self, now: u64) -> bool {
        now.saturating_sub(self.created_at) > PENDING_LOGIN_TTL_SECS
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionRecord {
    pub user: Option<SessionUser>,
    pub pending: Option<PendingLogin>,
    pub expires_at: u64,
}

/// Server-side session data keyed by the id in the session cookie.
/// Every write pushes the expiry `max_age` seconds forward. Expired records
/// are swept at most once per second, from request handling and new sign-ins.
pub struct SessionStore {
    records: DashMap<String, SessionRecord>,
    max_age: u64,
    last_sweep: AtomicU64,
}

impl SessionStore {
    pub fn new(max_age: u64) -> Self {
        Self {
            records: DashMap::new(),
            max_age,
            last_sweep: AtomicU64::new(0),
        }
    }

    pub fn max_age(&self) -> u64 {
        self.max_age
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of sessions that have not expired yet.
    pub fn live_len(&self) -> usize {
        self.live_len_at(now())
    }

    fn live_len_at(&self, now: u64) -> usize {
        self.records.iter().filter(|r| r.expires_at > now).count()
    }

    /// True if the session exists and has not expired. Expired entries are dropped.
    pub fn is_live(&self, id: &str) -> bool {
        let now = now();
        self.records
            .remove_if(id, |_, record| record.expires_at <= now);
        self.records.contains_key(id)
    }

    pub fn user(&self, id: &str) -> Option<SessionUser> {
        if !self.is_live(id) {
            return None;
        }
        self.records.get(id).and_then(|r| r.user.clone())
    }

    /// Records a sign-in attempt and returns the CSRF state to send to the provider.
    pub fn begin_login(&self, id: &str, provider: ProviderId) -> String {
        let csrf_state = Uuid::new_v4().simple().to_string();
        let now = now();
        self.sweep_at(now);
        let mut record = self.records.entry(id.to_string()).or_default();
        record.pending = Some(PendingLogin {
            provider,
            csrf_state: csrf_state.clone(),
            created_at: now,
        });
        record.expires_at = now + self.max_age;
        csrf_state
    }

    /// Removes and returns the in-flight sign-in, so each state is usable once.
    pub fn take_pending(&self, id: &str) -> Option<PendingLogin> {
        if !self.is_live(id) {
            return None;
        }
        self.records.get_mut(id).and_then(|mut r| r.pending.take())
    }

    /// Stores the signed-in user, replacing any previous one.
    pub fn set_user(&self, id: &str, user: SessionUser) {
        let now = now();
        let mut record = self.records.entry(id.to_string()).or_default();
        record.user = Some(user);
        record.pending = None;
        record.expires_at = now + self.max_age;
    }

    pub fn clear(&self, id: &str) {
        self.records.remove(id);
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(now())
    }

    /// Purges expired records unless a sweep already ran this second.
    pub fn sweep(&self) {
        self.sweep_at(now());
    }

    fn sweep_at(&self, now: u64) {
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now > last
            && self.last_sweep
                .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
        {
            self.purge_expired_at(now);
        }
    }

    fn purge_expired_at(&self, now: u64) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| record.expires_at > now);
        let purged = before.saturating_sub(self.records.len());
        if purged > 0 {
            debug!("purged {purged} expired sessions");
        }
        purged
    }
}

// --- Request extractor ---

/// The caller's session id. Requests without a live session cookie get a
/// fresh id, which only becomes a stored session once something is written.
#[derive(Clone, Debug)]
pub struct Session {
    id: String,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// `Set-Cookie` header value that (re)issues this session's cookie.
    pub fn cookie(&self, config: &Config) -> Result<HeaderValue, AppError> {
        let mut cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.id, config.session_max_age
        );
        if config.secure_cookies {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.into()))
    }

    pub fn removal_cookie() -> HeaderValue {
        HeaderValue::from_static("oauth_demo_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        state.sessions.sweep();
        let id = cookie_value(&parts.headers, SESSION_COOKIE)
            .filter(|id| state.sessions.is_live(id))
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Ok(Self { id })
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
