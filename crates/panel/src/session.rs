//! Login state: whether the current user may act on relays.

use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::error::{PanelError, Result};

/// Session returned by a passive login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl SessionInfo {
    /// Payload of the push socket's auth frame, `name:session`.
    pub fn socket_auth(&self) -> Option<String> {
        match (&self.name, &self.session) {
            (Some(name), Some(session)) => Some(format!("{}:{}", name, session)),
            _ => None,
        }
    }

    pub fn login_state(&self) -> LoginState {
        LoginState::new(self.active && self.name.is_some())
    }
}

/// The "is user allowed to act" signal. Clicks are ignored while false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoginState {
    is_user: bool,
}

impl LoginState {
    pub fn new(is_user: bool) -> Self {
        Self { is_user }
    }

    pub fn can_act(&self) -> bool {
        self.is_user
    }
}

/// Passive login with the configured API key.
pub async fn login(config: &Config) -> Result<SessionInfo> {
    let client = reqwest::Client::new();
    let res = client
        .post(config.login_url())
        .bearer_auth(&config.api_key)
        .json(&json!({ "passive": true }))
        .send()
        .await?;
    let status = res.status();
    if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(PanelError::LoginRejected);
    }
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(PanelError::Status { status, body });
    }
    let info: SessionInfo = res.json().await?;
    tracing::info!(user = ?info.name, "logged in");
    Ok(info)
}

/// Log in again after the push channel dropped our session. A rejected
/// login yields an anonymous session; any other failure yields `None` and
/// the caller keeps the session it had.
pub async fn relogin(config: &Config) -> Option<SessionInfo> {
    match login(config).await {
        Ok(info) => Some(info),
        Err(PanelError::LoginRejected) => {
            tracing::warn!("Login rejected, panel is read-only");
            Some(SessionInfo::default())
        }
        Err(e) => {
            tracing::warn!("Re-login failed: {}", e);
            None
        }
    }
}
