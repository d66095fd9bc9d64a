//! Configuration for the panel client.

use crate::error::{PanelError, Result};

pub const DEFAULT_PLUGIN_ID: &str = "octorelay";

/// Panel configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server base URL, without trailing slash.
    pub base_url: String,
    pub api_key: String,
    /// Identity used to filter push messages and to address commands.
    pub plugin_id: String,
    pub reconnect_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("OCTOPRINT_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
        let base_url = normalize_base_url(&base_url)?;
        let api_key = std::env::var("OCTOPRINT_API_KEY")
            .map_err(|_| PanelError::MissingEnv("OCTOPRINT_API_KEY"))?;
        let plugin_id =
            std::env::var("PANEL_PLUGIN_ID").unwrap_or_else(|_| DEFAULT_PLUGIN_ID.to_string());
        let reconnect_secs = std::env::var("PANEL_RECONNECT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        Ok(Self {
            base_url,
            api_key,
            plugin_id,
            reconnect_secs,
        })
    }

    pub fn for_test(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            plugin_id: DEFAULT_PLUGIN_ID.to_string(),
            reconnect_secs: 1,
        }
    }

    /// Raw websocket endpoint of the push channel.
    pub fn push_url(&self) -> String {
        let ws = self
            .base_url
            .replace("https://", "wss://")
            .replace("http://", "ws://");
        format!("{}/sockjs/websocket", ws)
    }

    /// Endpoint receiving this plugin's commands.
    pub fn command_url(&self) -> String {
        self.plugin_url(&self.plugin_id)
    }

    /// Command endpoint of any plugin.
    pub fn plugin_url(&self, plugin: &str) -> String {
        format!("{}/api/plugin/{}", self.base_url, plugin)
    }

    pub fn login_url(&self) -> String {
        format!("{}/api/login", self.base_url)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(PanelError::InvalidEnv {
            name: "OCTOPRINT_URL",
            value: raw.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
