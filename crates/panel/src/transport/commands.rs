//! Outgoing relay commands: queued by the panel, POSTed by a dispatcher task.

use shared::PluginCommand;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::{PanelError, Result};
use crate::gate::CommandSink;

/// Non-blocking sink handed to the panel.
#[derive(Debug, Clone)]
pub struct CommandQueue(mpsc::UnboundedSender<PluginCommand>);

impl CommandSink for CommandQueue {
    fn issue(&mut self, command: PluginCommand) {
        if self.0.send(command).is_err() {
            tracing::warn!("command dispatcher gone, command dropped");
        }
    }
}

pub fn command_channel() -> (CommandQueue, mpsc::UnboundedReceiver<PluginCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandQueue(tx), rx)
}

/// HTTP client for the plugin command endpoint.
#[derive(Debug, Clone)]
pub struct CommandClient {
    http: reqwest::Client,
    config: Config,
}

impl CommandClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: config.clone(),
        }
    }

    /// POST `{"command": "update", "pin": <key>}` to the command's plugin.
    pub async fn post(&self, command: &PluginCommand) -> Result<()> {
        let res = self
            .http
            .post(self.config.plugin_url(&command.plugin))
            .bearer_auth(&self.config.api_key)
            .json(command)
            .send()
            .await?;
        let status = res.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(PanelError::Status { status, body })
        }
    }
}

/// Send queued commands one at a time, in click order. No retries.
pub async fn run_dispatcher(client: CommandClient, mut rx: mpsc::UnboundedReceiver<PluginCommand>) {
    while let Some(command) = rx.recv().await {
        tracing::info!(pin = %command.pin, verb = %command.command, "sending command");
        if let Err(e) = client.post(&command).await {
            tracing::error!(pin = %command.pin, "command failed: {}", e);
        }
    }
}
