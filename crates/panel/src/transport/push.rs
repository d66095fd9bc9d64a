//! WebSocket client for the server's push channel.

use futures_util::{SinkExt, StreamExt};
use shared::{push_types, PushEnvelope};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, WebSocketStream};

use crate::bus::PushBus;
use crate::config::Config;
use crate::error::Result;
use crate::session::{self, LoginState, SessionInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Published,
    Ignored,
    ReauthRequired,
}

/// How a connection that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEnd {
    Closed,
    ReauthRequired,
}

/// Route one text frame: plugin messages go on the bus, the rest is dropped.
pub fn handle_frame(text: &str, bus: &PushBus) -> FrameOutcome {
    let Some(envelope) = PushEnvelope::parse(text) else {
        return FrameOutcome::Ignored;
    };
    if envelope.r#type == push_types::REAUTH_REQUIRED {
        return FrameOutcome::ReauthRequired;
    }
    match envelope.plugin_message() {
        Some(msg) => {
            bus.publish(msg);
            FrameOutcome::Published
        }
        None => FrameOutcome::Ignored,
    }
}

/// Connect, authenticate and pump frames onto `bus`, reconnecting forever.
///
/// When the server asks for re-authentication the session is renewed
/// before the next connect and `on_login` gets the renewed login state.
pub async fn run_push_client<F>(
    config: &Config,
    mut info: SessionInfo,
    bus: PushBus,
    mut on_login: F,
) where
    F: FnMut(LoginState),
{
    let url = config.push_url();
    let delay = tokio::time::Duration::from_secs(config.reconnect_secs);
    loop {
        match connect_async(&url).await {
            Ok((ws, _)) => {
                tracing::info!("Connected to push channel");
                match handle_connection(ws, info.socket_auth().as_deref(), &bus).await {
                    Ok(ConnectionEnd::ReauthRequired) => {
                        if let Some(renewed) = session::relogin(config).await {
                            on_login(renewed.login_state());
                            info = renewed;
                        }
                    }
                    Ok(ConnectionEnd::Closed) => {}
                    Err(e) => tracing::warn!("Connection error: {}", e),
                }
            }
            Err(e) => {
                tracing::warn!("Connect failed: {}, retrying in {}s", e, config.reconnect_secs);
            }
        }
        tokio::time::sleep(delay).await;
    }
}

pub async fn handle_connection<S>(
    ws: WebSocketStream<S>,
    auth: Option<&str>,
    bus: &PushBus,
) -> Result<ConnectionEnd>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut ws_tx, mut ws_rx) = ws.split();

    if let Some(auth) = auth {
        let mut frame = serde_json::Map::new();
        frame.insert(push_types::AUTH.to_string(), auth.into());
        ws_tx
            .send(Message::Text(serde_json::Value::Object(frame).to_string()))
            .await?;
    }

    while let Some(msg) = ws_rx.next().await {
        let text = match msg {
            Ok(Message::Text(t)) => t,
            Ok(Message::Close(_)) => break,
            Err(e) => return Err(e.into()),
            _ => continue,
        };
        if handle_frame(&text, bus) == FrameOutcome::ReauthRequired {
            tracing::warn!("Push channel requires re-authentication");
            return Ok(ConnectionEnd::ReauthRequired);
        }
    }

    Ok(ConnectionEnd::Closed)
}
