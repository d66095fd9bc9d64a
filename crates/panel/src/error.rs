//! Errors raised at the panel's edges (configuration, HTTP, push socket).
//!
//! The reconciler and the confirmation gate never fail; they log and skip.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("{0} required")]
    MissingEnv(&'static str),

    #[error("invalid {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("login rejected by server")]
    LoginRejected,
}

pub type Result<T> = std::result::Result<T, PanelError>;
