//! Error types for the logging facade

use super::status::ConnectionStatus;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, LumberjackError>;

#[derive(Debug, thiserror::Error)]
pub enum LumberjackError {
    /// Bad severity, unknown entry id, malformed level name
    #[error("Invalid argument '{what}': {message}")]
    InvalidArgument { what: String, message: String },

    /// Backend unreachable or connect failed
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Connect attempt did not complete in time
    #[error("Connect attempt timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Delivery attempted while the connection is not usable
    #[error("Not connected to backend (status: {status})")]
    NotConnected { status: ConnectionStatus },

    /// Host identity file missing or unreadable (non-fatal)
    #[error("Device identity unavailable from '{path}': {message}")]
    IdentityUnavailable {
        path: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Delivery queue full
    #[error("Delivery queue full ({capacity} payloads buffered)")]
    QueueFull { capacity: usize },

    /// Connector worker is gone
    #[error("Backend worker stopped")]
    WorkerStopped,

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    Config { component: String, message: String },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LumberjackError {
    pub fn invalid_argument(what: impl Into<String>, message: impl Into<String>) -> Self {
        LumberjackError::InvalidArgument {
            what: what.into(),
            message: message.into(),
        }
    }

    pub fn connection<S: Into<String>>(msg: S) -> Self {
        LumberjackError::ConnectionError(msg.into())
    }

    pub fn identity_unavailable(
        path: impl Into<String>,
        message: impl Into<String>,
        source: Option<std::io::Error>,
    ) -> Self {
        LumberjackError::IdentityUnavailable {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LumberjackError::Config {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Whether the condition is only a warning (the operation still completed)
    pub fn is_warning(&self) -> bool {
        matches!(self, LumberjackError::IdentityUnavailable { .. })
    }
}
