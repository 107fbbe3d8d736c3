//! Connection and backend status codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Last known state of the backend connection as seen by the facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Ok,
    /// No connect attempt has completed yet
    #[default]
    NoInit,
    Err,
    /// Backend reported a version mismatch
    Incompatible,
}

impl ConnectionStatus {
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, ConnectionStatus::Ok)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Ok => write!(f, "OK"),
            ConnectionStatus::NoInit => write!(f, "NO_INIT"),
            ConnectionStatus::Err => write!(f, "ERR"),
            ConnectionStatus::Incompatible => write!(f, "INCOMPATIBLE"),
        }
    }
}

/// Status code returned by a [`Backend`](crate::core::Backend) call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackendStatus {
    Ok,
    Error,
    Timeout,
    Incompatible,
}

impl BackendStatus {
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, BackendStatus::Ok)
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendStatus::Ok => write!(f, "OK"),
            BackendStatus::Error => write!(f, "ERROR"),
            BackendStatus::Timeout => write!(f, "TIMEOUT"),
            BackendStatus::Incompatible => write!(f, "INCOMPATIBLE"),
        }
    }
}

impl From<BackendStatus> for ConnectionStatus {
    fn from(status: BackendStatus) -> Self {
        match status {
            BackendStatus::Ok => ConnectionStatus::Ok,
            BackendStatus::Incompatible => ConnectionStatus::Incompatible,
            BackendStatus::Error | BackendStatus::Timeout => ConnectionStatus::Err,
        }
    }
}
