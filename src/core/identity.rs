//! Device and process identity

use super::error::{LumberjackError, Result};
use std::fs;
use std::path::Path;

/// Well-known machine identity file on Linux hosts
pub const DEFAULT_DEVICE_ID_PATH: &str = "/etc/machine-id";

/// Identity fields stamped on every entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    device_id: String,
    process_id: String,
}

impl Identity {
    pub fn new(device_id: impl Into<String>, process_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            process_id: process_id.into(),
        }
    }

    /// Read the device id from `path` and derive the process id.
    ///
    /// Never fails: when the identity file cannot be used the device id is
    /// empty and the reason is returned alongside for the caller to report.
    pub fn detect(path: impl AsRef<Path>) -> (Self, Option<LumberjackError>) {
        let process_id = process_id();
        match read_device_id(path) {
            Ok(device_id) => (Self::new(device_id, process_id), None),
            Err(e) => (Self::new(String::new(), process_id), Some(e)),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn process_id(&self) -> &str {
        &self.process_id
    }
}

/// Read and trim a machine identity file
pub fn read_device_id(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let raw = fs::read_to_string(path)
        .map_err(|e| LumberjackError::identity_unavailable(&display, "cannot read identity file", Some(e)))?;

    let id = raw.trim();
    if id.is_empty() {
        return Err(LumberjackError::identity_unavailable(
            display,
            "identity file is empty",
            None,
        ));
    }

    Ok(id.to_string())
}

/// Human-readable identifier of the current process
pub fn process_id() -> String {
    std::process::id().to_string()
}
