//! Facade configuration
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change. `LUMBERJACK_*` environment variables override file values.

use super::connector::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_QUEUE_CAPACITY};
use super::error::{LumberjackError, Result};
use super::identity::DEFAULT_DEVICE_ID_PATH;
use super::output_format::OutputFormat;
use super::retention::DEFAULT_RETENTION_CAPACITY;
use super::severity::Severity;
use super::threshold::{DEFAULT_LOG_LEVEL, DEFAULT_PRINT_LEVEL};
use super::timestamp::TimestampFormat;
use crate::backends::tcp::DEFAULT_BACKEND_ADDR;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_LOG_LEVEL: &str = "LUMBERJACK_LOG_LEVEL";
pub const ENV_PRINT_LEVEL: &str = "LUMBERJACK_PRINT_LEVEL";
pub const ENV_BACKEND_ADDR: &str = "LUMBERJACK_BACKEND_ADDR";
pub const ENV_DEVICE_ID_PATH: &str = "LUMBERJACK_DEVICE_ID_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LumberjackConfig {
    /// Threshold for backend delivery
    pub log_level: Severity,

    /// Threshold for console echo
    pub print_level: Severity,

    /// Entries kept for tag amendment (0 disables amendment)
    pub retention_capacity: usize,

    /// Payloads buffered ahead of the backend
    pub queue_capacity: usize,

    /// Bound for one connect attempt, in milliseconds
    pub connect_timeout_ms: u64,

    /// Machine identity file
    pub device_id_path: PathBuf,

    /// Collector address for the default TCP backend
    pub backend_addr: String,

    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub colors: bool,
    pub format: OutputFormat,
    pub timestamp_format: TimestampFormat,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            colors: true,
            format: OutputFormat::default(),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl Default for LumberjackConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL,
            print_level: DEFAULT_PRINT_LEVEL,
            retention_capacity: DEFAULT_RETENTION_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            device_id_path: PathBuf::from(DEFAULT_DEVICE_ID_PATH),
            backend_addr: DEFAULT_BACKEND_ADDR.to_string(),
            console: ConsoleConfig::default(),
        }
    }
}

impl LumberjackConfig {
    /// Parse a JSON config document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| LumberjackError::config("config", format!("failed to parse: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            LumberjackError::config("config", format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults with every usable environment override applied. Invalid
    /// variables are skipped and returned alongside.
    pub fn from_env_lenient() -> (Self, Vec<LumberjackError>) {
        let mut config = Self::default();
        let rejected = config.apply_overrides_lenient(|key| std::env::var(key).ok());
        (config, rejected)
    }

    /// Apply `LUMBERJACK_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        match self.apply_overrides_lenient(lookup).into_iter().next() {
            Some(e) => Err(e),
            None => self.validate(),
        }
    }

    /// Apply each override on its own; a bad value leaves that field alone
    fn apply_overrides_lenient(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<LumberjackError> {
        let mut rejected = Vec::new();

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            match level.parse() {
                Ok(level) => self.log_level = level,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(level) = lookup(ENV_PRINT_LEVEL) {
            match level.parse() {
                Ok(level) => self.print_level = level,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(addr) = lookup(ENV_BACKEND_ADDR) {
            if addr.trim().is_empty() {
                rejected.push(LumberjackError::config(ENV_BACKEND_ADDR, "must not be empty"));
            } else {
                self.backend_addr = addr;
            }
        }
        if let Some(path) = lookup(ENV_DEVICE_ID_PATH) {
            self.device_id_path = PathBuf::from(path);
        }

        rejected
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LumberjackError::config("queue_capacity", "must be at least 1"));
        }
        if self.connect_timeout_ms == 0 {
            return Err(LumberjackError::config("connect_timeout_ms", "must be positive"));
        }
        if self.backend_addr.trim().is_empty() {
            return Err(LumberjackError::config("backend_addr", "must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = LumberjackConfig::default();
        assert_eq!(config.log_level, Severity::Error);
        assert_eq!(config.print_level, Severity::Warning);
        assert_eq!(config.retention_capacity, 1024);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.device_id_path, PathBuf::from("/etc/machine-id"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = LumberjackConfig::from_json_str(
            r#"{"log_level":"DEBUG","console":{"format":"logfmt"}}"#,
        )
        .unwrap();

        assert_eq!(config.log_level, Severity::Debug);
        assert_eq!(config.print_level, Severity::Warning);
        assert_eq!(config.console.format, OutputFormat::Logfmt);
        assert!(config.console.colors);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = LumberjackConfig::from_json_str(r#"{"queue_capacity":0}"#).unwrap_err();
        assert!(matches!(err, LumberjackError::Config { .. }));

        let err = LumberjackConfig::from_json_str(r#"{"log_level":"LOUD"}"#).unwrap_err();
        assert!(matches!(err, LumberjackError::Config { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_LOG_LEVEL, "all"),
            (ENV_PRINT_LEVEL, "critical"),
            (ENV_BACKEND_ADDR, "10.0.0.2:7000"),
        ]
        .into_iter()
        .collect();

        let mut config = LumberjackConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.log_level, Severity::All);
        assert_eq!(config.print_level, Severity::Critical);
        assert_eq!(config.backend_addr, "10.0.0.2:7000");
    }

    #[test]
    fn test_bad_env_level() {
        let mut config = LumberjackConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_LOG_LEVEL).then(|| "loud".to_string()))
            .unwrap_err();
        assert!(matches!(err, LumberjackError::InvalidArgument { .. }));
    }

    #[test]
    fn test_bad_env_key_keeps_the_others() {
        let vars: HashMap<&str, &str> = [
            (ENV_LOG_LEVEL, "loud"),
            (ENV_PRINT_LEVEL, "debug"),
            (ENV_BACKEND_ADDR, "10.0.0.9:6000"),
        ]
        .into_iter()
        .collect();

        let mut config = LumberjackConfig::default();
        let rejected = config.apply_overrides_lenient(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(rejected.len(), 1);
        assert!(matches!(rejected[0], LumberjackError::InvalidArgument { .. }));
        assert_eq!(config.log_level, Severity::Error);
        assert_eq!(config.print_level, Severity::Debug);
        assert_eq!(config.backend_addr, "10.0.0.9:6000");
    }

    #[test]
    fn test_empty_env_addr_skipped() {
        let mut config = LumberjackConfig::default();
        let rejected = config
            .apply_overrides_lenient(|key| (key == ENV_BACKEND_ADDR).then(|| "  ".to_string()));
        assert_eq!(rejected.len(), 1);
        assert_eq!(config.backend_addr, DEFAULT_BACKEND_ADDR);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lumberjack.json");
        let mut config = LumberjackConfig::default();
        config.retention_capacity = 16;
        std::fs::write(&path, config.to_json_pretty().unwrap()).unwrap();

        assert_eq!(LumberjackConfig::from_file(&path).unwrap(), config);
    }
}
