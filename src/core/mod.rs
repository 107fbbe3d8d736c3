//! Core facade types and traits

pub mod backend;
pub mod config;
pub mod connector;
pub mod entry_builder;
pub mod error;
pub mod facade;
pub mod identity;
pub mod log_entry;
pub mod metrics;
pub mod output_format;
pub mod payload;
pub mod retention;
pub mod severity;
pub mod sink;
pub mod status;
pub mod threshold;
pub mod timestamp;

pub use backend::Backend;
pub use config::{ConsoleConfig, LumberjackConfig};
pub use connector::{
    BackendConnector, ConnectorOptions, DEFAULT_CONNECT_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use entry_builder::EntryBuilder;
pub use error::{LumberjackError, Result};
pub use facade::{Lumberjack, LumberjackBuilder, VERSION};
pub use identity::{Identity, DEFAULT_DEVICE_ID_PATH};
pub use log_entry::{EntryKind, LogEntry, TagAmendment};
pub use metrics::LumberjackMetrics;
pub use output_format::OutputFormat;
pub use payload::{InboundHandler, Payload};
pub use retention::{RetentionWindow, TagOutcome, DEFAULT_RETENTION_CAPACITY};
pub use severity::Severity;
pub use sink::Sink;
pub use status::{BackendStatus, ConnectionStatus};
pub use threshold::{ThresholdGate, DEFAULT_LOG_LEVEL, DEFAULT_PRINT_LEVEL};
pub use timestamp::{Clock, TimestampFormat};
