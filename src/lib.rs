//! # Lumberjack
//!
//! A logging facade for processes that report to a local collector service.
//!
//! ## Features
//!
//! - **Two thresholds**: one gate for backend delivery, one for console echo
//! - **Correlatable entries**: every entry carries an id, a timestamp, the
//!   process id and the device id
//! - **Tag amendment**: tags can be attached after an entry was sent
//! - **Non-blocking delivery**: a bounded queue feeds a backend worker thread
//! - **Inbound stream**: messages pushed by the backend reach a user handler
//!
//! ```
//! use lumberjack::backends::MemoryBackend;
//! use lumberjack::prelude::*;
//!
//! let backend = MemoryBackend::new();
//! let lj = Lumberjack::builder().backend(backend.clone()).build();
//!
//! let id = lj.append_tagged(Severity::Error, "disk full", ["storage"]);
//! lj.append_tag(&id, "retry-scheduled");
//! lj.flush();
//!
//! assert_eq!(backend.sent().len(), 2);
//! ```

pub mod backends;
pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::backends::TcpBackend;
    pub use crate::core::{
        Backend, BackendStatus, ConnectionStatus, EntryKind, Identity, LogEntry, Lumberjack,
        LumberjackBuilder, LumberjackConfig, LumberjackError, LumberjackMetrics, OutputFormat,
        Payload, Result, Severity, Sink, TimestampFormat,
    };
    pub use crate::sinks::ConsoleSink;
}

pub use crate::core::facade::version;
pub use crate::core::{
    Backend, BackendStatus, ConnectionStatus, ConsoleConfig, EntryKind, Identity, InboundHandler,
    LogEntry, Lumberjack, LumberjackBuilder, LumberjackConfig, LumberjackError, LumberjackMetrics,
    OutputFormat, Payload, Result, Severity, Sink, TagAmendment, TimestampFormat,
    DEFAULT_SHUTDOWN_TIMEOUT, VERSION,
};
