//! Logging macros with `format!`-style arguments.
//!
//! Each macro expands to [`Lumberjack::append`](crate::Lumberjack::append)
//! and evaluates to the entry id.
//!
//! # Examples
//!
//! ```
//! use lumberjack::backends::MemoryBackend;
//! use lumberjack::prelude::*;
//! use lumberjack::{error, info};
//!
//! let lj = Lumberjack::builder().backend(MemoryBackend::new()).build();
//!
//! info!(lj, "Server started");
//!
//! let port = 8080;
//! let id = error!(lj, "Bind failed on port {}", port);
//! assert!(!id.is_empty());
//! ```

/// Append an entry at an explicit severity.
///
/// # Examples
///
/// ```
/// # use lumberjack::prelude::*;
/// # let lj = Lumberjack::builder().backend(lumberjack::backends::MemoryBackend::new()).build();
/// use lumberjack::log;
/// log!(lj, Severity::Info, "Simple message");
/// log!(lj, Severity::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($lj:expr, $severity:expr, $($arg:tt)+) => {
        $lj.append($severity, format!($($arg)+))
    };
}

#[macro_export]
macro_rules! trace {
    ($lj:expr, $($arg:tt)+) => {
        $crate::log!($lj, $crate::Severity::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($lj:expr, $($arg:tt)+) => {
        $crate::log!($lj, $crate::Severity::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($lj:expr, $($arg:tt)+) => {
        $crate::log!($lj, $crate::Severity::Info, $($arg)+)
    };
}

/// Append a warning-level entry.
///
/// ```
/// # use lumberjack::prelude::*;
/// # let lj = Lumberjack::builder().backend(lumberjack::backends::MemoryBackend::new()).build();
/// use lumberjack::warning;
/// warning!(lj, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($lj:expr, $($arg:tt)+) => {
        $crate::log!($lj, $crate::Severity::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($lj:expr, $($arg:tt)+) => {
        $crate::log!($lj, $crate::Severity::Error, $($arg)+)
    };
}

/// Append a critical-level entry.
///
/// ```
/// # use lumberjack::prelude::*;
/// # let lj = Lumberjack::builder().backend(lumberjack::backends::MemoryBackend::new()).build();
/// use lumberjack::critical;
/// critical!(lj, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! critical {
    ($lj:expr, $($arg:tt)+) => {
        $crate::log!($lj, $crate::Severity::Critical, $($arg)+)
    };
}
