//! The `Lumberjack` facade

use super::{
    backend::Backend,
    config::LumberjackConfig,
    connector::{BackendConnector, ConnectorOptions, DEFAULT_SHUTDOWN_TIMEOUT},
    entry_builder::EntryBuilder,
    error::{LumberjackError, Result},
    identity::Identity,
    log_entry::{LogEntry, TagAmendment},
    metrics::LumberjackMetrics,
    payload::{InboundHandler, Payload},
    retention::{RetentionWindow, TagOutcome},
    severity::Severity,
    sink::Sink,
    status::{BackendStatus, ConnectionStatus},
    threshold::ThresholdGate,
};
use crate::backends::TcpBackend;
use crate::sinks::ConsoleSink;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Crate version reported by [`Lumberjack::version`]
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build hash injected at compile time through `LUMBERJACK_BUILD_HASH`
pub fn build_hash() -> &'static str {
    match option_env!("LUMBERJACK_BUILD_HASH") {
        Some(hash) if !hash.is_empty() => hash,
        _ => "unknown",
    }
}

/// Version string in the form `version: <major.minor.patch>, hash: <build-hash>`
pub fn version() -> String {
    format!("version: {}, hash: {}", VERSION, build_hash())
}

/// Application-facing logger.
///
/// Construction connects to the backend but never fails: with an unreachable
/// backend the status is `Err`, entries are still built, printed and retained,
/// and delivery attempts are dropped until [`reconnect`](Self::reconnect)
/// succeeds.
///
/// `Lumberjack` is `Send + Sync`; share it behind an `Arc` to log from
/// several threads.
pub struct Lumberjack {
    builder: EntryBuilder,
    gate: ThresholdGate,
    retention: Mutex<RetentionWindow>,
    print_sink: Mutex<Box<dyn Sink>>,
    connector: BackendConnector,
    metrics: Arc<LumberjackMetrics>,
}

impl Lumberjack {
    /// Facade with default settings plus `LUMBERJACK_*` environment
    /// overrides, delivering to the TCP collector at the configured address.
    #[must_use]
    pub fn new() -> Self {
        let (config, rejected) = LumberjackConfig::from_env_lenient();
        for e in rejected {
            tracing::warn!(error = %e, "ignoring invalid LUMBERJACK_* variable");
        }
        Self::from_config(config)
    }

    #[must_use]
    pub fn from_config(config: LumberjackConfig) -> Self {
        LumberjackBuilder::new().config(config).build()
    }

    #[must_use]
    pub fn builder() -> LumberjackBuilder {
        LumberjackBuilder::new()
    }

    /// Append an untagged entry. Returns its id, or an empty string when the
    /// entry could not be built.
    pub fn append(&self, severity: Severity, message: impl Into<String>) -> String {
        self.append_from(severity, message, None, Vec::<String>::new())
    }

    pub fn append_tagged<I, T>(&self, severity: Severity, message: impl Into<String>, tags: I) -> String
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.append_from(severity, message, None, tags)
    }

    /// Append an entry attributed to `module`
    pub fn append_from<I, T>(
        &self,
        severity: Severity,
        message: impl Into<String>,
        module: Option<&str>,
        tags: I,
    ) -> String
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        match self.try_append(severity, message, module, tags) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(error = %e, "entry rejected");
                String::new()
            }
        }
    }

    /// Like [`append_from`](Self::append_from) but reports why an entry was
    /// rejected. Delivery problems are not errors: they are counted in
    /// [`metrics`](Self::metrics) and the id is still returned.
    pub fn try_append<I, T>(
        &self,
        severity: Severity,
        message: impl Into<String>,
        module: Option<&str>,
        tags: I,
    ) -> Result<String>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let entry = self.builder.build(severity, message, module, tags)?;

        let mut delivered = false;
        if self.gate.should_deliver(severity) {
            match entry.to_payload().and_then(|payload| self.connector.deliver(payload)) {
                Ok(()) => delivered = true,
                Err(e) => tracing::trace!(id = entry.id(), error = %e, "entry not delivered"),
            }
        }

        if self.gate.should_print(severity) {
            self.print(&entry);
        }

        let id = entry.id().to_string();
        self.retention.lock().insert(entry, delivered);
        Ok(id)
    }

    /// Add a tag to a retained entry.
    ///
    /// Returns false if the id is unknown or has left the retention window.
    /// Adding a tag the entry already carries succeeds without change. When
    /// the entry had been handed to the backend, a tag amendment follows it.
    pub fn append_tag(&self, id: &str, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        let outcome = self.retention.lock().add_tag(id, &tag);

        match outcome {
            TagOutcome::Unknown => false,
            TagOutcome::AlreadyPresent => true,
            TagOutcome::Added { entry, delivered } => {
                if delivered {
                    let amendment = TagAmendment::new(&entry, tag, self.timestamp());
                    if let Err(e) = amendment
                        .to_payload()
                        .and_then(|payload| self.connector.deliver(payload))
                    {
                        tracing::debug!(id, error = %e, "tag amendment not delivered");
                    }
                }
                true
            }
        }
    }

    /// Snapshot of a retained entry
    pub fn entry(&self, id: &str) -> Option<LogEntry> {
        self.retention.lock().get(id).cloned()
    }

    /// Last known backend connection state
    pub fn status(&self) -> ConnectionStatus {
        self.connector.status()
    }

    /// Ask the backend for its live state
    pub fn refresh_status(&self) -> ConnectionStatus {
        self.connector.refresh_status()
    }

    /// One more connect attempt after a failure
    pub fn reconnect(&self) -> ConnectionStatus {
        self.connector.connect()
    }

    /// Like [`reconnect`](Self::reconnect) but reports a failed attempt as
    /// a `ConnectionError`
    pub fn try_reconnect(&self) -> Result<()> {
        match self.connector.connect() {
            ConnectionStatus::Ok => Ok(()),
            ConnectionStatus::Incompatible => Err(LumberjackError::connection(format!(
                "{} backend reported an incompatible version",
                self.connector.backend_name()
            ))),
            status => Err(LumberjackError::connection(format!(
                "{} backend unreachable (status: {})",
                self.connector.backend_name(),
                status
            ))),
        }
    }

    /// Start or stop inbound streaming
    pub fn set_streaming(&self, enabled: bool) -> bool {
        self.connector.set_streaming(enabled) == BackendStatus::Ok
    }

    pub fn version(&self) -> String {
        version()
    }

    /// Seconds since epoch, never lower than a previous reading
    pub fn timestamp(&self) -> f64 {
        self.builder.clock().now()
    }

    pub fn set_log_level(&self, level: Severity) -> bool {
        self.gate.set_log_level(level);
        true
    }

    pub fn set_print_level(&self, level: Severity) -> bool {
        self.gate.set_print_level(level);
        true
    }

    /// Set the log level by name; false for unknown names
    pub fn set_log_level_str(&self, level: &str) -> bool {
        level.parse().map(|level| self.set_log_level(level)).unwrap_or(false)
    }

    /// Set the print level by name; false for unknown names
    pub fn set_print_level_str(&self, level: &str) -> bool {
        level.parse().map(|level| self.set_print_level(level)).unwrap_or(false)
    }

    pub fn log_level(&self) -> Severity {
        self.gate.log_level()
    }

    pub fn print_level(&self) -> Severity {
        self.gate.print_level()
    }

    pub fn identity(&self) -> &Identity {
        self.builder.identity()
    }

    pub fn metrics(&self) -> &LumberjackMetrics {
        &self.metrics
    }

    /// Wait until queued entries reached the backend and flush the print sink
    pub fn flush(&self) -> bool {
        let drained = self.connector.flush(DEFAULT_SHUTDOWN_TIMEOUT);
        if let Err(e) = self.print_sink.lock().flush() {
            tracing::warn!(error = %e, "print sink flush failed");
        }
        drained
    }

    /// Wait for the delivery queue, then count entries that never reached the backend
    fn drain(&self) -> u64 {
        if !self.connector.flush(DEFAULT_SHUTDOWN_TIMEOUT) {
            tracing::debug!("delivery queue not drained within shutdown timeout");
        }
        self.metrics.dropped() + self.metrics.send_failures()
    }

    fn print(&self, entry: &LogEntry) {
        let mut sink = self.print_sink.lock();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.write(entry)));

        match result {
            Ok(Ok(())) => {
                self.metrics.record_printed();
            }
            Ok(Err(e)) => {
                self.metrics.record_print_failure();
                tracing::warn!(sink = sink.name(), error = %e, "print sink failed");
            }
            Err(panic_info) => {
                self.metrics.record_print_failure();
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                tracing::error!(sink = sink.name(), panic = %panic_msg, "print sink panicked");
            }
        }
    }
}

impl Default for Lumberjack {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lumberjack {
    fn drop(&mut self) {
        if let Err(e) = self.print_sink.get_mut().flush() {
            tracing::warn!(error = %e, "print sink flush failed during shutdown");
        }

        let lost = self.drain();
        if lost > 0 {
            tracing::warn!(
                lost,
                loss_rate = self.metrics.loss_rate(),
                "shutting down with undelivered entries"
            );
        }
    }
}

/// Builder for constructing a [`Lumberjack`] with a fluent API
///
/// # Example
/// ```
/// use lumberjack::backends::MemoryBackend;
/// use lumberjack::prelude::*;
///
/// let lj = Lumberjack::builder()
///     .backend(MemoryBackend::new())
///     .log_level(Severity::Info)
///     .print_level(Severity::Critical)
///     .on_inbound(|payload| println!("inbound {} bytes", payload.len()))
///     .build();
///
/// assert_eq!(lj.status(), ConnectionStatus::Ok);
/// ```
pub struct LumberjackBuilder {
    config: LumberjackConfig,
    backend: Option<Box<dyn Backend>>,
    print_sink: Option<Box<dyn Sink>>,
    on_inbound: Option<InboundHandler>,
    identity: Option<Identity>,
}

impl LumberjackBuilder {
    pub fn new() -> Self {
        Self {
            config: LumberjackConfig::default(),
            backend: None,
            print_sink: None,
            on_inbound: None,
            identity: None,
        }
    }

    /// Replace every setting with `config`
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LumberjackConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_level(mut self, level: Severity) -> Self {
        self.config.log_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn print_level(mut self, level: Severity) -> Self {
        self.config.print_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn retention_capacity(mut self, capacity: usize) -> Self {
        self.config.retention_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_ms = timeout.as_millis().max(1) as u64;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn device_id_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.device_id_path = path.into();
        self
    }

    /// Use a fixed identity instead of reading the identity file
    #[must_use = "builder methods return a new value"]
    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Backend to connect to. Defaults to a [`TcpBackend`] for the
    /// configured `backend_addr`.
    #[must_use = "builder methods return a new value"]
    pub fn backend<B: Backend + 'static>(mut self, backend: B) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Destination for printed entries. Defaults to a [`ConsoleSink`].
    #[must_use = "builder methods return a new value"]
    pub fn print_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.print_sink = Some(Box::new(sink));
        self
    }

    /// Handler for inbound backend messages and data blobs. Runs on the
    /// backend's delivery thread.
    #[must_use = "builder methods return a new value"]
    pub fn on_inbound<F>(mut self, handler: F) -> Self
    where
        F: Fn(Payload) + Send + Sync + 'static,
    {
        self.on_inbound = Some(Arc::new(handler));
        self
    }

    /// Build the facade and attempt the initial connection
    pub fn build(self) -> Lumberjack {
        let config = self.config;

        let (identity, identity_warning) = match self.identity {
            Some(identity) => (identity, None),
            None => Identity::detect(&config.device_id_path),
        };

        let backend: Box<dyn Backend> = match self.backend {
            Some(backend) => backend,
            None => Box::new(
                TcpBackend::new(config.backend_addr.clone()).with_timeout(config.connect_timeout()),
            ),
        };

        let print_sink: Box<dyn Sink> = match self.print_sink {
            Some(sink) => sink,
            None => Box::new(
                ConsoleSink::with_colors(config.console.colors)
                    .with_output_format(config.console.format.clone())
                    .with_timestamp_format(config.console.timestamp_format.clone()),
            ),
        };

        let metrics = Arc::new(LumberjackMetrics::new());
        let connector = BackendConnector::spawn(
            backend,
            ConnectorOptions {
                queue_capacity: config.queue_capacity,
                connect_timeout: config.connect_timeout(),
            },
            self.on_inbound,
            Arc::clone(&metrics),
        );

        let lumberjack = Lumberjack {
            builder: EntryBuilder::new(identity),
            gate: ThresholdGate::new(config.log_level, config.print_level),
            retention: Mutex::new(RetentionWindow::new(config.retention_capacity)),
            print_sink: Mutex::new(print_sink),
            connector,
            metrics,
        };

        let status = lumberjack.connector.connect();
        tracing::debug!(
            backend = lumberjack.connector.backend_name(),
            %status,
            "lumberjack initialized"
        );

        if let Some(warning) = identity_warning {
            tracing::warn!(error = %warning, "device identity unavailable");
            lumberjack.append_from(
                Severity::Warning,
                warning.to_string(),
                Some("lumberjack"),
                ["identity"],
            );
        }

        lumberjack
    }
}

impl Default for LumberjackBuilder {
    fn default() -> Self {
        Self::new()
    }
}
