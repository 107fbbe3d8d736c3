//! Backend connector
//!
//! Owns the backend on a dedicated worker thread. Entries reach the worker
//! through a bounded queue so `deliver` never waits on the backend; control
//! operations (connect, status refresh, streaming toggle, flush) travel the
//! same queue and are bounded by the connect timeout.

use super::{
    backend::Backend,
    error::{LumberjackError, Result},
    metrics::LumberjackMetrics,
    payload::{InboundHandler, Payload},
    status::{BackendStatus, ConnectionStatus},
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default bound for one connect attempt
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of payloads buffered ahead of the backend
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Time the connector waits for queued payloads to drain when dropped
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

enum Command {
    Connect { reply: Sender<ConnectionStatus> },
    Deliver(Payload),
    Refresh { reply: Sender<ConnectionStatus> },
    Streaming { enabled: bool, reply: Sender<BackendStatus> },
    Flush { reply: Sender<()> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorOptions {
    pub queue_capacity: usize,
    pub connect_timeout: Duration,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

pub struct BackendConnector {
    sender: Option<Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
    status: Arc<RwLock<ConnectionStatus>>,
    metrics: Arc<LumberjackMetrics>,
    options: ConnectorOptions,
    backend_name: String,
}

impl BackendConnector {
    /// Move `backend` onto a worker thread. Does not connect.
    ///
    /// If the worker cannot be started the connector stays usable but every
    /// operation reports `Err` / `WorkerStopped`.
    pub fn spawn(
        backend: Box<dyn Backend>,
        options: ConnectorOptions,
        inbound: Option<InboundHandler>,
        metrics: Arc<LumberjackMetrics>,
    ) -> Self {
        let capacity = options.queue_capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        let status = Arc::new(RwLock::new(ConnectionStatus::NoInit));
        let backend_name = backend.name().to_string();

        let inbound = inbound.map(|handler| {
            let metrics = Arc::clone(&metrics);
            let counted: InboundHandler = Arc::new(move |payload| {
                metrics.record_inbound();
                handler(payload)
            });
            counted
        });

        let worker = Worker {
            backend,
            status: Arc::clone(&status),
            metrics: Arc::clone(&metrics),
            inbound,
            callback_registered: false,
            streaming: false,
        };

        let spawned = thread::Builder::new()
            .name("lumberjack-backend".to_string())
            .spawn(move || worker.run(receiver));

        let (sender, worker) = match spawned {
            Ok(handle) => (Some(sender), Some(handle)),
            Err(e) => {
                tracing::error!(error = %e, "failed to start backend worker thread");
                *status.write() = ConnectionStatus::Err;
                (None, None)
            }
        };

        Self {
            sender,
            worker,
            status,
            metrics,
            options: ConnectorOptions {
                queue_capacity: capacity,
                ..options
            },
            backend_name,
        }
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Last known connection state
    #[inline]
    pub fn status(&self) -> ConnectionStatus {
        *self.status.read()
    }

    /// Payloads waiting for the worker
    pub fn queued(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    /// One bounded connect attempt. No automatic retry.
    pub fn connect(&self) -> ConnectionStatus {
        match self.request(|reply| Command::Connect { reply }) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(backend = %self.backend_name, error = %e, "backend connect failed");
                self.mark_unanswered()
            }
        }
    }

    /// Record a connect request the worker did not answer in time. A worker
    /// that finished the attempt late has already stored `Ok`, which stands.
    fn mark_unanswered(&self) -> ConnectionStatus {
        let mut status = self.status.write();
        if !status.is_ok() {
            *status = ConnectionStatus::Err;
        }
        *status
    }

    /// Ask the backend for its live status and update the cache. Falls back
    /// to the cached value if the worker does not answer in time.
    pub fn refresh_status(&self) -> ConnectionStatus {
        self.request(|reply| Command::Refresh { reply })
            .unwrap_or_else(|_| self.status())
    }

    pub fn set_streaming(&self, enabled: bool) -> BackendStatus {
        self.request(|reply| Command::Streaming { enabled, reply })
            .unwrap_or(BackendStatus::Timeout)
    }

    /// Queue a payload for the backend without blocking
    pub fn deliver(&self, payload: Payload) -> Result<()> {
        let status = self.status();
        if !status.is_ok() {
            self.metrics.record_not_connected();
            return Err(LumberjackError::NotConnected { status });
        }

        let Some(sender) = &self.sender else {
            self.metrics.record_dropped();
            return Err(LumberjackError::WorkerStopped);
        };

        match sender.try_send(Command::Deliver(payload)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                let dropped = self.metrics.record_dropped();
                // Alert on first drop and periodically thereafter
                if dropped == 0 || (dropped + 1) % 1000 == 0 {
                    tracing::warn!(
                        backend = %self.backend_name,
                        dropped = dropped + 1,
                        capacity = self.options.queue_capacity,
                        "delivery queue full, dropping payloads"
                    );
                }
                Err(LumberjackError::QueueFull {
                    capacity: self.options.queue_capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => {
                self.metrics.record_dropped();
                Err(LumberjackError::WorkerStopped)
            }
        }
    }

    /// Wait until everything queued so far was handed to the backend
    pub fn flush(&self, timeout: Duration) -> bool {
        let Some(sender) = &self.sender else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        let (reply, done) = bounded(1);
        if sender
            .send_deadline(Command::Flush { reply }, deadline)
            .is_err()
        {
            return false;
        }
        done.recv_deadline(deadline).is_ok()
    }

    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> Command) -> Result<T> {
        let sender = self.sender.as_ref().ok_or(LumberjackError::WorkerStopped)?;
        let timeout = self.options.connect_timeout;
        let deadline = Instant::now() + timeout;

        let (reply, answer) = bounded(1);
        sender
            .send_deadline(make(reply), deadline)
            .map_err(|e| match e {
                crossbeam_channel::SendTimeoutError::Timeout(_) => {
                    LumberjackError::ConnectTimeout(timeout)
                }
                crossbeam_channel::SendTimeoutError::Disconnected(_) => {
                    LumberjackError::WorkerStopped
                }
            })?;

        answer.recv_deadline(deadline).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => LumberjackError::ConnectTimeout(timeout),
            crossbeam_channel::RecvTimeoutError::Disconnected => LumberjackError::WorkerStopped,
        })
    }
}

impl Drop for BackendConnector {
    fn drop(&mut self) {
        // Closing the queue lets the worker drain and tear down the backend
        drop(self.sender.take());

        if let Some(handle) = self.worker.take() {
            let start = Instant::now();
            loop {
                if handle.is_finished() {
                    if handle.join().is_err() {
                        tracing::error!(backend = %self.backend_name, "backend worker panicked during shutdown");
                    }
                    break;
                }

                if start.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT {
                    tracing::warn!(
                        backend = %self.backend_name,
                        timeout = ?DEFAULT_SHUTDOWN_TIMEOUT,
                        "backend worker did not finish in time, queued payloads may be lost"
                    );
                    break;
                }

                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

struct Worker {
    backend: Box<dyn Backend>,
    status: Arc<RwLock<ConnectionStatus>>,
    metrics: Arc<LumberjackMetrics>,
    inbound: Option<InboundHandler>,
    callback_registered: bool,
    streaming: bool,
}

impl Worker {
    fn run(mut self, receiver: Receiver<Command>) {
        for command in receiver.iter() {
            match command {
                Command::Connect { reply } => {
                    let status = self.connect();
                    let _ = reply.send(status);
                }
                Command::Deliver(payload) => self.deliver(&payload),
                Command::Refresh { reply } => {
                    let status = ConnectionStatus::from(self.backend.status());
                    *self.status.write() = status;
                    let _ = reply.send(status);
                }
                Command::Streaming { enabled, reply } => {
                    let status = self.backend.set_streaming_state(enabled);
                    if status.is_ok() {
                        self.streaming = enabled;
                    }
                    let _ = reply.send(status);
                }
                Command::Flush { reply } => {
                    let _ = reply.send(());
                }
            }
        }

        self.shutdown();
    }

    fn connect(&mut self) -> ConnectionStatus {
        let result = self.backend.connect();
        let status = ConnectionStatus::from(result);

        if status.is_ok() {
            if let Some(handler) = &self.inbound {
                let registered = self.backend.register_callback(Some(Arc::clone(handler)));
                if registered.is_ok() {
                    self.callback_registered = true;
                    let streaming = self.backend.set_streaming_state(true);
                    self.streaming = streaming.is_ok();
                    if !self.streaming {
                        tracing::warn!(backend = %self.backend.name(), status = %streaming, "could not enable streaming");
                    }
                } else {
                    tracing::warn!(backend = %self.backend.name(), status = %registered, "could not register inbound handler");
                }
            }
        } else {
            tracing::warn!(backend = %self.backend.name(), status = %result, "backend refused connection");
        }

        *self.status.write() = status;
        status
    }

    fn deliver(&mut self, payload: &Payload) {
        // The connection may have been lost after this payload was queued
        if !self.status.read().is_ok() {
            self.metrics.record_not_connected();
            return;
        }

        match self.backend.send_message(payload) {
            BackendStatus::Ok => {
                self.metrics.record_delivered();
            }
            BackendStatus::Timeout => {
                self.metrics.record_send_failure();
                tracing::debug!(backend = %self.backend.name(), "backend send timed out");
            }
            status @ (BackendStatus::Error | BackendStatus::Incompatible) => {
                self.metrics.record_send_failure();
                let connection = ConnectionStatus::from(status);
                *self.status.write() = connection;
                tracing::warn!(backend = %self.backend.name(), %status, "backend rejected payload, connection marked {}", connection);
            }
        }
    }

    fn shutdown(&mut self) {
        if self.streaming {
            let _ = self.backend.set_streaming_state(false);
            self.streaming = false;
        }
        if self.callback_registered {
            let _ = self.backend.register_callback(None);
            self.callback_registered = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;

    fn spawn(backend: &MemoryBackend, options: ConnectorOptions) -> BackendConnector {
        BackendConnector::spawn(
            Box::new(backend.clone()),
            options,
            None,
            Arc::new(LumberjackMetrics::new()),
        )
    }

    #[test]
    fn test_status_before_connect() {
        let backend = MemoryBackend::new();
        let connector = spawn(&backend, ConnectorOptions::default());
        assert_eq!(connector.status(), ConnectionStatus::NoInit);

        let err = connector.deliver(Payload::from("x")).unwrap_err();
        assert!(matches!(
            err,
            LumberjackError::NotConnected {
                status: ConnectionStatus::NoInit
            }
        ));
    }

    #[test]
    fn test_connect_and_deliver_in_order() {
        let backend = MemoryBackend::new();
        let connector = spawn(&backend, ConnectorOptions::default());
        assert_eq!(connector.connect(), ConnectionStatus::Ok);

        for i in 0..20 {
            connector.deliver(Payload::Text(format!("m{}", i))).unwrap();
        }
        assert!(connector.flush(Duration::from_secs(5)));

        let sent: Vec<String> = backend
            .sent()
            .iter()
            .filter_map(|p| p.as_text().map(str::to_string))
            .collect();
        let expected: Vec<String> = (0..20).map(|i| format!("m{}", i)).collect();
        assert_eq!(sent, expected);
        assert_eq!(connector.metrics.delivered(), 20);
    }

    #[test]
    fn test_failed_connect_does_not_retry() {
        let backend = MemoryBackend::unreachable();
        let connector = spawn(&backend, ConnectorOptions::default());
        assert_eq!(connector.connect(), ConnectionStatus::Err);
        assert!(connector.deliver(Payload::from("x")).is_err());
        assert!(connector.flush(Duration::from_secs(5)));
        assert_eq!(backend.connect_attempts(), 1);
    }

    #[test]
    fn test_incompatible_backend() {
        let backend = MemoryBackend::with_connect_status(BackendStatus::Incompatible);
        let connector = spawn(&backend, ConnectorOptions::default());
        assert_eq!(connector.connect(), ConnectionStatus::Incompatible);
    }

    #[test]
    fn test_connect_timeout_bounds_wait() {
        let backend = MemoryBackend::new().with_connect_delay(Duration::from_millis(500));
        let connector = spawn(
            &backend,
            ConnectorOptions {
                connect_timeout: Duration::from_millis(50),
                ..ConnectorOptions::default()
            },
        );

        let start = Instant::now();
        assert_eq!(connector.connect(), ConnectionStatus::Err);
        assert!(start.elapsed() < Duration::from_millis(450));
    }

    #[test]
    fn test_late_connect_success_is_kept() {
        let backend = MemoryBackend::new().with_connect_delay(Duration::from_millis(200));
        let connector = spawn(
            &backend,
            ConnectorOptions {
                connect_timeout: Duration::from_millis(20),
                ..ConnectorOptions::default()
            },
        );

        assert_eq!(connector.connect(), ConnectionStatus::Err);

        // Worker completes the attempt after the caller gave up
        let deadline = Instant::now() + Duration::from_secs(2);
        while connector.status() != ConnectionStatus::Ok && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(connector.status(), ConnectionStatus::Ok);

        // A timed-out request arriving after that must not overwrite it
        assert_eq!(connector.mark_unanswered(), ConnectionStatus::Ok);
        assert_eq!(connector.status(), ConnectionStatus::Ok);
        assert!(connector.deliver(Payload::from("after late connect")).is_ok());
    }

    #[test]
    fn test_send_error_marks_connection() {
        let backend = MemoryBackend::new();
        let connector = spawn(&backend, ConnectorOptions::default());
        connector.connect();

        backend.set_send_status(BackendStatus::Error);
        connector.deliver(Payload::from("lost")).unwrap();
        assert!(connector.flush(Duration::from_secs(5)));

        assert_eq!(connector.status(), ConnectionStatus::Err);
        assert_eq!(connector.metrics.send_failures(), 1);
        assert!(connector.deliver(Payload::from("after")).is_err());
    }

    #[test]
    fn test_send_timeout_keeps_connection() {
        let backend = MemoryBackend::new();
        let connector = spawn(&backend, ConnectorOptions::default());
        connector.connect();

        backend.set_send_status(BackendStatus::Timeout);
        connector.deliver(Payload::from("slow")).unwrap();
        assert!(connector.flush(Duration::from_secs(5)));

        assert_eq!(connector.status(), ConnectionStatus::Ok);
        assert_eq!(connector.metrics.send_failures(), 1);
    }

    #[test]
    fn test_refresh_status() {
        let backend = MemoryBackend::new();
        let connector = spawn(&backend, ConnectorOptions::default());
        connector.connect();

        backend.drop_connection();
        assert_eq!(connector.status(), ConnectionStatus::Ok);
        assert_eq!(connector.refresh_status(), ConnectionStatus::Err);
        assert_eq!(connector.status(), ConnectionStatus::Err);
    }

    #[test]
    fn test_queue_full_fails_fast() {
        // A slow connect parks the worker while the queue fills up
        let slow = MemoryBackend::new().with_connect_delay(Duration::from_millis(300));
        let busy = spawn(
            &slow,
            ConnectorOptions {
                queue_capacity: 2,
                connect_timeout: Duration::from_millis(10),
            },
        );
        assert_eq!(busy.connect(), ConnectionStatus::Err);
        *busy.status.write() = ConnectionStatus::Ok;

        let mut full = 0;
        for i in 0..10 {
            let start = Instant::now();
            if let Err(LumberjackError::QueueFull { capacity }) =
                busy.deliver(Payload::Text(format!("m{}", i)))
            {
                assert_eq!(capacity, 2);
                full += 1;
            }
            assert!(start.elapsed() < Duration::from_millis(100));
        }
        assert!(full > 0);
        assert_eq!(busy.metrics.dropped(), full);
    }

    #[test]
    fn test_inbound_handler_registered_and_removed() {
        let backend = MemoryBackend::new();
        let metrics = Arc::new(LumberjackMetrics::new());
        let (tx, rx) = crossbeam_channel::unbounded();
        let connector = BackendConnector::spawn(
            Box::new(backend.clone()),
            ConnectorOptions::default(),
            Some(Arc::new(move |payload| {
                let _ = tx.send(payload);
            })),
            Arc::clone(&metrics),
        );

        assert_eq!(connector.connect(), ConnectionStatus::Ok);
        assert!(backend.is_streaming());
        assert!(backend.inject("device-event"));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), Payload::from("device-event"));
        assert_eq!(metrics.inbound(), 1);

        assert_eq!(connector.set_streaming(false), BackendStatus::Ok);
        assert!(!backend.inject("muted"));

        drop(connector);
        assert!(!backend.has_callback());
    }
}
