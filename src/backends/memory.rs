//! In-process backend
//!
//! Records every payload it accepts and lets the owner push inbound messages
//! through the registered handler. Clones share state, so a handle kept by the
//! application can inspect a backend that was moved into the facade.

use crate::core::{Backend, BackendStatus, InboundHandler, LogEntry, Payload};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct MemoryState {
    connect_status: BackendStatus,
    send_status: BackendStatus,
    connect_delay: Duration,
    connected: bool,
    connect_attempts: usize,
    sent: Vec<Payload>,
    handler: Option<InboundHandler>,
    streaming: bool,
}

/// Backend that keeps everything in memory
///
/// # Example
///
/// ```
/// use lumberjack::backends::MemoryBackend;
/// use lumberjack::prelude::*;
///
/// let backend = MemoryBackend::new();
/// let lj = Lumberjack::builder()
///     .backend(backend.clone())
///     .log_level(Severity::All)
///     .build();
///
/// lj.append(Severity::Info, "hello");
/// lj.flush();
/// assert_eq!(backend.sent_entries().len(), 1);
/// ```
#[derive(Clone)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_connect_status(BackendStatus::Ok)
    }

    /// Backend whose connect attempts always fail
    pub fn unreachable() -> Self {
        Self::with_connect_status(BackendStatus::Error)
    }

    /// Backend whose connect attempts return `status`
    pub fn with_connect_status(status: BackendStatus) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                connect_status: status,
                send_status: BackendStatus::Ok,
                connect_delay: Duration::ZERO,
                connected: false,
                connect_attempts: 0,
                sent: Vec::new(),
                handler: None,
                streaming: false,
            })),
        }
    }

    /// Make each connect attempt take `delay`
    #[must_use]
    pub fn with_connect_delay(self, delay: Duration) -> Self {
        self.state.lock().connect_delay = delay;
        self
    }

    /// Status returned by subsequent `connect` calls
    pub fn set_connect_status(&self, status: BackendStatus) {
        self.state.lock().connect_status = status;
    }

    /// Status returned by subsequent `send_message` calls. Payloads are only
    /// recorded when this is `Ok`.
    pub fn set_send_status(&self, status: BackendStatus) {
        self.state.lock().send_status = status;
    }

    /// Simulate the connection dropping
    pub fn drop_connection(&self) {
        let mut state = self.state.lock();
        state.connected = false;
        state.streaming = false;
    }

    pub fn sent(&self) -> Vec<Payload> {
        self.state.lock().sent.clone()
    }

    /// Accepted text payloads parsed as JSON
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent()
            .iter()
            .filter_map(Payload::as_text)
            .filter_map(|text| serde_json::from_str(text).ok())
            .collect()
    }

    /// Accepted payloads that are log entries (tag amendments excluded)
    pub fn sent_entries(&self) -> Vec<LogEntry> {
        self.sent()
            .iter()
            .filter_map(Payload::as_text)
            .filter_map(|text| LogEntry::from_json(text).ok())
            .filter(|entry| entry.kind() == crate::core::EntryKind::Log)
            .collect()
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.lock().connect_attempts
    }

    pub fn is_streaming(&self) -> bool {
        self.state.lock().streaming
    }

    pub fn has_callback(&self) -> bool {
        self.state.lock().handler.is_some()
    }

    /// Push an inbound payload to the registered handler on the calling
    /// thread. Returns false when streaming is off or no handler is set.
    pub fn inject(&self, payload: impl Into<Payload>) -> bool {
        let handler = {
            let state = self.state.lock();
            if !state.streaming {
                return false;
            }
            state.handler.clone()
        };

        match handler {
            Some(handler) => {
                handler(payload.into());
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn connect(&mut self) -> BackendStatus {
        let delay = self.state.lock().connect_delay;
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let mut state = self.state.lock();
        state.connect_attempts += 1;
        state.connected = state.connect_status.is_ok();
        state.connect_status
    }

    fn status(&self) -> BackendStatus {
        let state = self.state.lock();
        if state.connected {
            BackendStatus::Ok
        } else if state.connect_status == BackendStatus::Incompatible {
            BackendStatus::Incompatible
        } else {
            BackendStatus::Error
        }
    }

    fn send_message(&mut self, payload: &Payload) -> BackendStatus {
        let mut state = self.state.lock();
        if !state.connected {
            return BackendStatus::Error;
        }
        if state.send_status.is_ok() {
            state.sent.push(payload.clone());
        }
        state.send_status
    }

    fn register_callback(&mut self, handler: Option<InboundHandler>) -> BackendStatus {
        self.state.lock().handler = handler;
        BackendStatus::Ok
    }

    fn set_streaming_state(&mut self, enabled: bool) -> BackendStatus {
        let mut state = self.state.lock();
        if enabled && !state.connected {
            return BackendStatus::Error;
        }
        state.streaming = enabled;
        BackendStatus::Ok
    }

    fn name(&self) -> &str {
        "memory"
    }
}
