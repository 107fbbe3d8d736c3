//! TCP line backend
//!
//! Writes each text payload as one line to a remote collector and streams
//! every line the collector sends back to the inbound handler.

use crate::core::{Backend, BackendStatus, InboundHandler, Payload};
use parking_lot::RwLock;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default collector address used by `Lumberjack::new()`
pub const DEFAULT_BACKEND_ADDR: &str = "127.0.0.1:5140";

const IO_TIMEOUT: Duration = Duration::from_secs(5);
const READ_POLL: Duration = Duration::from_millis(200);

struct TcpShared {
    handler: RwLock<Option<InboundHandler>>,
    streaming: AtomicBool,
    connected: AtomicBool,
    stop: AtomicBool,
}

/// Backend that talks to a line-oriented TCP collector
///
/// # Example
///
/// ```no_run
/// use lumberjack::backends::TcpBackend;
/// use lumberjack::prelude::*;
///
/// let lj = Lumberjack::builder()
///     .backend(TcpBackend::new("127.0.0.1:5140"))
///     .build();
/// lj.append(Severity::Error, "sent to 127.0.0.1:5140");
/// ```
pub struct TcpBackend {
    address: String,
    timeout: Duration,
    stream: Option<TcpStream>,
    shared: Arc<TcpShared>,
    reader: Option<thread::JoinHandle<()>>,
}

impl TcpBackend {
    /// Create a backend for `addr`; nothing is opened until `connect`
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            address: addr.into(),
            timeout: IO_TIMEOUT,
            stream: None,
            shared: Arc::new(TcpShared {
                handler: RwLock::new(None),
                streaming: AtomicBool::new(false),
                connected: AtomicBool::new(false),
                stop: AtomicBool::new(false),
            }),
            reader: None,
        }
    }

    /// Bound for connect and write operations
    ///
    /// Default: 5 seconds
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn open(&self) -> std::io::Result<TcpStream> {
        let mut last_err = None;
        for addr in self.address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream.set_write_timeout(Some(self.timeout))?;
                    stream.set_read_timeout(Some(READ_POLL))?;
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            std::io::Error::new(ErrorKind::AddrNotAvailable, "address resolved to nothing")
        }))
    }

    fn spawn_reader(&mut self, stream: TcpStream) -> std::io::Result<()> {
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("lumberjack-tcp-reader".to_string())
            .spawn(move || read_loop(stream, shared))?;
        self.reader = Some(handle);
        Ok(())
    }

    fn close(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        self.shared.connected.store(false, Ordering::Release);
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                tracing::error!(address = %self.address, "tcp reader thread panicked");
            }
        }
        self.shared.stop.store(false, Ordering::Release);
    }
}

fn read_loop(stream: TcpStream, shared: Arc<TcpShared>) {
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();

    while !shared.stop.load(Ordering::Acquire) {
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) if line.last() != Some(&b'\n') => {
                // EOF in the middle of a line
                break;
            }
            Ok(_) => {
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                if shared.streaming.load(Ordering::Acquire) {
                    let handler = shared.handler.read().clone();
                    if let Some(handler) = handler {
                        handler(Payload::Text(String::from_utf8_lossy(&line).into_owned()));
                    }
                }
                line.clear();
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::debug!(error = %e, "tcp backend read failed");
                break;
            }
        }
    }

    shared.connected.store(false, Ordering::Release);
}

impl Backend for TcpBackend {
    fn connect(&mut self) -> BackendStatus {
        self.close();

        let stream = match self.open() {
            Ok(stream) => stream,
            Err(e) => {
                tracing::debug!(address = %self.address, error = %e, "tcp backend connect failed");
                return if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) {
                    BackendStatus::Timeout
                } else {
                    BackendStatus::Error
                };
            }
        };

        let reader_stream = match stream.try_clone() {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!(error = %e, "tcp backend could not clone stream");
                return BackendStatus::Error;
            }
        };

        self.shared.connected.store(true, Ordering::Release);
        self.stream = Some(stream);
        if let Err(e) = self.spawn_reader(reader_stream) {
            tracing::warn!(error = %e, "tcp backend could not start reader thread");
            self.close();
            return BackendStatus::Error;
        }

        BackendStatus::Ok
    }

    fn status(&self) -> BackendStatus {
        if self.stream.is_some() && self.shared.connected.load(Ordering::Acquire) {
            BackendStatus::Ok
        } else {
            BackendStatus::Error
        }
    }

    fn send_message(&mut self, payload: &Payload) -> BackendStatus {
        let Payload::Text(text) = payload else {
            tracing::debug!("tcp backend cannot frame binary payloads");
            return BackendStatus::Error;
        };

        let Some(stream) = self.stream.as_mut() else {
            return BackendStatus::Error;
        };

        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');

        // A timeout keeps the stream only when no byte of the line went out
        let bytes = line.as_bytes();
        let mut written = 0;
        while written < bytes.len() {
            match stream.write(&bytes[written..]) {
                Ok(0) => {
                    tracing::debug!(address = %self.address, written, "tcp backend stream closed mid-line");
                    self.close();
                    return BackendStatus::Error;
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e)
                    if written == 0
                        && matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return BackendStatus::Timeout;
                }
                Err(e) => {
                    tracing::debug!(address = %self.address, written, error = %e, "tcp backend write failed");
                    self.close();
                    return BackendStatus::Error;
                }
            }
        }

        BackendStatus::Ok
    }

    fn register_callback(&mut self, handler: Option<InboundHandler>) -> BackendStatus {
        *self.shared.handler.write() = handler;
        BackendStatus::Ok
    }

    fn set_streaming_state(&mut self, enabled: bool) -> BackendStatus {
        if enabled && self.status() != BackendStatus::Ok {
            return BackendStatus::Error;
        }
        self.shared.streaming.store(enabled, Ordering::Release);
        BackendStatus::Ok
    }

    fn name(&self) -> &str {
        "tcp"
    }
}

impl Drop for TcpBackend {
    fn drop(&mut self) {
        self.close();
    }
}
