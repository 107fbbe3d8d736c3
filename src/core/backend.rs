//! Backend trait for the streaming/messaging system behind the facade

use super::payload::{InboundHandler, Payload};
use super::status::BackendStatus;

/// External system that persists or forwards entries and streams inbound
/// messages back.
///
/// A backend is moved onto the connector's worker thread and only ever called
/// from there, so implementations need `Send` but not `Sync`. Inbound
/// delivery happens on threads the backend owns.
pub trait Backend: Send {
    /// Establish the connection
    fn connect(&mut self) -> BackendStatus;

    /// Current connection state as the backend sees it
    fn status(&self) -> BackendStatus;

    /// Hand one payload to the backend
    fn send_message(&mut self, payload: &Payload) -> BackendStatus;

    /// Install (or with `None`, remove) the inbound handler
    fn register_callback(&mut self, handler: Option<InboundHandler>) -> BackendStatus;

    /// Start or stop inbound streaming
    fn set_streaming_state(&mut self, enabled: bool) -> BackendStatus;

    fn name(&self) -> &str;
}
