//! Backend implementations

pub mod memory;
pub mod tcp;

pub use memory::MemoryBackend;
pub use tcp::{TcpBackend, DEFAULT_BACKEND_ADDR};
