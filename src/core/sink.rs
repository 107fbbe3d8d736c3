//! Sink trait for print (console echo) destinations

use super::{error::Result, log_entry::LogEntry};

pub trait Sink: Send {
    fn write(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
