//! Entry assembly and id generation

use super::error::{LumberjackError, Result};
use super::identity::Identity;
use super::log_entry::LogEntry;
use super::severity::Severity;
use super::timestamp::Clock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Builds [`LogEntry`] values stamped with identity and time.
///
/// Ids have the form `{pid}-{session:08x}-{seq}`. The session token is drawn
/// once per builder so two builders (or two runs of the same process id)
/// produce disjoint ids; `seq` starts at 1 and only increases.
#[derive(Debug)]
pub struct EntryBuilder {
    identity: Identity,
    clock: Clock,
    session: u32,
    next_seq: AtomicU64,
}

impl EntryBuilder {
    pub fn new(identity: Identity) -> Self {
        Self::with_session(identity, rand::random())
    }

    /// Builder with a fixed session token, for reproducible ids
    pub fn with_session(identity: Identity, session: u32) -> Self {
        Self {
            identity,
            clock: Clock::new(),
            session,
            next_seq: AtomicU64::new(1),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn session(&self) -> u32 {
        self.session
    }

    pub fn build<I, T>(
        &self,
        severity: Severity,
        message: impl Into<String>,
        module: Option<&str>,
        tags: I,
    ) -> Result<LogEntry>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if severity.is_sentinel() {
            return Err(LumberjackError::invalid_argument(
                "severity",
                "ALL is a threshold sentinel and cannot be attached to an entry",
            ));
        }

        Ok(LogEntry::new(
            self.next_id(),
            self.clock.now(),
            self.identity.process_id().to_string(),
            self.identity.device_id().to_string(),
            severity,
            message.into(),
            module.map(str::to_string),
            tags.into_iter().map(Into::into).collect(),
        ))
    }

    fn next_id(&self) -> String {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{:08x}-{}", self.identity.process_id(), self.session, seq)
    }
}
