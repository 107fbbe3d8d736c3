//! Facade counters
//!
//! Tracks what happened to entries after the threshold gate: handed to the
//! backend, rejected by it, dropped before reaching it, echoed to the console.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for facade observability
///
/// # Example
///
/// ```
/// use lumberjack::LumberjackMetrics;
///
/// let metrics = LumberjackMetrics::new();
/// metrics.record_delivered();
/// metrics.record_dropped();
///
/// assert_eq!(metrics.delivered(), 1);
/// assert_eq!(metrics.dropped(), 1);
/// ```
#[derive(Debug)]
pub struct LumberjackMetrics {
    /// Payloads accepted by the backend
    delivered: AtomicU64,

    /// Payloads the backend refused or timed out on
    send_failures: AtomicU64,

    /// Payloads dropped because the delivery queue was full or gone
    dropped: AtomicU64,

    /// Deliveries skipped because the connection was not OK
    not_connected: AtomicU64,

    /// Entries echoed to the print sink
    printed: AtomicU64,

    /// Print sink errors and panics
    print_failures: AtomicU64,

    /// Inbound payloads handed to the application handler
    inbound: AtomicU64,
}

impl LumberjackMetrics {
    pub const fn new() -> Self {
        Self {
            delivered: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            not_connected: AtomicU64::new(0),
            printed: AtomicU64::new(0),
            print_failures: AtomicU64::new(0),
            inbound: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn not_connected(&self) -> u64 {
        self.not_connected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn printed(&self) -> u64 {
        self.printed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn print_failures(&self) -> u64 {
        self.print_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn inbound(&self) -> u64 {
        self.inbound.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_send_failure(&self) -> u64 {
        self.send_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_not_connected(&self) -> u64 {
        self.not_connected.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_printed(&self) -> u64 {
        self.printed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_print_failure(&self) -> u64 {
        self.print_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_inbound(&self) -> u64 {
        self.inbound.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of gated entries that never reached the backend, as a
    /// percentage (0.0 - 100.0). Returns 0.0 before any delivery attempt.
    pub fn loss_rate(&self) -> f64 {
        let lost = (self.send_failures() + self.dropped() + self.not_connected()) as f64;
        let total = self.delivered() as f64 + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.delivered.store(0, Ordering::Relaxed);
        self.send_failures.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.not_connected.store(0, Ordering::Relaxed);
        self.printed.store(0, Ordering::Relaxed);
        self.print_failures.store(0, Ordering::Relaxed);
        self.inbound.store(0, Ordering::Relaxed);
    }
}

impl Default for LumberjackMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LumberjackMetrics {
    /// Snapshot of the current values
    fn clone(&self) -> Self {
        Self {
            delivered: AtomicU64::new(self.delivered()),
            send_failures: AtomicU64::new(self.send_failures()),
            dropped: AtomicU64::new(self.dropped()),
            not_connected: AtomicU64::new(self.not_connected()),
            printed: AtomicU64::new(self.printed()),
            print_failures: AtomicU64::new(self.print_failures()),
            inbound: AtomicU64::new(self.inbound()),
        }
    }
}
