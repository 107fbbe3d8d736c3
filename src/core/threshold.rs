//! Independent log and print thresholds

use super::severity::Severity;
use parking_lot::RwLock;

pub const DEFAULT_LOG_LEVEL: Severity = Severity::Error;
pub const DEFAULT_PRINT_LEVEL: Severity = Severity::Warning;

/// Decides per entry whether it goes to the backend and/or the console.
///
/// An entry passes a gate when its severity is at least as urgent as the
/// threshold. `All` lets everything through, `Critical` only critical entries.
#[derive(Debug)]
pub struct ThresholdGate {
    log_level: RwLock<Severity>,
    print_level: RwLock<Severity>,
}

impl ThresholdGate {
    pub fn new(log_level: Severity, print_level: Severity) -> Self {
        Self {
            log_level: RwLock::new(log_level),
            print_level: RwLock::new(print_level),
        }
    }

    #[inline]
    pub fn should_deliver(&self, severity: Severity) -> bool {
        severity.passes(*self.log_level.read())
    }

    #[inline]
    pub fn should_print(&self, severity: Severity) -> bool {
        severity.passes(*self.print_level.read())
    }

    pub fn set_log_level(&self, level: Severity) {
        *self.log_level.write() = level;
    }

    pub fn set_print_level(&self, level: Severity) {
        *self.print_level.write() = level;
    }

    pub fn log_level(&self) -> Severity {
        *self.log_level.read()
    }

    pub fn print_level(&self) -> Severity {
        *self.print_level.read()
    }
}

impl Default for ThresholdGate {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_LEVEL, DEFAULT_PRINT_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let gate = ThresholdGate::default();
        assert_eq!(gate.log_level(), Severity::Error);
        assert_eq!(gate.print_level(), Severity::Warning);

        assert!(gate.should_deliver(Severity::Critical));
        assert!(gate.should_deliver(Severity::Error));
        assert!(!gate.should_deliver(Severity::Warning));

        assert!(gate.should_print(Severity::Warning));
        assert!(!gate.should_print(Severity::Info));
    }

    #[test]
    fn test_critical_threshold_only_critical() {
        let gate = ThresholdGate::new(Severity::Critical, Severity::Critical);
        assert!(gate.should_deliver(Severity::Critical));
        for level in &Severity::ENTRY_LEVELS[1..] {
            assert!(!gate.should_deliver(*level));
            assert!(!gate.should_print(*level));
        }
    }

    #[test]
    fn test_all_threshold_everything() {
        let gate = ThresholdGate::new(Severity::All, Severity::All);
        for level in Severity::ENTRY_LEVELS {
            assert!(gate.should_deliver(level));
            assert!(gate.should_print(level));
        }
    }

    #[test]
    fn test_thresholds_are_independent() {
        let gate = ThresholdGate::default();
        gate.set_log_level(Severity::Critical);
        gate.set_print_level(Severity::All);

        assert!(gate.should_deliver(Severity::Critical));
        assert!(gate.should_print(Severity::Critical));
        assert!(!gate.should_deliver(Severity::Warning));
        assert!(gate.should_print(Severity::Warning));
    }
}
