//! Severity definitions

use super::error::LumberjackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered urgency of an entry, most urgent first.
///
/// `All` is a threshold sentinel meaning "accept everything"; it is never
/// attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
    All = 6,
}

impl Severity {
    /// Every enumerator that may be attached to an entry
    pub const ENTRY_LEVELS: [Severity; 6] = [
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Debug,
        Severity::Trace,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Trace => "TRACE",
            Severity::All => "ALL",
        }
    }

    /// True for the "accept everything" threshold sentinel
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Severity::All)
    }

    /// Whether an entry of this severity passes a gate set to `threshold`
    #[inline]
    pub fn passes(&self, threshold: Severity) -> bool {
        *self <= threshold
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Severity::Critical => BrightRed,
            Severity::Error => Red,
            Severity::Warning => Yellow,
            Severity::Info => Green,
            Severity::Debug => Blue,
            Severity::Trace | Severity::All => BrightBlack,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Severity {
    type Err = LumberjackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CRITICAL" => Ok(Severity::Critical),
            "ERROR" => Ok(Severity::Error),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "INFO" => Ok(Severity::Info),
            "DEBUG" => Ok(Severity::Debug),
            "TRACE" => Ok(Severity::Trace),
            "ALL" => Ok(Severity::All),
            _ => Err(LumberjackError::invalid_argument(
                "severity",
                format!("unknown severity '{}'", s),
            )),
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = LumberjackError;

    fn try_from(value: u8) -> Result<Self, LumberjackError> {
        match value {
            0 => Ok(Severity::Critical),
            1 => Ok(Severity::Error),
            2 => Ok(Severity::Warning),
            3 => Ok(Severity::Info),
            4 => Ok(Severity::Debug),
            5 => Ok(Severity::Trace),
            6 => Ok(Severity::All),
            _ => Err(LumberjackError::invalid_argument(
                "severity",
                format!("{} is out of range 0..=6", value),
            )),
        }
    }
}
