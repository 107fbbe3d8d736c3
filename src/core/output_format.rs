//! Console rendering formats
//!
//! - Text: human-readable line (default)
//! - Json: the same JSON object handed to the backend
//! - Logfmt: key=value pairs

use super::log_entry::{escape_line_breaks, LogEntry};
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Example: `[2025-01-08T10:30:45.123Z] [ERROR   ] 4711 storage - disk full #io`
    #[default]
    Text,

    /// Example: `{"id":"4711-0000beef-1","timestamp":1736332245.123,...}`
    Json,

    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=ERROR message="disk full" tags=io`
    Logfmt,
}

impl OutputFormat {
    pub fn format(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Text => format_text(entry, timestamp_format, entry.level().to_str()),
            OutputFormat::Json => entry.to_json().unwrap_or_default(),
            OutputFormat::Logfmt => format_logfmt(entry, timestamp_format),
        }
    }
}

/// Text line with a caller-supplied (possibly colored) level label
pub(crate) fn format_text(entry: &LogEntry, timestamp_format: &TimestampFormat, level: &str) -> String {
    let mut line = format!(
        "[{}] [{:8}] {}",
        timestamp_format.format(entry.timestamp()),
        level,
        entry.pid()
    );

    if let Some(module) = entry.module() {
        line.push(' ');
        line.push_str(&escape_line_breaks(module));
    }

    line.push_str(" - ");
    line.push_str(&entry.escaped_message());

    for tag in entry.tags() {
        line.push_str(" #");
        line.push_str(&escape_line_breaks(tag));
    }

    line
}

fn format_logfmt(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
    let mut parts = vec![
        format!(
            "timestamp={}",
            escape_logfmt_value(&timestamp_format.format(entry.timestamp()))
        ),
        format!("id={}", escape_logfmt_value(entry.id())),
        format!("pid={}", escape_logfmt_value(entry.pid())),
    ];

    if !entry.device_id().is_empty() {
        parts.push(format!("device_id={}", escape_logfmt_value(entry.device_id())));
    }

    parts.push(format!("level={}", entry.level().to_str()));

    if let Some(module) = entry.module() {
        parts.push(format!("module={}", escape_logfmt_value(&escape_line_breaks(module))));
    }

    // Message is always quoted
    parts.push(format!("message={}", quote_logfmt_value(&entry.escaped_message())));

    if !entry.tags().is_empty() {
        let tags: Vec<String> = entry.tags().iter().map(|t| escape_line_breaks(t)).collect();
        parts.push(format!("tags={}", escape_logfmt_value(&tags.join(","))));
    }

    parts.join(" ")
}

/// Quote a logfmt value if it contains spaces, quotes or `=`
fn escape_logfmt_value(value: &str) -> String {
    if value.contains(' ') || value.contains('"') || value.contains('=') {
        quote_logfmt_value(value)
    } else {
        value.to_string()
    }
}

fn quote_logfmt_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entry_builder::EntryBuilder;
    use crate::core::identity::Identity;
    use crate::core::severity::Severity;

    fn entry(message: &str, module: Option<&str>, tags: &[&str]) -> LogEntry {
        EntryBuilder::with_session(Identity::new("dev-1", "4711"), 0xbeef)
            .build(Severity::Error, message, module, tags.iter().copied())
            .unwrap()
    }

    #[test]
    fn test_text_format() {
        let result = OutputFormat::Text.format(
            &entry("disk full", Some("storage"), &["io", "disk"]),
            &TimestampFormat::Iso8601,
        );

        assert!(result.contains("[ERROR   ]"));
        assert!(result.contains("4711 storage - disk full"));
        assert!(result.ends_with(" #io #disk"));
    }

    #[test]
    fn test_text_format_single_line() {
        let result = OutputFormat::Text.format(
            &entry("line one\nERROR fake", None, &[]),
            &TimestampFormat::Iso8601,
        );
        assert_eq!(result.lines().count(), 1);
        assert!(result.contains("line one\\nERROR fake"));
    }

    #[test]
    fn test_module_and_tags_cannot_break_lines() {
        let e = entry("ok", Some("mod\nule"), &["a\nERROR forged", "tab\tbed"]);

        let text = OutputFormat::Text.format(&e, &TimestampFormat::Iso8601);
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains(" mod\\nule - ok #a\\nERROR forged #tab\\tbed"));

        let logfmt = OutputFormat::Logfmt.format(&e, &TimestampFormat::Epoch);
        assert_eq!(logfmt.lines().count(), 1);
        assert!(!logfmt.contains('\t'));
    }

    #[test]
    fn test_json_format_matches_payload() {
        let e = entry("disk full", None, &["io"]);
        let result = OutputFormat::Json.format(&e, &TimestampFormat::Iso8601);
        assert_eq!(result, e.to_json().unwrap());

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["level"], "ERROR");
        assert_eq!(parsed["deviceId"], "dev-1");
    }

    #[test]
    fn test_logfmt_format() {
        let result = OutputFormat::Logfmt.format(
            &entry("say \"hi\"", Some("net io"), &["a", "b"]),
            &TimestampFormat::Epoch,
        );

        assert!(result.contains("level=ERROR"));
        assert!(result.contains("module=\"net io\""));
        assert!(result.contains("message=\"say \\\"hi\\\"\""));
        assert!(result.contains("tags=a,b"));
        assert!(result.contains("pid=4711"));
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
