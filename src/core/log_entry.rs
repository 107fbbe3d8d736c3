//! Log entry structure

use super::error::Result;
use super::payload::Payload;
use super::severity::Severity;
use serde::{Deserialize, Serialize};

/// Kind of record handed to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[default]
    Log,
    /// Tag amendment for a previously delivered entry
    Tag,
}

/// One structured log record.
///
/// Serializes to the JSON object handed to the backend:
/// `id`, `timestamp`, `pid`, `deviceId`, `type`, `level`, `message`,
/// `module` (omitted when unset) and `tags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    id: String,
    timestamp: f64,
    pid: String,
    #[serde(rename = "deviceId")]
    device_id: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    level: Severity,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    module: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl LogEntry {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        timestamp: f64,
        pid: String,
        device_id: String,
        level: Severity,
        message: String,
        module: Option<String>,
        tags: Vec<String>,
    ) -> Self {
        let mut entry = Self {
            id,
            timestamp,
            pid,
            device_id,
            kind: EntryKind::Log,
            level,
            message,
            module,
            tags: Vec::with_capacity(tags.len()),
        };
        for tag in tags {
            entry.add_tag(tag);
        }
        entry
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Tags in first-insertion order, without duplicates
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Add a tag unless already present. Returns whether the tag was new.
    pub(crate) fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.has_tag(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Message with newlines, carriage returns and tabs escaped so a
    /// rendering stays on one line.
    pub fn escaped_message(&self) -> String {
        escape_line_breaks(&self.message)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Backend payload carrying this entry
    pub fn to_payload(&self) -> Result<Payload> {
        Ok(Payload::Text(self.to_json()?))
    }
}

/// Escape `\n`, `\r` and `\t` so the value renders on a single line
pub(crate) fn escape_line_breaks(value: &str) -> String {
    value
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Amendment record sent when a tag is added to a delivered entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagAmendment {
    pub id: String,
    pub tag: String,
    pub timestamp: f64,
    pub pid: String,
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl TagAmendment {
    pub fn new(entry: &LogEntry, tag: impl Into<String>, timestamp: f64) -> Self {
        Self {
            id: entry.id.clone(),
            tag: tag.into(),
            timestamp,
            pid: entry.pid.clone(),
            device_id: entry.device_id.clone(),
            kind: EntryKind::Tag,
        }
    }

    pub fn to_payload(&self) -> Result<Payload> {
        Ok(Payload::Text(serde_json::to_string(self)?))
    }
}
