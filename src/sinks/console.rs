//! Console sink implementation

use crate::core::output_format::format_text;
use crate::core::{LogEntry, OutputFormat, Result, Severity, Sink, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;

pub struct ConsoleSink {
    use_colors: bool,
    timestamp_format: TimestampFormat,
    output_format: OutputFormat,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
            timestamp_format: TimestampFormat::default(),
            output_format: OutputFormat::default(),
        }
    }

    /// Colors are only honored when built with the `console` feature
    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors: use_colors && cfg!(feature = "console"),
            ..Self::new()
        }
    }

    pub fn uses_colors(&self) -> bool {
        self.use_colors
    }

    /// Set the output format for this sink
    ///
    /// # Example
    ///
    /// ```
    /// use lumberjack::sinks::ConsoleSink;
    /// use lumberjack::OutputFormat;
    ///
    /// let sink = ConsoleSink::new().with_output_format(OutputFormat::Json);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Render an entry the way `write` prints it
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.output_format {
            OutputFormat::Text => self.format_text(entry),
            OutputFormat::Json | OutputFormat::Logfmt => {
                self.output_format.format(entry, &self.timestamp_format)
            }
        }
    }

    fn format_text(&self, entry: &LogEntry) -> String {
        #[cfg(feature = "console")]
        if self.use_colors {
            let label = format!("{:8}", entry.level().to_str())
                .color(entry.level().color_code())
                .to_string();
            return format_text(entry, &self.timestamp_format, &label);
        }

        format_text(entry, &self.timestamp_format, entry.level().to_str())
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&mut self, entry: &LogEntry) -> Result<()> {
        let output = self.render(entry);

        // Route Critical and Error to stderr, others to stdout
        match entry.level() {
            Severity::Critical | Severity::Error => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntryBuilder, Identity};

    fn entry(severity: Severity) -> LogEntry {
        EntryBuilder::with_session(Identity::new("dev", "77"), 1)
            .build(severity, "temperature high", Some("thermal"), ["sensor"])
            .unwrap()
    }

    #[test]
    fn test_plain_render() {
        let sink = ConsoleSink::with_colors(false);
        let line = sink.render(&entry(Severity::Warning));
        assert!(line.contains("[WARNING ] 77 thermal - temperature high #sensor"));
    }

    #[test]
    fn test_colors_follow_feature() {
        assert_eq!(ConsoleSink::new().uses_colors(), cfg!(feature = "console"));
        assert_eq!(ConsoleSink::with_colors(true).uses_colors(), cfg!(feature = "console"));

        let sink = ConsoleSink::with_colors(false);
        assert!(!sink.uses_colors());
        assert!(!sink.render(&entry(Severity::Critical)).contains('\x1b'));
    }

    #[test]
    fn test_json_render() {
        let sink = ConsoleSink::with_colors(false).with_output_format(OutputFormat::Json);
        let parsed: serde_json::Value =
            serde_json::from_str(&sink.render(&entry(Severity::Info))).unwrap();
        assert_eq!(parsed["message"], "temperature high");
        assert_eq!(parsed["type"], "log");
    }

    #[test]
    fn test_write_and_flush() {
        let mut sink = ConsoleSink::with_colors(false);
        sink.write(&entry(Severity::Critical)).unwrap();
        sink.write(&entry(Severity::Debug)).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.name(), "console");
    }
}
