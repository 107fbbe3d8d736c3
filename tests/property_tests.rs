//! Property-based tests for lumberjack using proptest

use lumberjack::backends::MemoryBackend;
use lumberjack::core::{EntryBuilder, ThresholdGate};
use lumberjack::prelude::*;
use proptest::prelude::*;

fn any_level() -> impl Strategy<Value = Severity> {
    (0u8..=6).prop_map(|v| Severity::try_from(v).unwrap())
}

fn entry_level() -> impl Strategy<Value = Severity> {
    (0u8..=5).prop_map(|v| Severity::try_from(v).unwrap())
}

struct Discard;

impl Sink for Discard {
    fn write(&mut self, _entry: &LogEntry) -> Result<()> {
        Ok(())
    }
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
    fn name(&self) -> &str {
        "discard"
    }
}

// ============================================================================
// Severity Tests
// ============================================================================

proptest! {
    /// Test that severity names parse back to the same level
    #[test]
    fn test_severity_str_roundtrip(level in any_level()) {
        let parsed: Severity = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);

        let lower: Severity = level.to_str().to_lowercase().parse().unwrap();
        prop_assert_eq!(level, lower);
    }

    /// Test that ordering follows the numeric value
    #[test]
    fn test_severity_ordering(a in any_level(), b in any_level()) {
        prop_assert_eq!(a <= b, (a as u8) <= (b as u8));
        prop_assert_eq!(a < b, (a as u8) < (b as u8));
    }

    /// Test that out-of-range numeric values are rejected
    #[test]
    fn test_severity_out_of_range(value in 7u8..=u8::MAX) {
        prop_assert!(Severity::try_from(value).is_err());
    }
}

// ============================================================================
// Threshold Tests
// ============================================================================

proptest! {
    /// An entry passes exactly when it is at least as urgent as the threshold
    #[test]
    fn test_gate_matches_ordering(entry in entry_level(), threshold in any_level()) {
        let gate = ThresholdGate::new(threshold, threshold);
        prop_assert_eq!(gate.should_deliver(entry), entry <= threshold);
        prop_assert_eq!(gate.should_print(entry), entry <= threshold);
    }

    /// ALL delivers everything, CRITICAL only CRITICAL
    #[test]
    fn test_gate_extremes(entry in entry_level()) {
        let gate = ThresholdGate::new(Severity::All, Severity::Critical);
        prop_assert!(gate.should_deliver(entry));
        prop_assert_eq!(gate.should_print(entry), entry == Severity::Critical);
    }

    /// Delivery and print thresholds do not influence each other
    #[test]
    fn test_gates_independent(log in any_level(), print in any_level(), entry in entry_level()) {
        let gate = ThresholdGate::new(log, print);
        prop_assert_eq!(gate.should_deliver(entry), entry <= log);
        prop_assert_eq!(gate.should_print(entry), entry <= print);
    }
}

// ============================================================================
// Entry Tests
// ============================================================================

proptest! {
    /// Message, level and tags survive the JSON payload unchanged
    #[test]
    fn test_payload_preserves_fields(
        level in entry_level(),
        message in "(?s).*",
        tags in prop::collection::vec("[a-z]{1,8}", 0..6),
    ) {
        let builder = EntryBuilder::with_session(Identity::new("dev", "1"), 7);
        let entry = builder.build(level, message.clone(), None, tags.clone()).unwrap();
        let parsed = LogEntry::from_json(&entry.to_json().unwrap()).unwrap();

        prop_assert_eq!(parsed.level(), level);
        prop_assert_eq!(parsed.message(), message.as_str());

        let mut expected: Vec<String> = Vec::new();
        for tag in tags {
            if !expected.contains(&tag) {
                expected.push(tag);
            }
        }
        prop_assert_eq!(parsed.tags(), expected.as_slice());
    }

    /// Ids from one builder never repeat
    #[test]
    fn test_ids_unique(count in 1usize..300) {
        let builder = EntryBuilder::new(Identity::new("dev", "1"));
        let mut ids: Vec<String> = (0..count)
            .map(|_| builder.build(Severity::Info, "x", None, Vec::<String>::new()).unwrap().id().to_string())
            .collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), count);
    }

    /// Rendered console text stays on one line whatever the message, module
    /// and tags contain
    #[test]
    fn test_text_render_single_line(
        message in "(?s).*",
        module in proptest::option::of("(?s).{0,16}"),
        tags in prop::collection::vec("(?s).{1,12}", 0..4),
    ) {
        let builder = EntryBuilder::with_session(Identity::new("dev", "1"), 7);
        let entry = builder.build(Severity::Error, message, module.as_deref(), tags).unwrap();

        for format in [OutputFormat::Text, OutputFormat::Logfmt] {
            let line = format.format(&entry, &TimestampFormat::Epoch);
            prop_assert!(!line.contains('\n'));
            prop_assert!(!line.contains('\r'));
        }
    }
}

// ============================================================================
// Facade Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Tags added after creation are visible on the retained entry
    #[test]
    fn test_append_tag_retrievable(tags in prop::collection::vec("[a-z]{1,8}", 1..8)) {
        let lj = Lumberjack::builder()
            .backend(MemoryBackend::new())
            .print_sink(Discard)
            .identity(Identity::new("dev", "1"))
            .build();

        let id = lj.append(Severity::Info, "tag me");
        for tag in &tags {
            prop_assert!(lj.append_tag(&id, tag.clone()));
        }

        let entry = lj.entry(&id).unwrap();
        for tag in &tags {
            prop_assert!(entry.has_tag(tag));
        }
    }

    /// Only the newest `capacity` entries can be amended
    #[test]
    fn test_retention_bound(capacity in 1usize..16, appended in 1usize..40) {
        let lj = Lumberjack::builder()
            .backend(MemoryBackend::new())
            .print_sink(Discard)
            .identity(Identity::new("dev", "1"))
            .retention_capacity(capacity)
            .build();

        let ids: Vec<String> = (0..appended).map(|_| lj.append(Severity::Trace, "x")).collect();
        let first_kept = appended.saturating_sub(capacity);
        for (i, id) in ids.iter().enumerate() {
            prop_assert_eq!(lj.append_tag(id, "t"), i >= first_kept);
        }
    }
}
