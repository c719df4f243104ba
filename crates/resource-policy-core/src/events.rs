// crates/resource-policy-core/src/events.rs
// ============================================================================
// Module: Resource Policy Events
// Description: Structured diagnostic events and injectable sinks.
// Purpose: Report recoverable filtering problems without a global logger.
// Dependencies: serde, serde_json, std
// ============================================================================

//! ## Overview
//! Components that can hit recoverable conditions (an unknown allow-list rule
//! shape, a value serialization failure) report them through an [`EventSink`]
//! passed in by the caller. Sinks never fail the operation that emits them.
//! Invariants:
//! - Event identifiers are stable snake_case labels.
//! - Event fields are key-sorted so JSON lines are deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Event Identifiers
// ============================================================================

/// Emitted when an allow-list rule is neither a boolean nor an object.
pub const EVENT_UNKNOWN_ALLOW_RULE: &str = "unknown_allow_rule";
/// Emitted when filtered values cannot be serialized for a resource.
pub const EVENT_VALUES_SERIALIZATION_FAILED: &str = "values_serialization_failed";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity of a structured event.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Verbose detail for troubleshooting.
    Debug,
    /// Normal progress information.
    Info,
    /// Recoverable problem; processing continued.
    Warn,
    /// Operation failed.
    Error,
}

/// Structured event payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    /// Event severity.
    pub level: LogLevel,
    /// Stable event identifier.
    pub event: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Additional key-sorted fields.
    pub fields: BTreeMap<String, Value>,
}

impl LogEvent {
    /// Creates an event with no fields.
    #[must_use]
    pub fn new(level: LogLevel, event: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            event,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Creates a warning event.
    #[must_use]
    pub fn warn(event: &'static str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, event, message)
    }

    /// Creates an info event.
    #[must_use]
    pub fn info(event: &'static str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, event, message)
    }

    /// Creates a debug event.
    #[must_use]
    pub fn debug(event: &'static str, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, event, message)
    }

    /// Adds a field to the event.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a field value by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Receives structured events.
pub trait EventSink: Send + Sync {
    /// Records an event. Implementations must not panic or block indefinitely.
    fn record(&self, event: &LogEvent);
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

/// Sink that writes one JSON object per line.
pub struct JsonLineEventSink<W: Write + Send> {
    /// Output writer for event lines.
    writer: Mutex<W>,
    /// Events below this level are discarded.
    min_level: LogLevel,
}

impl<W: Write + Send> JsonLineEventSink<W> {
    /// Creates a sink that writes every event.
    pub const fn new(writer: W) -> Self {
        Self::with_min_level(writer, LogLevel::Debug)
    }

    /// Creates a sink that discards events below `min_level`.
    pub const fn with_min_level(writer: W, min_level: LogLevel) -> Self {
        Self {
            writer: Mutex::new(writer),
            min_level,
        }
    }
}

impl<W: Write + Send> EventSink for JsonLineEventSink<W> {
    fn record(&self, event: &LogEvent) {
        if event.level < self.min_level {
            return;
        }
        if let Ok(mut guard) = self.writer.lock()
            && serde_json::to_writer(&mut *guard, event).is_ok()
        {
            let _ = guard.write_all(b"\n");
            let _ = guard.flush();
        }
    }
}

/// Sink that discards every event.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: &LogEvent) {}
}

/// Sink that keeps events in memory for later inspection.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns recorded events with the given identifier.
    #[must_use]
    pub fn events_named(&self, event: &str) -> Vec<LogEvent> {
        self.events().into_iter().filter(|entry| entry.event == event).collect()
    }
}

impl EventSink for MemoryEventSink {
    fn record(&self, event: &LogEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}
