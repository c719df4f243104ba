// crates/resource-policy-client/src/progress.rs
// ============================================================================
// Module: Progress Output
// Description: Human-readable progress lines for policy checks.
// Purpose: Route progress to an event sink or a plain text stream.
// Dependencies: resource-policy-core
// ============================================================================

//! ## Overview
//! Progress lines go either to a structured [`EventSink`] as info events or
//! to a plain writer as newline-terminated text. Only plain writes can fail.

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use resource_policy_core::EventSink;
use resource_policy_core::LogEvent;

use crate::error::ClientError;

/// Event id for policy-check progress lines.
pub const EVENT_POLICIES_CHECKED: &str = "policies_checked";

/// Destination for progress lines.
pub enum ProgressOutput {
    /// Progress is recorded as info events.
    Structured(Arc<dyn EventSink>),
    /// Progress is written as text lines.
    Plain(Mutex<Box<dyn Write + Send>>),
}

impl ProgressOutput {
    /// Creates a structured progress output.
    #[must_use]
    pub fn structured(events: Arc<dyn EventSink>) -> Self {
        Self::Structured(events)
    }

    /// Creates a plain text progress output.
    #[must_use]
    pub fn plain<W: Write + Send + 'static>(writer: W) -> Self {
        Self::Plain(Mutex::new(Box::new(writer)))
    }

    /// Emits one progress line.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Output`] when a plain write fails.
    pub fn emit(&self, line: &str) -> Result<(), ClientError> {
        match self {
            Self::Structured(events) => {
                events.record(&LogEvent::info(EVENT_POLICIES_CHECKED, line));
                Ok(())
            }
            Self::Plain(writer) => {
                let mut writer = writer
                    .lock()
                    .map_err(|_| ClientError::Output("progress writer poisoned".to_string()))?;
                writeln!(writer, "{line}")
                    .and_then(|()| writer.flush())
                    .map_err(|err| ClientError::Output(err.to_string()))
            }
        }
    }
}

impl fmt::Debug for ProgressOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(_) => f.write_str("ProgressOutput::Structured"),
            Self::Plain(_) => f.write_str("ProgressOutput::Plain"),
        }
    }
}

/// Formats the progress line for `count` checked policies of `kind`.
#[must_use]
pub fn policies_checked_line(count: usize, kind: &str) -> String {
    let noun = if count == 1 { "policy" } else { "policies" };
    format!("{count} {kind} {noun} checked")
}
