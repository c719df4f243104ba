// crates/resource-policy-client/src/correlation.rs
// ============================================================================
// Module: Correlation Identifiers
// Description: Sanitization and generation of request correlation IDs.
// Purpose: Tag every remote call of one process with a traceable identifier.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! A configured correlation ID is checked against strict HTTP token rules and
//! rejected rather than repaired. Without one, a random version-4 UUID is
//! generated from the OS RNG.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;

/// Header carrying the correlation ID.
pub const CORRELATION_HEADER: &str = "x-correlation-id";
/// Maximum allowed length for configured correlation IDs.
pub const MAX_CORRELATION_ID_LENGTH: usize = 128;

/// Rejection reason for an invalid configured correlation ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationIdRejection {
    /// Input was empty after trimming.
    EmptyAfterTrim,
    /// Input exceeded [`MAX_CORRELATION_ID_LENGTH`].
    TooLong,
    /// Input contained characters other than ASCII token characters.
    InvalidChar,
}

impl CorrelationIdRejection {
    /// Returns a stable label for this rejection reason.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EmptyAfterTrim => "empty_after_trim",
            Self::TooLong => "too_long",
            Self::InvalidChar => "invalid_char",
        }
    }
}

impl fmt::Display for CorrelationIdRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns the sanitized configured ID, or a freshly generated UUID.
///
/// # Errors
///
/// Returns [`CorrelationIdRejection`] when a configured ID is invalid.
pub fn resolve_correlation_id(configured: Option<&str>) -> Result<String, CorrelationIdRejection> {
    match configured {
        Some(value) => sanitize_correlation_id(value),
        None => Ok(generate_correlation_id()),
    }
}

/// Sanitizes a configured correlation ID.
///
/// # Errors
///
/// Returns [`CorrelationIdRejection`] when the value is empty, too long, or
/// contains characters outside the HTTP token set.
pub fn sanitize_correlation_id(value: &str) -> Result<String, CorrelationIdRejection> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CorrelationIdRejection::EmptyAfterTrim);
    }
    if trimmed.len() > MAX_CORRELATION_ID_LENGTH {
        return Err(CorrelationIdRejection::TooLong);
    }
    if !trimmed.chars().all(is_tchar) {
        return Err(CorrelationIdRejection::InvalidChar);
    }
    Ok(trimmed.to_string())
}

/// Generates a random RFC 4122 version-4 UUID string.
#[must_use]
pub fn generate_correlation_id() -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let mut out = String::with_capacity(36);
    for (index, byte) in bytes.iter().enumerate() {
        if matches!(index, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

/// Returns true when the character is a valid HTTP token character.
const fn is_tchar(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '.'
                | '^'
                | '_'
                | '`'
                | '|'
                | '~'
        )
}
