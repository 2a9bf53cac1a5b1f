//! Sanitizer contracts and trivial helpers.
//!
//! Sanitizers are caller-supplied pure transforms applied to raw call
//! arguments, results, errors, and context before inclusion in a log record.
//! Real redaction logic lives with the caller; the helpers here exist for
//! tests and demos.

use serde_json::Value;

use crate::error::CallError;

/// A pure transform shaping a raw JSON value before it is logged.
///
/// Used for `params`, `result`, and `context` sanitization.
pub type ValueSanitizer = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// A pure transform shaping a call error before it is logged.
pub type ErrorSanitizer = Box<dyn Fn(&CallError) -> Value + Send + Sync>;

/// A sanitizer that passes values through unchanged.
///
/// **WARNING:** performs no redaction; for tests and demos only.
///
/// # Examples
///
/// ```
/// use instrument_core::sanitize;
/// use serde_json::json;
///
/// let sanitizer = sanitize::passthrough();
/// assert_eq!(sanitizer(&json!({"card": "4111"})), json!({"card": "4111"}));
/// ```
pub fn passthrough() -> ValueSanitizer {
    Box::new(Value::clone)
}

/// A sanitizer that replaces any value with `"[REDACTED]"`.
///
/// # Examples
///
/// ```
/// use instrument_core::sanitize;
/// use serde_json::json;
///
/// let sanitizer = sanitize::redact_all();
/// assert_eq!(sanitizer(&json!({"card": "4111"})), json!("[REDACTED]"));
/// ```
pub fn redact_all() -> ValueSanitizer {
    Box::new(|_| Value::String("[REDACTED]".to_string()))
}

/// An error sanitizer that keeps only the error message.
///
/// # Examples
///
/// ```
/// use instrument_core::{sanitize, CallError};
/// use serde_json::json;
///
/// let sanitizer = sanitize::error_message();
/// assert_eq!(sanitizer(&CallError::msg("boom")), json!("boom"));
/// ```
pub fn error_message() -> ErrorSanitizer {
    Box::new(|error| Value::String(error.to_string()))
}
