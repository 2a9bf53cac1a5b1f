//! The structured log record and the per-call data it is built from.

use serde::Serialize;
use serde_json::Value;

use crate::error::CallError;

/// A structured log record describing one instrumented call.
///
/// Records are compact: optional fields that did not apply to the call are
/// omitted from the serialized object entirely, never emitted as `null`.
///
/// Inclusion rules:
/// - `params` and `benchmark` are always present;
/// - `result` is present only on success, and only when the raw result was
///   truthy (see [`is_truthy`]);
/// - `error` is present only on failure;
/// - `context` is present only when the call carried context *and* a context
///   sanitizer was configured;
/// - `timestamp` is present only when the `timestamp` option is enabled,
///   captured at record-build time.
///
/// # Examples
///
/// ```
/// use instrument_core::LogRecord;
/// use serde_json::json;
///
/// let record = LogRecord {
///     service: "billing".to_string(),
///     method: "charge".to_string(),
///     application: "api".to_string(),
///     level: "info".to_string(),
///     params: json!([42]),
///     result: None,
///     error: None,
///     context: None,
///     benchmark: json!("0.120ms"),
///     timestamp: None,
/// };
///
/// let value = record.to_value();
/// assert_eq!(value["service"], "billing");
/// // Absent fields are absent, not null
/// assert!(value.get("result").is_none());
/// assert!(value.get("timestamp").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Service identifier from the configuration.
    pub service: String,
    /// Name of the instrumented method.
    pub method: String,
    /// Name of the application issuing the call.
    pub application: String,
    /// The resolved log level this record was emitted at.
    pub level: String,
    /// Sanitized call arguments.
    pub params: Value,
    /// Sanitized result; success only, and only when the raw result was truthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Sanitized error; failure only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    /// Sanitized call context, when present and a context sanitizer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// Elapsed-time representation from the benchmark source.
    pub benchmark: Value,
    /// ISO-8601 timestamp captured at record-build time, when enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl LogRecord {
    /// Serializes the record to a JSON value, omitting absent fields.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Assembled data for one invocation of an instrumented function.
///
/// Handed to level resolvers so a configured level can depend on the call:
/// its arguments, its result or error, the elapsed time, and any context.
/// Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Copy)]
pub struct CallData<'a> {
    /// Raw (unsanitized) call arguments.
    pub args: &'a Value,
    /// Raw result; `Some` on success only.
    pub result: Option<&'a Value>,
    /// The error; `Some` on failure only.
    pub error: Option<&'a CallError>,
    /// Elapsed-time representation from the benchmark source.
    pub elapsed: &'a Value,
    /// Caller-supplied per-invocation context, if any.
    pub context: Option<&'a Value>,
}

/// JavaScript-style truthiness for JSON values.
///
/// Drives the `result` inclusion rule: a falsy raw result (`null`, `false`,
/// `0`, `""`, `NaN`) is omitted from the record. Arrays and objects are
/// always truthy, even when empty.
///
/// # Examples
///
/// ```
/// use instrument_core::is_truthy;
/// use serde_json::json;
///
/// assert!(is_truthy(&json!("ok")));
/// assert!(is_truthy(&json!([])));
/// assert!(!is_truthy(&json!(0)));
/// assert!(!is_truthy(&json!("")));
/// assert!(!is_truthy(&json!(null)));
/// ```
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_record() -> LogRecord {
        LogRecord {
            service: "billing".to_string(),
            method: "charge".to_string(),
            application: "api".to_string(),
            level: "info".to_string(),
            params: json!([1, 2]),
            result: None,
            error: None,
            context: None,
            benchmark: json!("1.000ms"),
            timestamp: None,
        }
    }

    #[test]
    fn absent_fields_are_omitted() {
        let value = base_record().to_value();

        let object = value.as_object().expect("record serializes to an object");
        assert!(!object.contains_key("result"));
        assert!(!object.contains_key("error"));
        assert!(!object.contains_key("context"));
        assert!(!object.contains_key("timestamp"));
    }

    #[test]
    fn present_fields_are_kept() {
        let mut record = base_record();
        record.result = Some(json!({"id": 7}));
        record.timestamp = Some("2026-01-01T00:00:00.000Z".to_string());

        let value = record.to_value();
        assert_eq!(value["result"]["id"], 7);
        assert_eq!(value["timestamp"], "2026-01-01T00:00:00.000Z");
    }

    #[test]
    fn mandatory_fields_always_serialize() {
        let value = base_record().to_value();

        assert_eq!(value["service"], "billing");
        assert_eq!(value["method"], "charge");
        assert_eq!(value["application"], "api");
        assert_eq!(value["level"], "info");
        assert_eq!(value["params"], json!([1, 2]));
        assert_eq!(value["benchmark"], "1.000ms");
    }

    #[test]
    fn truthiness_follows_js_semantics() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));

        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }
}
