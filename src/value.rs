// src/value.rs

//! Value types flowing through ports and configuration.
//!
//! Port payloads and module configuration are opaque to the engine; they
//! are carried as `serde_json::Value` so that the persisted pipeline
//! document, module configs and routed data share one representation.

use serde_json::Value;

/// A single value carried on a port.
pub type PortValue = Value;

/// Port-name (or config-key) to value mapping.
pub type ValueMap = serde_json::Map<String, Value>;

/// Interpret a value as a boolean the way the flow modules do.
///
/// Accepted forms:
/// - booleans as-is
/// - numbers: zero is `false`, anything else `true`
/// - strings: `true/yes/y/1/ok/pass/passed/success` and
///   `false/no/n/0/nok/ng/fail/failed/error` (case-insensitive);
///   other strings fall back to "non-empty is true"
/// - `null` is `false`; arrays/objects are `true` when non-empty
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => {
            let v = s.trim().to_lowercase();
            const TRUE_SET: &[&str] =
                &["true", "1", "yes", "y", "ok", "pass", "passed", "success"];
            const FALSE_SET: &[&str] =
                &["false", "0", "no", "n", "nok", "ng", "fail", "failed", "error"];
            if TRUE_SET.contains(&v.as_str()) {
                return true;
            }
            if FALSE_SET.contains(&v.as_str()) {
                return false;
            }
            match v.parse::<f64>() {
                Ok(f) => f != 0.0,
                Err(_) => !v.is_empty(),
            }
        }
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_common_status_strings() {
        assert!(coerce_bool(&json!("OK")));
        assert!(coerce_bool(&json!("pass")));
        assert!(!coerce_bool(&json!("NOK")));
        assert!(!coerce_bool(&json!("ng")));
    }

    #[test]
    fn coerces_numbers_and_null() {
        assert!(!coerce_bool(&json!(0)));
        assert!(coerce_bool(&json!(0.5)));
        assert!(!coerce_bool(&json!(null)));
    }

    #[test]
    fn unknown_strings_fall_back_to_non_empty() {
        assert!(coerce_bool(&json!("anything")));
        assert!(!coerce_bool(&json!("")));
        assert!(coerce_bool(&json!("2.5")));
    }
}
