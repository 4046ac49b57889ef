//! Audit-payload sanitization.
//!
//! Every request serialized for logging or the `audit_payload` column passes
//! through [`sanitize`], which replaces PIN-bearing values with `"******"`.
//! Key matching is by normalized name (lowercased, hyphens stripped) and the
//! redaction recurses through nested objects and arrays.

use serde_json::Value;

const REDACTED: &str = "******";

const SENSITIVE_KEYS: &[&str] = &[
    "pin",
    "transactionpin",
    "transaction_pin",
    "transactionpinhash",
    "transaction_pin_hash",
];

/// Serialize `payload` to a JSON value with all PIN fields redacted.
///
/// Serialization failures yield a placeholder rather than an error: the
/// audit trail is advisory and must never fail a transfer.
pub fn sanitize_payload<T: serde::Serialize>(payload: &T) -> Value {
    match serde_json::to_value(payload) {
        Ok(value) => sanitize(value),
        Err(_) => Value::String("<unavailable>".to_string()),
    }
}

/// Redact sensitive keys in a JSON value, recursing into maps and arrays.
pub fn sanitize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| {
                    if is_sensitive_key(&key) {
                        (key, Value::String(REDACTED.to_string()))
                    } else {
                        (key, sanitize(inner))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize).collect()),
        other => other,
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_lowercase().replace('-', "");
    SENSITIVE_KEYS.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_pin_keys() {
        let sanitized = sanitize(json!({
            "transactionPIN": "1234",
            "debitAccountNumber": "0123456789",
        }));
        assert_eq!(sanitized["transactionPIN"], "******");
        assert_eq!(sanitized["debitAccountNumber"], "0123456789");
    }

    #[test]
    fn redacts_nested_and_array_values() {
        let sanitized = sanitize(json!({
            "outer": { "pin": "0000" },
            "items": [{ "transaction_pin_hash": "$2a$..." }, { "amount": "10" }],
        }));
        assert_eq!(sanitized["outer"]["pin"], "******");
        assert_eq!(sanitized["items"][0]["transaction_pin_hash"], "******");
        assert_eq!(sanitized["items"][1]["amount"], "10");
    }

    #[test]
    fn normalizes_case_and_hyphens() {
        let sanitized = sanitize(json!({ "Transaction-PIN": "9999" }));
        assert_eq!(sanitized["Transaction-PIN"], "******");
    }

    #[test]
    fn sanitizing_twice_is_a_fixed_point() {
        let payload = json!({
            "transactionPIN": "1234",
            "nested": { "pin": "0000", "narration": "Salary" },
        });
        let once = sanitize(payload);
        let twice = sanitize(once.clone());
        assert_eq!(once, twice);
    }
}
