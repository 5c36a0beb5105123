//! Masks credentials in a serialized config before it is logged or printed.

use serde_json::Value;

const SENSITIVE_KEYS: &[&str] = &["token", "botToken", "secret", "password"];

/// Copy of `value` with every sensitive string replaced by a short hint.
pub fn redact(value: &Value) -> Value {
    redact_under(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(s: &str) -> String {
    // Keeps the numeric bot id prefix short enough to be useless.
    if s.chars().count() > 4 {
        format!("{}***", s.chars().take(4).collect::<String>())
    } else {
        "***".to_string()
    }
}

fn redact_under(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_under(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_under(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_telegram_token() {
        let v = json!({"telegram": {"token": "123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw"}});
        let redacted = redact(&v);
        assert_eq!(redacted["telegram"]["token"], "1234***");
    }

    #[test]
    fn leaves_token_file_path_alone() {
        let v = json!({"telegram": {"tokenFile": "/etc/pagetree/token"}});
        assert_eq!(redact(&v)["telegram"]["tokenFile"], "/etc/pagetree/token");
    }

    #[test]
    fn passthrough_non_sensitive() {
        let v = json!({"admins": ["alice"], "logging": {"level": "debug"}});
        assert_eq!(redact(&v), v);
    }
}
