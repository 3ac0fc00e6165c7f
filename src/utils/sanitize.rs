use serde_json::Value;

/// Masks payment-sensitive fields in JSON payloads before they are logged.
pub fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, val) in map {
                let sanitized_val = if is_sensitive_field(key) {
                    mask_value(val)
                } else {
                    sanitize_json(val)
                };
                sanitized.insert(key.clone(), sanitized_val);
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sanitize_json).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_field(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "phonenumber" | "phone" | "msisdn" | "partyb" | "password" | "secret" | "token"
            | "api_key" | "authorization"
    )
}

fn mask_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.len() > 6 => {
            Value::String(format!("{}****{}", &s[..3], &s[s.len() - 2..]))
        }
        Value::Number(n) => {
            let digits = n.to_string();
            if digits.len() > 6 {
                Value::String(format!("{}****{}", &digits[..3], &digits[digits.len() - 2..]))
            } else {
                Value::String("****".to_string())
            }
        }
        _ => Value::String("****".to_string()),
    }
}
