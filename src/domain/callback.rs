//! Gateway callback normalization.
//!
//! Payment-gateway callbacks arrive either flat or wrapped in a provider
//! envelope (`Body.stkCallback`), and correlation field casing varies between
//! gateway versions (`MerchantRequestID` vs `merchantRequestID`). Everything
//! is normalized here, once, at ingestion; downstream code never does its own
//! casing checks.

use serde_json::Value;

/// Correlation field names recognized in stored gateway payloads,
/// lowercase for case-insensitive comparison.
pub const CORRELATION_KEYS: &[&str] = &["merchantrequestid", "checkoutrequestid"];

/// What the callback's result code says about the payment outcome.
///
/// A `0` (number or string) means success, any other non-null value means
/// failure. An absent or null code is `Unknown` and must never be treated
/// as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackVerdict {
    Success,
    Failed,
    Unknown,
}

/// A gateway callback with the envelope stripped and correlation
/// identifiers extracted.
#[derive(Debug, Clone)]
pub struct GatewayCallback {
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<String>,
    pub verdict: CallbackVerdict,
    /// The inner callback object, as received (envelope removed).
    pub payload: Value,
}

impl GatewayCallback {
    /// Normalizes a raw callback body.
    ///
    /// Unwraps a `Body.stkCallback` envelope when present, otherwise treats
    /// the object as the callback itself.
    pub fn normalize(raw: Value) -> Self {
        let inner = get_ci(&raw, "Body")
            .and_then(|body| get_ci(body, "stkCallback"))
            .cloned()
            .unwrap_or(raw);

        let merchant_request_id = get_ci(&inner, "MerchantRequestID").and_then(id_string);
        let checkout_request_id = get_ci(&inner, "CheckoutRequestID").and_then(id_string);
        let verdict = match get_ci(&inner, "ResultCode") {
            None | Some(Value::Null) => CallbackVerdict::Unknown,
            Some(Value::Number(n)) if n.as_i64() == Some(0) => CallbackVerdict::Success,
            Some(Value::String(s)) if s.trim() == "0" => CallbackVerdict::Success,
            Some(_) => CallbackVerdict::Failed,
        };

        Self {
            merchant_request_id,
            checkout_request_id,
            verdict,
            payload: inner,
        }
    }

    /// The correlation identifiers present on this callback.
    pub fn correlation_ids(&self) -> Vec<&str> {
        self.merchant_request_id
            .iter()
            .chain(self.checkout_request_id.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Case-insensitive key lookup in a JSON object.
pub fn get_ci<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .as_object()?
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

/// Collects the values of correlation fields anywhere in a stored payload.
///
/// Stored request/response payloads may themselves carry provider wrappers,
/// so the walk descends through objects and arrays.
pub fn correlation_values(payload: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_correlation_values(payload, &mut found);
    found
}

fn collect_correlation_values(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                if CORRELATION_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
                    if let Some(id) = id_string(val) {
                        found.push(id);
                    }
                } else {
                    collect_correlation_values(val, found);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_correlation_values(item, found);
            }
        }
        _ => {}
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
