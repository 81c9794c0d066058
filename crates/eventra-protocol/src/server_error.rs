//! Normalization of backend error bodies.
//!
//! The backend reports failures in several shapes:
//!
//! ```text
//! {"error": "Event is full"}
//! {"message": "Failed to save session."}
//! {"detail": "Given token not valid for any token type"}
//! {"non_field_errors": ["Invalid email or password"]}
//! {"email": ["user with this email already exists."], "password": ["Too short."]}
//! ```
//!
//! [`ServerError::from_body`] folds all of them into one message plus a map
//! of per-field errors that UI code can render inline.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Keys that carry the top-level message, in priority order.
const MESSAGE_KEYS: [&str; 3] = ["error", "message", "detail"];
const NON_FIELD_KEY: &str = "non_field_errors";

/// Per-field validation messages reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

/// A non-2xx answer from the backend, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub status: u16,
    /// Human-readable summary, never empty.
    pub message: String,
    pub fields: FieldErrors,
}

impl ServerError {
    /// Parses an error body. `fallback` becomes the message when the body
    /// carries none (empty body, HTML page, field errors only).
    pub fn from_body(status: u16, body: &[u8], fallback: &str) -> Self {
        let mut message = None;
        let mut fields = FieldErrors::new();

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => {
                message = MESSAGE_KEYS
                    .iter()
                    .find_map(|key| map.get(*key).and_then(as_message));
                if message.is_none() {
                    message = map
                        .get(NON_FIELD_KEY)
                        .and_then(|v| messages_of(v).into_iter().next());
                }
                for (key, value) in &map {
                    if MESSAGE_KEYS.contains(&key.as_str()) || key == NON_FIELD_KEY {
                        continue;
                    }
                    for text in messages_of(value) {
                        fields.insert(key.clone(), text);
                    }
                }
            }
            Ok(Value::String(text)) if !text.trim().is_empty() => message = Some(text),
            Ok(Value::Array(items)) => {
                message = items.iter().find_map(as_message);
            }
            _ => {}
        }

        Self {
            status,
            message: message.unwrap_or_else(|| fallback.to_string()),
            fields,
        }
    }

    /// `true` when the server rejected the payload field by field: a 400
    /// that named at least one field.
    pub fn is_validation(&self) -> bool {
        self.status == 400 && !self.fields.is_empty()
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

fn as_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(as_message),
        _ => None,
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
