//! Common types shared across Zendesk API models.
//!
//! This module defines the ticket identifier, the error envelope Zendesk
//! returns on failed requests, and the id (de)serialization helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ZendeskError;

/// Identifier of a ticket created in Zendesk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub u64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error body returned by Zendesk on failed requests.
///
/// Zendesk is not consistent here: `error` is usually a short code
/// (`"RecordInvalid"`), but some endpoints return an object with `title`
/// and `message` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error code string, or an object with `title`/`message`.
    #[serde(default)]
    pub error: Option<serde_json::Value>,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// Per-field validation details, if any.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorBody {
    /// Returns the short error code.
    pub fn code(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(code)) => code.clone(),
            Some(serde_json::Value::Object(map)) => map
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or("UnknownError")
                .to_string(),
            _ => "UnknownError".to_string(),
        }
    }

    /// Returns the most descriptive message available.
    pub fn message(&self) -> String {
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            return match &self.details {
                Some(details) => format!("{} {}", description, details),
                None => description.to_string(),
            };
        }
        if let Some(serde_json::Value::Object(map)) = &self.error {
            if let Some(message) = map.get("message").and_then(|m| m.as_str()) {
                return message.to_string();
            }
        }
        "no description".to_string()
    }

    /// Converts the body into a `ZendeskError::ZendeskApi`.
    pub fn into_error(self) -> ZendeskError {
        ZendeskError::ZendeskApi {
            error: self.code(),
            description: self.message(),
        }
    }
}

/// Serializes an id that is all digits as a JSON number, anything else as a string.
pub(crate) fn serialize_numeric_id<S>(id: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match id.parse::<u64>() {
        Ok(number) => serializer.serialize_u64(number),
        Err(_) => serializer.serialize_str(id),
    }
}

/// Deserializes an id that can be either a string or an integer into a String.
pub(crate) fn deserialize_string_or_int<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct StringOrIntVisitor;

    impl<'de> Visitor<'de> for StringOrIntVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or an integer")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrIntVisitor)
}
