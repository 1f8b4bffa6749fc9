//! Error types for the Zendesk webform handler.
//!
//! This module defines `ZendeskError`, the unified error type used throughout
//! the crate, from mapping a submission to talking to the Zendesk API.
//!
//! # Security
//!
//! All error messages are sanitized to ensure the API token is never leaked
//! in logs or failure records. Use `sanitize_message()` when constructing
//! error messages from external sources.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for all handler operations.
///
/// Each variant provides specific context about the failure. The variant
/// name doubles as the "exception class" recorded when a ticket cannot be
/// created, see [`ZendeskError::kind`].
#[derive(Error, Debug)]
pub enum ZendeskError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, redacted and truncated.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {duration:?} during {operation}")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// Rate limited by Zendesk (HTTP 429).
    #[error("rate limited by Zendesk")]
    RateLimited {
        /// Retry delay advertised by the server, if any.
        retry_after: Option<Duration>,
    },

    /// Zendesk temporarily unavailable (HTTP 502/503/504).
    #[error("Zendesk temporarily unavailable ({status})")]
    ServiceUnavailable {
        /// The specific status code.
        status: reqwest::StatusCode,
    },

    /// Zendesk rejected the payload (usually HTTP 422).
    #[error("Zendesk API error {error}: {description}")]
    ZendeskApi {
        /// Short error code from Zendesk, e.g. `RecordInvalid`.
        error: String,
        /// Human-readable description from Zendesk.
        description: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing failed (handler template or custom fields).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// What was being looked up.
        resource: String,
    },

    /// Authentication failed - likely an invalid API token or user email.
    #[error("authentication failed - check ZENDESK_USER_EMAIL and ZENDESK_API_TOKEN")]
    Authentication,

    /// The template and submission could not be mapped to a ticket.
    #[error("mapping error: {0}")]
    Mapping(String),

    /// Template validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A stored file could not be loaded or uploaded.
    #[error("attachment {file} failed: {message}")]
    Attachment {
        /// File id or name the failure relates to.
        file: String,
        /// Details about the failure.
        message: String,
    },

    /// Connection test failed.
    #[error("connection test failed: {message}")]
    ConnectionTest {
        /// Details about why the connection test failed.
        message: String,
    },
}

impl ZendeskError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        ZendeskError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ZendeskError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ZendeskError::Validation(message.into())
    }

    /// Creates a mapping error.
    pub fn mapping(message: impl Into<String>) -> Self {
        ZendeskError::Mapping(message.into())
    }

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        ZendeskError::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        ZendeskError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Creates an attachment error.
    pub fn attachment(file: impl Into<String>, message: impl Into<String>) -> Self {
        ZendeskError::Attachment {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Creates a connection test error.
    pub fn connection_test(message: impl Into<String>) -> Self {
        ZendeskError::ConnectionTest {
            message: message.into(),
        }
    }

    /// Returns the variant name, used as the error class in failure logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ZendeskError::Config(_) => "Config",
            ZendeskError::Http(_) => "Http",
            ZendeskError::HttpClient(_) => "HttpClient",
            ZendeskError::HttpStatus { .. } => "HttpStatus",
            ZendeskError::Timeout { .. } => "Timeout",
            ZendeskError::RateLimited { .. } => "RateLimited",
            ZendeskError::ServiceUnavailable { .. } => "ServiceUnavailable",
            ZendeskError::ZendeskApi { .. } => "ZendeskApi",
            ZendeskError::Serialization(_) => "Serialization",
            ZendeskError::Yaml(_) => "Yaml",
            ZendeskError::NotFound { .. } => "NotFound",
            ZendeskError::Authentication => "Authentication",
            ZendeskError::Mapping(_) => "Mapping",
            ZendeskError::Validation(_) => "Validation",
            ZendeskError::Attachment { .. } => "Attachment",
            ZendeskError::ConnectionTest { .. } => "ConnectionTest",
        }
    }

    /// Returns true if the failure happened before anything was sent to Zendesk.
    #[must_use]
    pub fn is_mapping_failure(&self) -> bool {
        matches!(
            self,
            ZendeskError::Mapping(_) | ZendeskError::Validation(_) | ZendeskError::Yaml(_)
        )
    }

    /// Sanitizes an error message to remove any occurrence of a secret.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to sanitize
    /// * `secret` - The API token (or other secret) to strip from the message
    ///
    /// # Returns
    ///
    /// The message with any occurrence of the secret replaced with `[REDACTED]`
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_error() {
        let err = ZendeskError::missing_env("ZENDESK_API_TOKEN");
        assert!(err.to_string().contains("ZENDESK_API_TOKEN"));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_mapping_error() {
        let err = ZendeskError::mapping("custom_fields must be a mapping");
        assert_eq!(
            err.to_string(),
            "mapping error: custom_fields must be a mapping"
        );
        assert!(err.is_mapping_failure());
    }

    #[test]
    fn test_timeout_error() {
        let err = ZendeskError::timeout(Duration::from_secs(30), "POST /tickets.json");
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("30s"));
        assert!(msg.contains("/tickets.json"));
    }

    #[test]
    fn test_kind_names_variant() {
        assert_eq!(ZendeskError::Authentication.kind(), "Authentication");
        assert_eq!(ZendeskError::not_found("user").kind(), "NotFound");
        assert_eq!(
            ZendeskError::RateLimited { retry_after: None }.kind(),
            "RateLimited"
        );
        assert_eq!(ZendeskError::attachment("1", "gone").kind(), "Attachment");
    }

    #[test]
    fn test_transport_errors_are_not_mapping_failures() {
        let err = ZendeskError::ServiceUnavailable {
            status: reqwest::StatusCode::BAD_GATEWAY,
        };
        assert!(!err.is_mapping_failure());
        assert!(!ZendeskError::Authentication.is_mapping_failure());
    }

    #[test]
    fn test_sanitize_message_removes_token() {
        let token = "super_secret_token_12345";
        let message = format!("Error connecting with token {} to server", token);
        let sanitized = ZendeskError::sanitize_message(&message, token);
        assert!(!sanitized.contains(token));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_secret() {
        let message = "Some error message";
        let sanitized = ZendeskError::sanitize_message(message, "");
        assert_eq!(sanitized, message);
    }

    #[test]
    fn test_zendesk_api_error_display() {
        let err = ZendeskError::ZendeskApi {
            error: "RecordInvalid".to_string(),
            description: "Record validation errors".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("RecordInvalid"));
        assert!(msg.contains("validation errors"));
    }
}
