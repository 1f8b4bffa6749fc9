//! Configuration management for the Zendesk connection.
//!
//! This module handles loading the Zendesk account settings from environment
//! variables, with validation to ensure all required values are present.

use crate::error::ZendeskError;
use std::env;

/// Settings for connecting to a Zendesk account.
///
/// The API token is stored but never logged or exposed in error messages.
#[derive(Clone)]
pub struct ZendeskConfig {
    /// Zendesk subdomain (the `acme` in `acme.zendesk.com`).
    pub subdomain: String,

    /// Email of the agent the API token belongs to.
    pub user_email: String,

    /// API token used with basic authentication.
    /// This value must never be logged or included in error messages.
    api_token: String,

    /// Explicit API base URL, overriding the one derived from the subdomain.
    pub base_url: Option<String>,
}

impl ZendeskConfig {
    /// Creates a configuration from explicit values, validating them.
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::Config` if any value fails validation.
    pub fn new(
        subdomain: impl Into<String>,
        user_email: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self, ZendeskError> {
        let subdomain = Self::validate_subdomain(subdomain.into())?;
        let user_email = user_email.into().trim().to_string();
        if !user_email.contains('@') {
            return Err(ZendeskError::invalid_config(
                "ZENDESK_USER_EMAIL must be an email address",
            ));
        }
        let api_token = api_token.into().trim().to_string();
        Self::validate_api_token(&api_token)?;

        Ok(ZendeskConfig {
            subdomain,
            user_email,
            api_token,
            base_url: None,
        })
    }

    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `ZENDESK_SUBDOMAIN`: The account subdomain
    /// - `ZENDESK_USER_EMAIL`: The agent email the token belongs to
    /// - `ZENDESK_API_TOKEN`: The API token
    ///
    /// # Optional
    ///
    /// - `ZENDESK_BASE_URL`: Full API base URL, mostly useful for testing
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::Config` if any required variable is missing
    /// or if values fail validation.
    ///
    /// # Example
    ///
    /// ```ignore
    /// dotenvy::dotenv().ok();
    /// let config = ZendeskConfig::from_env()?;
    /// ```
    pub fn from_env() -> Result<Self, ZendeskError> {
        let subdomain = Self::get_required_env("ZENDESK_SUBDOMAIN")?;
        let user_email = Self::get_required_env("ZENDESK_USER_EMAIL")?;
        let api_token = Self::get_required_env("ZENDESK_API_TOKEN")?;

        let config = Self::new(subdomain, user_email, api_token)?;

        match env::var("ZENDESK_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => config.with_base_url(url),
            _ => Ok(config),
        }
    }

    /// Overrides the API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::Config` if the URL is not http(s).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self, ZendeskError> {
        self.base_url = Some(Self::validate_base_url(url.into())?);
        Ok(self)
    }

    /// Returns the API token. Only for building auth headers and redaction.
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Returns the API base URL, e.g. `https://acme.zendesk.com/api/v2`.
    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{}.zendesk.com/api/v2", self.subdomain),
        }
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, ZendeskError> {
        env::var(name)
            .map_err(|_| ZendeskError::missing_env(name))
            .and_then(|value| {
                if value.trim().is_empty() {
                    Err(ZendeskError::missing_env(name))
                } else {
                    Ok(value)
                }
            })
    }

    /// Validates the subdomain, accepting a full `*.zendesk.com` host too.
    fn validate_subdomain(subdomain: String) -> Result<String, ZendeskError> {
        let subdomain = subdomain.trim().to_lowercase();
        let subdomain = subdomain
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .trim_end_matches(".zendesk.com")
            .to_string();

        if subdomain.is_empty()
            || !subdomain
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(ZendeskError::invalid_config(
                "ZENDESK_SUBDOMAIN must contain only letters, digits and hyphens",
            ));
        }

        Ok(subdomain)
    }

    /// Validates and normalizes an explicit base URL.
    fn validate_base_url(url: String) -> Result<String, ZendeskError> {
        let url = url.trim().trim_end_matches('/').to_string();

        let parsed = url::Url::parse(&url)
            .map_err(|e| ZendeskError::invalid_config(format!("invalid ZENDESK_BASE_URL: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ZendeskError::invalid_config(
                "ZENDESK_BASE_URL must start with http:// or https://",
            ));
        }

        Ok(url)
    }

    /// Validates the API token is not a placeholder value.
    fn validate_api_token(token: &str) -> Result<(), ZendeskError> {
        if token.is_empty() {
            return Err(ZendeskError::missing_env("ZENDESK_API_TOKEN"));
        }

        let token_lower = token.to_lowercase();
        let placeholder_patterns = [
            "your_api_token",
            "your_token",
            "placeholder",
            "xxx",
            "changeme",
        ];

        for pattern in placeholder_patterns {
            if token_lower.contains(pattern) {
                return Err(ZendeskError::invalid_config(
                    "ZENDESK_API_TOKEN appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for ZendeskConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZendeskConfig")
            .field("subdomain", &self.subdomain)
            .field("user_email", &self.user_email)
            .field("api_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}
