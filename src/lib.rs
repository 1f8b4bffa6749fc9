//! # zendesk-webform
//!
//! Creates Zendesk support tickets from web form submissions.
//!
//! A form is configured with a [`ConfigurationTemplate`](webform::ConfigurationTemplate)
//! whose attributes either name form elements or hold literal text. When a
//! submission is saved, the [`ZendeskHandler`](handler::ZendeskHandler) maps it
//! onto a ticket and creates it through the Zendesk API.
//!
//! ## Features
//!
//! - **Field resolution**: any attribute can name an element, falling back to literal text
//! - **Tokens**: `[webform_submission:sid]`, `[webform_submission:values]` and
//!   `[webform_submission:values:KEY]`
//! - **Normalization**: tags become Zendesk-safe words, collaborators a clean list
//! - **Custom fields**: YAML mapping of field id to value or element key
//! - **Assignee lookup**: an agent email is resolved to a Zendesk user id
//! - **Attachments**: uploaded files are sent along with the first comment
//! - **Security**: the API token is never logged or exposed in error messages
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types with security-conscious message sanitization
//! - [`webform`] - Submissions and the per-form configuration template
//! - [`mapping`] - Submission to ticket mapping steps
//! - [`tokens`] - Submission token replacement
//! - [`collaborators`] - Traits the handler depends on, with default implementations
//! - [`zendesk_client`] - HTTP client for the Zendesk API
//! - [`handler`] - The orchestrator run after a submission is saved
//! - [`models`] - Data models for Zendesk API requests and responses
//!
//! ## Configuration
//!
//! The binary and [`ZendeskConfig::from_env`](config::ZendeskConfig::from_env) read:
//!
//! - `ZENDESK_SUBDOMAIN`: the account subdomain (`acme` for `acme.zendesk.com`)
//! - `ZENDESK_USER_EMAIL`: email of the agent owning the API token
//! - `ZENDESK_API_TOKEN`: the API token
//!
//! Optional:
//! - `ZENDESK_BASE_URL`: overrides the API location
//! - `RUST_LOG`: Log level (e.g., `zendesk_webform=debug`)
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use zendesk_webform::collaborators::DirectoryFileStorage;
//! use zendesk_webform::config::ZendeskConfig;
//! use zendesk_webform::handler::ZendeskHandler;
//! use zendesk_webform::webform::{ConfigurationTemplate, SubmissionRecord};
//! use zendesk_webform::zendesk_client::ZendeskClient;
//!
//! async fn example() -> Result<(), zendesk_webform::error::ZendeskError> {
//!     let config = ZendeskConfig::from_env()?;
//!     let client = Arc::new(ZendeskClient::new(&config)?);
//!     let files = Arc::new(DirectoryFileStorage::new("/srv/webform/files"));
//!
//!     let template = ConfigurationTemplate::from_yaml("requester: email\nsubject: subject\n")?;
//!     let handler = ZendeskHandler::new("Contact", template, client, files);
//!
//!     let mut submission = SubmissionRecord::new("42")
//!         .with_value("email", "jane@example.com")
//!         .with_value("subject", "Cannot log in");
//!     let outcome = handler.post_save(&mut submission, false).await;
//!     println!("{:?}", outcome);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod collaborators;
pub mod config;
pub mod error;
pub mod handler;
pub mod mapping;
pub mod models;
pub mod tokens;
pub mod webform;
pub mod zendesk_client;
