//! HTTP client for the Zendesk Support API.
//!
//! This module provides `ZendeskClient`, the [`TicketingClient`] used in
//! production. It makes one attempt per call; a failed call is classified
//! into a [`ZendeskError`] and returned to the handler.
//!
//! # Security
//!
//! The API token is never logged. All error messages are sanitized before
//! they leave this module.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::collaborators::TicketingClient;
use crate::config::ZendeskConfig;
use crate::error::ZendeskError;
use crate::models::{
    ApiErrorBody, AttachmentSource, CreateTicketResponse, ListUsersResponse, TicketId,
    TicketRequest, UploadResponse, UploadToken, User, UserFilter,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum length for HTTP error response bodies kept in errors.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Body of an outgoing request.
enum Payload {
    None,
    Json(serde_json::Value),
    Bytes {
        data: Vec<u8>,
        content_type: String,
    },
}

/// HTTP client for the Zendesk API.
///
/// Cloning is cheap; clones share the connection pool.
///
/// # Example
///
/// ```ignore
/// let config = ZendeskConfig::from_env()?;
/// let client = ZendeskClient::new(&config)?;
///
/// let agents = client.list_users(&UserFilter::new().with_role("agent")).await?;
/// ```
#[derive(Clone)]
pub struct ZendeskClient {
    /// The underlying HTTP client.
    http: Client,

    /// API base URL (e.g., `https://acme.zendesk.com/api/v2`).
    base_url: String,

    /// Agent email the token belongs to.
    user_email: String,

    /// API token for authentication.
    /// SECURITY: Never log this value!
    api_token: String,
}

impl ZendeskClient {
    /// Creates a new Zendesk client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(config: &ZendeskConfig) -> Result<Self, ZendeskError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ZendeskError::HttpClient)?;

        Ok(Self {
            http,
            base_url: Self::normalize_base_url(&config.api_base_url()),
            user_email: config.user_email.clone(),
            api_token: config.api_token().to_string(),
        })
    }

    /// Normalizes the base URL to ensure it includes the API path.
    fn normalize_base_url(url: &str) -> String {
        let url = url.trim_end_matches('/');
        if url.ends_with("/api/v2") {
            url.to_string()
        } else if url.ends_with("/api") {
            format!("{}/v2", url)
        } else {
            format!("{}/api/v2", url)
        }
    }

    /// Returns the agent interface URL of a ticket.
    pub fn ticket_web_url(&self, ticket_id: TicketId) -> String {
        let web_base = self.base_url.trim_end_matches("/api/v2");
        format!("{}/agent/tickets/{}", web_base, ticket_id)
    }

    /// Tests connectivity and credentials.
    ///
    /// Zendesk answers `/users/me` for unauthenticated callers too, with an
    /// anonymous user that has no id, so that case is treated as bad
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::ConnectionTest` describing the failure.
    pub async fn test_connection(&self) -> Result<(), ZendeskError> {
        tracing::debug!("Testing connection to Zendesk");

        #[derive(Debug, serde::Deserialize)]
        struct Me {
            #[serde(default)]
            id: Option<u64>,
            #[serde(default)]
            role: Option<String>,
        }

        #[derive(Debug, serde::Deserialize)]
        struct MeResponse {
            user: Me,
        }

        let result: Result<MeResponse, ZendeskError> =
            self.request(Method::GET, "/users/me.json", &[], Payload::None).await;

        match result {
            Ok(MeResponse { user: Me { id: Some(id), role } }) => {
                tracing::info!(user_id = id, role = ?role, "Connection test successful");
                Ok(())
            }
            Ok(_) | Err(ZendeskError::Authentication) => Err(ZendeskError::connection_test(
                "Authentication failed - verify ZENDESK_USER_EMAIL and ZENDESK_API_TOKEN",
            )),
            Err(ZendeskError::Timeout { duration, .. }) => {
                Err(ZendeskError::connection_test(format!(
                    "Connection timed out after {:?} - verify ZENDESK_SUBDOMAIN and network",
                    duration
                )))
            }
            Err(e) => Err(ZendeskError::connection_test(self.sanitize(&e.to_string()))),
        }
    }

    /// Makes a request to the Zendesk API and parses the JSON response.
    async fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        payload: Payload,
    ) -> Result<T, ZendeskError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(
            method = %method,
            path = %path,
            "Making Zendesk API request"
        );

        let mut req = self
            .http
            .request(method.clone(), &url)
            .basic_auth(format!("{}/token", self.user_email), Some(&self.api_token))
            .header("Accept", "application/json");

        if !query.is_empty() {
            req = req.query(query);
        }

        req = match payload {
            Payload::None => req,
            Payload::Json(body) => req.json(&body),
            Payload::Bytes { data, content_type } => {
                req.header("Content-Type", content_type).body(data)
            }
        };

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                return ZendeskError::timeout(
                    Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                    format!("{} {}", method, path),
                );
            }
            ZendeskError::Http(e)
        })?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.handle_http_error(status, response).await);
        }

        let body = response.text().await.map_err(ZendeskError::Http)?;

        tracing::trace!(body = %body, "Zendesk API response");

        Ok(serde_json::from_str(&body)?)
    }

    /// Handles HTTP-level errors and converts them to `ZendeskError`.
    async fn handle_http_error(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> ZendeskError {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response.text().await.unwrap_or_default();
        let body = self.sanitize(&body);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ZendeskError::Authentication,
            StatusCode::NOT_FOUND => ZendeskError::not_found("resource"),
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!(retry_after = ?retry_after, "Rate limited by Zendesk");
                ZendeskError::RateLimited { retry_after }
            }
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => {
                tracing::warn!(status = %status, "Zendesk temporarily unavailable");
                ZendeskError::ServiceUnavailable { status }
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                match serde_json::from_str::<ApiErrorBody>(&body) {
                    Ok(api_error) => api_error.into_error(),
                    Err(_) => ZendeskError::HttpStatus {
                        status,
                        body: truncate_body(body),
                    },
                }
            }
            _ => ZendeskError::HttpStatus {
                status,
                body: truncate_body(body),
            },
        }
    }

    /// Resolves an attachment URI to a local path.
    fn attachment_path(uri: &str) -> Result<PathBuf, ZendeskError> {
        match Url::parse(uri) {
            Ok(url) if url.scheme() == "file" => url.to_file_path().map_err(|_| {
                ZendeskError::attachment(uri, "file URL does not point to a local path")
            }),
            // single letters are Windows drive prefixes, not schemes
            Ok(url) if url.scheme().len() > 1 => Err(ZendeskError::attachment(
                uri,
                format!("unsupported URI scheme {:?}", url.scheme()),
            )),
            _ => Ok(PathBuf::from(uri)),
        }
    }
}

#[async_trait]
impl TicketingClient for ZendeskClient {
    /// Creates a ticket with `POST /tickets.json`.
    async fn create_ticket(&self, ticket: &TicketRequest) -> Result<TicketId, ZendeskError> {
        let envelope = ticket.to_envelope()?;

        let response: CreateTicketResponse = self
            .request(Method::POST, "/tickets.json", &[], Payload::Json(envelope))
            .await?;

        let ticket_id = TicketId(response.ticket.id);
        tracing::info!(
            ticket_id = %ticket_id,
            external_id = %ticket.external_id,
            "Created Zendesk ticket"
        );
        Ok(ticket_id)
    }

    /// Uploads a file with `POST /uploads.json`.
    async fn upload_attachment(
        &self,
        source: &AttachmentSource,
    ) -> Result<UploadToken, ZendeskError> {
        let path = Self::attachment_path(&source.uri)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| ZendeskError::attachment(&source.file_name, e.to_string()))?;

        let upload_path = format!(
            "/uploads.json?filename={}",
            urlencoding::encode(&source.file_name)
        );
        let response: UploadResponse = self
            .request(
                Method::POST,
                &upload_path,
                &[],
                Payload::Bytes {
                    data,
                    content_type: source.mime_type.clone(),
                },
            )
            .await?;

        tracing::debug!(file_name = %source.file_name, "Uploaded attachment");
        Ok(UploadToken(response.upload.token))
    }

    /// Lists users, searching by query when the filter has one.
    ///
    /// Only the first page is returned.
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, ZendeskError> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(role) = filter.role.as_deref() {
            query.push(("role", role));
        }

        let path = match filter.query.as_deref() {
            Some(search) => {
                query.push(("query", search));
                "/users/search.json"
            }
            None => "/users.json",
        };

        let response: ListUsersResponse = self
            .request(Method::GET, path, &query, Payload::None)
            .await?;

        Ok(response.users)
    }

    fn sanitize(&self, message: &str) -> String {
        ZendeskError::sanitize_message(message, &self.api_token)
    }
}

/// Truncates an error body to avoid keeping verbose API internals.
fn truncate_body(body: String) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LEN {
        let kept: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{}...[truncated]", kept)
    } else {
        body
    }
}
