//! User models for the Zendesk API.
//!
//! Users are looked up when a handler assigns tickets by agent email.

use serde::Deserialize;

/// A Zendesk user (end user, agent or admin).
///
/// Only the fields needed for assignee lookup are captured.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: u64,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Primary email.
    #[serde(default)]
    pub email: Option<String>,

    /// `end-user`, `agent` or `admin`.
    #[serde(default)]
    pub role: Option<String>,

    /// Whether the user is active.
    #[serde(default)]
    pub active: Option<bool>,
}

impl User {
    /// Returns the display name, falling back to email or ID.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Returns true if the user's email matches, ignoring case.
    pub fn has_email(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(email.trim()))
    }
}

/// Response wrapper for user list and search operations.
#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersResponse {
    /// Users on this page.
    #[serde(default)]
    pub users: Vec<User>,

    /// URL of the next page, if any.
    #[serde(default)]
    pub next_page: Option<String>,

    /// Total number of matches.
    #[serde(default)]
    pub count: Option<u64>,
}

/// Filter for listing users.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    /// Free text or email search.
    pub query: Option<String>,

    /// Restrict to a role (`agent`, `admin`, `end-user`).
    pub role: Option<String>,
}

impl UserFilter {
    /// Creates an empty filter (lists all users).
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches users by email or name.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Restricts results to a role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_email_ignores_case() {
        let user = User {
            id: 7,
            name: Some("Agent Smith".to_string()),
            email: Some("Smith@Example.com".to_string()),
            role: Some("agent".to_string()),
            active: Some(true),
        };
        assert!(user.has_email("smith@example.com "));
        assert!(!user.has_email("jones@example.com"));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let user: User = serde_json::from_str(r#"{"id": 99}"#).unwrap();
        assert_eq!(user.display_name(), "99");
    }

    #[test]
    fn test_list_users_response() {
        let response: ListUsersResponse = serde_json::from_str(
            r#"{"users":[{"id":1,"name":"A","email":"a@x.com"}],"next_page":null,"count":1}"#,
        )
        .unwrap();
        assert_eq!(response.users.len(), 1);
        assert_eq!(response.count, Some(1));
    }

    #[test]
    fn test_user_filter_builder() {
        let filter = UserFilter::new().with_query("a@x.com").with_role("agent");
        assert_eq!(filter.query.as_deref(), Some("a@x.com"));
        assert_eq!(filter.role.as_deref(), Some("agent"));
    }
}
