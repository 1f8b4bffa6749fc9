//! Assignee resolution.

use serde_json::Value;

use super::resolve::value_to_text;
use crate::collaborators::TicketingClient;
use crate::error::ZendeskError;
use crate::models::UserFilter;

/// Turns the resolved assignee into a Zendesk user id.
///
/// Blank means unassigned. A number is used as-is. An email is looked up
/// through the ticketing client; no exact match leaves the ticket unassigned.
///
/// # Errors
///
/// Returns `ZendeskError::Mapping` for text that is neither an id nor an
/// email, and any error from the user lookup.
pub async fn resolve_assignee(
    value: &Value,
    client: &dyn TicketingClient,
) -> Result<Option<u64>, ZendeskError> {
    let text = value_to_text(value);
    let text = text.trim();

    if text.is_empty() {
        return Ok(None);
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ZendeskError::mapping(format!("assignee id {} is out of range", text)));
    }

    if !text.contains('@') {
        return Err(ZendeskError::mapping(format!(
            "assignee {:?} is neither a user id nor an email",
            text
        )));
    }

    let users = client
        .list_users(&UserFilter::new().with_query(text))
        .await?;

    match users.into_iter().find(|user| user.has_email(text)) {
        Some(user) => {
            tracing::debug!(
                assignee_id = user.id,
                assignee = %user.display_name(),
                "Resolved assignee by email"
            );
            Ok(Some(user.id))
        }
        None => {
            tracing::warn!(
                assignee = %text,
                "No Zendesk user matches assignee email, leaving unassigned"
            );
            Ok(None)
        }
    }
}
