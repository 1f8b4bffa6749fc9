//! Mapping of a submission onto a Zendesk ticket.
//!
//! The steps run in this order:
//!
//! 1. [`resolve`] - each template attribute becomes either the submitted
//!    value of the element it names or its own literal text
//! 2. [`normalize_tags`] / [`parse_collaborators`] - free text to lists
//! 3. [`transform_custom_fields`] - YAML to `{id, value}` pairs
//! 4. [`resolve_assignee`] - agent email to user id (needs the client)
//! 5. [`collect_attachments`] - stored files for upload (needs storage)
//! 6. [`shape_comment`] - comment body plus upload tokens
//!
//! Steps 4 and 5 talk to collaborators and are driven by the handler;
//! [`build_ticket_request`] runs the pure steps.

mod assignee;
mod attachments;
mod comment;
mod custom_fields;
mod resolve;
mod tags;

pub use assignee::resolve_assignee;
pub use attachments::collect_attachments;
pub use comment::{add_uploads, shape_comment};
pub use custom_fields::transform_custom_fields;
pub use resolve::{resolve, resolve_value, value_to_text, ResolvedTemplate};
pub use tags::{normalize_tags, parse_collaborators, tag_list};

use serde_json::Value;

use crate::error::ZendeskError;
use crate::models::{Priority, Requester, TicketRequest, TicketStatus, TicketType};
use crate::webform::{OriginMarker, SubmissionRecord};

/// Builds the ticket payload from a resolved template.
///
/// The result has no assignee and no uploads yet; those need the ticketing
/// client and are filled in by the handler.
///
/// # Errors
///
/// Returns `ZendeskError::Mapping` if the requester email or subject is
/// blank, an enum attribute has an unknown value, or the custom fields do
/// not parse.
pub fn build_ticket_request(
    resolved: &ResolvedTemplate,
    submission: &SubmissionRecord,
    origin_marker: Option<&OriginMarker>,
) -> Result<TicketRequest, ZendeskError> {
    let email = value_to_text(&resolved.requester).trim().to_string();
    if email.is_empty() {
        return Err(ZendeskError::mapping("requester email is empty"));
    }
    let name = value_to_text(&resolved.requester_name).trim().to_string();

    let subject = value_to_text(&resolved.subject).trim().to_string();
    if subject.is_empty() {
        return Err(ZendeskError::mapping("subject is empty"));
    }

    let custom_fields = transform_custom_fields(
        &value_to_text(&resolved.custom_fields),
        submission,
        origin_marker,
    )?;

    Ok(TicketRequest {
        subject,
        requester: Requester {
            email,
            name: (!name.is_empty()).then_some(name),
        },
        comment: shape_comment(&resolved.comment, &[]),
        tags: tag_list(&value_to_text(&resolved.tags)),
        priority: parse_choice::<Priority>(&resolved.priority)?,
        status: parse_choice::<TicketStatus>(&resolved.status)?,
        ticket_type: parse_choice::<TicketType>(&resolved.ticket_type)?,
        assignee_id: None,
        collaborators: parse_collaborators(&value_to_text(&resolved.collaborators)),
        custom_fields,
        external_id: submission.id.clone(),
    })
}

/// Parses an optional enum attribute; blank means "use the account default".
fn parse_choice<T>(value: &Value) -> Result<Option<T>, ZendeskError>
where
    T: std::str::FromStr<Err = ZendeskError>,
{
    let text = value_to_text(value);
    let text = text.trim();
    if text.is_empty() {
        Ok(None)
    } else {
        text.parse::<T>().map(Some)
    }
}
