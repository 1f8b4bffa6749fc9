//! Ticket models for the Zendesk API.
//!
//! This module defines the typed ticket-creation payload built from a form
//! submission, its enum attributes, and the response returned on creation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::common::{deserialize_string_or_int, serialize_numeric_id};
use crate::error::ZendeskError;

/// Ticket urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Low urgency.
    Low,
    /// The Zendesk default.
    Normal,
    /// High urgency.
    High,
    /// Needs attention now.
    Urgent,
}

impl Priority {
    /// Returns the API name of the priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = ZendeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(ZendeskError::mapping(format!(
                "invalid priority {:?}, expected one of low, normal, high, urgent",
                other
            ))),
        }
    }
}

/// Ticket state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Not yet looked at.
    New,
    /// Being worked on.
    Open,
    /// Waiting on the requester.
    Pending,
    /// Waiting on a third party.
    Hold,
    /// Resolved.
    Solved,
    /// Closed for good.
    Closed,
}

impl TicketStatus {
    /// Returns the API name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Open => "open",
            TicketStatus::Pending => "pending",
            TicketStatus::Hold => "hold",
            TicketStatus::Solved => "solved",
            TicketStatus::Closed => "closed",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = ZendeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(TicketStatus::New),
            "open" => Ok(TicketStatus::Open),
            "pending" => Ok(TicketStatus::Pending),
            "hold" => Ok(TicketStatus::Hold),
            "solved" => Ok(TicketStatus::Solved),
            "closed" => Ok(TicketStatus::Closed),
            other => Err(ZendeskError::mapping(format!(
                "invalid status {:?}, expected one of new, open, pending, hold, solved, closed",
                other
            ))),
        }
    }
}

/// Ticket type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    /// Root cause of incidents.
    Problem,
    /// Occurrence of a problem.
    Incident,
    /// A question from the requester.
    Question,
    /// Something to do.
    Task,
}

impl TicketType {
    /// Returns the API name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Problem => "problem",
            TicketType::Incident => "incident",
            TicketType::Question => "question",
            TicketType::Task => "task",
        }
    }
}

impl FromStr for TicketType {
    type Err = ZendeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "problem" => Ok(TicketType::Problem),
            "incident" => Ok(TicketType::Incident),
            "question" => Ok(TicketType::Question),
            "task" => Ok(TicketType::Task),
            other => Err(ZendeskError::mapping(format!(
                "invalid ticket type {:?}, expected one of problem, incident, question, task",
                other
            ))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user who requested the ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requester {
    /// Requester email; Zendesk creates the user if it does not exist.
    pub email: String,

    /// Display name used when Zendesk creates the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The first comment of a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment text.
    pub body: String,

    /// Upload tokens of attachments to include with the comment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uploads: Vec<String>,

    /// Any other comment attributes (`public`, `html_body`, ...) passed through as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Comment {
    /// Creates a plain comment with the given body.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            uploads: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// A ticket custom field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    /// Custom field id from the account's ticket field schema.
    #[serde(
        serialize_with = "serialize_numeric_id",
        deserialize_with = "deserialize_string_or_int"
    )]
    pub id: String,

    /// Field value: a string, number, boolean or list for multi-selects.
    pub value: serde_json::Value,
}

impl CustomField {
    /// Creates a custom field entry.
    pub fn new(id: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Payload for creating a ticket.
///
/// Built fresh for each submission and discarded once handed to the
/// ticketing client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRequest {
    /// Ticket subject.
    pub subject: String,

    /// Requesting user.
    pub requester: Requester,

    /// First comment, including attachment upload tokens.
    pub comment: Comment,

    /// Normalized tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Urgency, omitted to use the account default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Initial state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,

    /// Ticket type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<TicketType>,

    /// Agent the ticket is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,

    /// CC'd emails or user ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collaborators: Vec<String>,

    /// Custom field values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,

    /// Links the ticket back to the originating submission.
    pub external_id: String,
}

impl TicketRequest {
    /// Wraps the ticket in the `{"ticket": ...}` envelope the API expects.
    pub fn to_envelope(&self) -> Result<serde_json::Value, ZendeskError> {
        Ok(serde_json::json!({ "ticket": serde_json::to_value(self)? }))
    }
}

/// A ticket as returned by the API. Only the fields the handler reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Ticket {
    /// Ticket id.
    pub id: u64,

    /// API URL of the ticket.
    #[serde(default)]
    pub url: Option<String>,

    /// Subject.
    #[serde(default)]
    pub subject: Option<String>,

    /// Current status name.
    #[serde(default)]
    pub status: Option<String>,

    /// External id echoed back.
    #[serde(default)]
    pub external_id: Option<String>,
}

/// Response wrapper for ticket creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketResponse {
    /// The created ticket.
    pub ticket: Ticket,
}
