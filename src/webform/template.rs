//! Handler configuration templates.
//!
//! A template maps each ticket attribute to either literal text (possibly
//! containing tokens) or the key of a form element to take the value from.
//! It is created when the handler is configured and read for every
//! submission.
//!
//! # Input Sanitization
//!
//! Call `sanitize()` on templates coming from a configuration form before
//! saving them; it trims whitespace from every attribute (only trailing
//! whitespace from the custom fields YAML) and drops blank attachment field
//! names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ZendeskError;
use crate::models::{Priority, TicketStatus, TicketType};

/// Custom field id used to mark tickets as coming from a web form.
pub const WEBFORM_ORIGIN_FIELD_ID: &str = "360017939614";

/// Value written to the origin custom field.
pub const WEBFORM_ORIGIN_VALUE: &str = "Webform";

/// Element types that can provide a requester email.
const EMAIL_ELEMENT_TYPES: [&str; 2] = ["email", "webform_email_confirm"];

/// Element types that group other elements.
const GROUPING_ELEMENT_TYPES: [&str; 1] = ["webform_section"];

/// What to do when an attachment cannot be loaded or uploaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentPolicy {
    /// Log the failure and create the ticket without that file.
    #[default]
    BestEffort,
    /// Give up on the ticket.
    Abort,
}

/// A custom field force-set on every ticket to record where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginMarker {
    /// Custom field id.
    pub field_id: String,
    /// Value to set.
    pub value: String,
}

impl OriginMarker {
    /// The marker used for web form tickets.
    pub fn webform() -> Self {
        Self {
            field_id: WEBFORM_ORIGIN_FIELD_ID.to_string(),
            value: WEBFORM_ORIGIN_VALUE.to_string(),
        }
    }
}

/// Configuration of one Zendesk handler attached to a form.
///
/// Every text attribute is resolved the same way: if it names an element
/// with a non-empty value in the submission, that value is used, otherwise
/// the (token-expanded) text itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationTemplate {
    /// Requester email, usually the key of an email element.
    pub requester: String,

    /// Requester display name, e.g. the key of a name element.
    pub requester_name: String,

    /// Ticket subject.
    pub subject: String,

    /// Body of the first comment.
    pub comment: String,

    /// Free-form tag text, normalized before sending.
    pub tags: String,

    /// `low`, `normal`, `high` or `urgent`.
    pub priority: String,

    /// `new`, `open`, `pending`, `hold`, `solved` or `closed`.
    pub status: String,

    /// `problem`, `incident`, `question` or `task`.
    #[serde(rename = "type")]
    pub ticket_type: String,

    /// Numeric agent id, or an agent email looked up in Zendesk.
    pub assignee_id: String,

    /// Emails or user ids to CC.
    pub collaborators: String,

    /// YAML mapping of custom field id to value or element key.
    pub custom_fields: String,

    /// File elements to attach; empty means every file element.
    pub attachment_fields: Vec<String>,

    /// Handling of attachment failures.
    pub attachment_policy: AttachmentPolicy,

    /// Custom field recording the ticket's origin; `null` disables it.
    pub origin_marker: Option<OriginMarker>,
}

impl Default for ConfigurationTemplate {
    fn default() -> Self {
        Self {
            requester: String::new(),
            requester_name: String::new(),
            subject: String::new(),
            // lists every submitted value
            comment: "[webform_submission:values]".to_string(),
            tags: "drupal webform".to_string(),
            priority: "normal".to_string(),
            status: "new".to_string(),
            ticket_type: "question".to_string(),
            assignee_id: String::new(),
            collaborators: String::new(),
            custom_fields: String::new(),
            attachment_fields: Vec::new(),
            attachment_policy: AttachmentPolicy::default(),
            origin_marker: Some(OriginMarker::webform()),
        }
    }
}

impl ConfigurationTemplate {
    /// Parses a template from YAML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::Yaml` if the text is not a valid template.
    pub fn from_yaml(text: &str) -> Result<Self, ZendeskError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Sanitizes the template by trimming whitespace from all text attributes.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            requester: self.requester.trim().to_string(),
            requester_name: self.requester_name.trim().to_string(),
            subject: self.subject.trim().to_string(),
            comment: self.comment.trim().to_string(),
            tags: self.tags.trim().to_string(),
            priority: self.priority.trim().to_string(),
            status: self.status.trim().to_string(),
            ticket_type: self.ticket_type.trim().to_string(),
            assignee_id: self.assignee_id.trim().to_string(),
            collaborators: self.collaborators.trim().to_string(),
            // YAML: leading indentation is significant
            custom_fields: self.custom_fields.trim_end().to_string(),
            attachment_fields: self
                .attachment_fields
                .iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            attachment_policy: self.attachment_policy,
            origin_marker: self.origin_marker,
        }
    }

    /// Returns the text attributes as `(name, value)` pairs, in form order.
    pub fn attributes(&self) -> [(&'static str, &str); 11] {
        [
            ("requester", self.requester.as_str()),
            ("requester_name", self.requester_name.as_str()),
            ("subject", self.subject.as_str()),
            ("type", self.ticket_type.as_str()),
            ("priority", self.priority.as_str()),
            ("status", self.status.as_str()),
            ("assignee_id", self.assignee_id.as_str()),
            ("comment", self.comment.as_str()),
            ("tags", self.tags.as_str()),
            ("collaborators", self.collaborators.as_str()),
            ("custom_fields", self.custom_fields.as_str()),
        ]
    }

    /// Applies `f` to every text attribute, e.g. for token replacement.
    #[must_use]
    pub fn map_text<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        Self {
            requester: f(&self.requester),
            requester_name: f(&self.requester_name),
            subject: f(&self.subject),
            comment: f(&self.comment),
            tags: f(&self.tags),
            priority: f(&self.priority),
            status: f(&self.status),
            ticket_type: f(&self.ticket_type),
            assignee_id: f(&self.assignee_id),
            collaborators: f(&self.collaborators),
            custom_fields: f(&self.custom_fields),
            attachment_fields: self.attachment_fields.clone(),
            attachment_policy: self.attachment_policy,
            origin_marker: self.origin_marker.clone(),
        }
    }

    /// Validates the template before it is saved.
    ///
    /// `element_keys` are the keys of the form's elements; attributes naming
    /// one of them are accepted as-is since their value is only known per
    /// submission. Text containing a token (`[...]`) is accepted too.
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::Validation` describing the first problem found.
    pub fn validate(&self, element_keys: &[&str]) -> Result<(), ZendeskError> {
        let is_dynamic = |value: &str| element_keys.contains(&value) || value.contains('[');

        for (name, value) in [
            ("requester", self.requester.as_str()),
            ("subject", self.subject.as_str()),
            ("comment", self.comment.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(ZendeskError::validation(format!("{} is required", name)));
            }
        }

        if !self.priority.is_empty() && !is_dynamic(self.priority.as_str()) {
            self.priority
                .parse::<Priority>()
                .map_err(|e| ZendeskError::validation(e.to_string()))?;
        }
        if !self.status.is_empty() && !is_dynamic(self.status.as_str()) {
            self.status
                .parse::<TicketStatus>()
                .map_err(|e| ZendeskError::validation(e.to_string()))?;
        }
        if !self.ticket_type.is_empty() && !is_dynamic(self.ticket_type.as_str()) {
            self.ticket_type
                .parse::<TicketType>()
                .map_err(|e| ZendeskError::validation(e.to_string()))?;
        }

        let assignee = self.assignee_id.trim();
        if !assignee.is_empty()
            && !is_dynamic(assignee)
            && !assignee.contains('@')
            && !assignee.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ZendeskError::validation(
                "assignee_id must be a numeric user id or an agent email",
            ));
        }

        if !self.custom_fields.trim().is_empty() {
            let parsed: serde_yaml::Value = serde_yaml::from_str(&self.custom_fields)
                .map_err(|e| ZendeskError::validation(format!("custom_fields: {}", e)))?;
            if !parsed.is_mapping() && !parsed.is_null() {
                return Err(ZendeskError::validation(
                    "custom_fields must be a mapping of field id to value",
                ));
            }
        }

        Ok(())
    }

    /// Returns an at-a-glance summary, one `name: value` line per attribute.
    ///
    /// The comment and custom fields are left out since they are long.
    pub fn summary(&self) -> String {
        self.attributes()
            .iter()
            .filter(|(name, _)| *name != "comment" && *name != "custom_fields")
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Lists the email elements of a form that can provide the requester.
///
/// `elements` is the decoded element tree: element key to an object with
/// `#type` and `#title`. Elements nested one level inside a section are
/// included. Returns `(key, title)` pairs in key order.
pub fn requester_field_options(elements: &Value) -> Vec<(String, String)> {
    let mut options = Vec::new();
    let Some(elements) = elements.as_object() else {
        return options;
    };

    for (key, element) in elements {
        if element_type_in(element, &GROUPING_ELEMENT_TYPES) {
            let Some(children) = element.as_object() else {
                continue;
            };
            for (child_key, child) in children {
                if !child_key.starts_with('#') && element_type_in(child, &EMAIL_ELEMENT_TYPES) {
                    options.push((child_key.clone(), element_title(child_key, child)));
                }
            }
        } else if element_type_in(element, &EMAIL_ELEMENT_TYPES) {
            options.push((key.clone(), element_title(key, element)));
        }
    }

    options
}

fn element_type_in(element: &Value, types: &[&str]) -> bool {
    element
        .get("#type")
        .and_then(Value::as_str)
        .is_some_and(|t| types.contains(&t))
}

fn element_title(key: &str, element: &Value) -> String {
    element
        .get("#title")
        .and_then(Value::as_str)
        .unwrap_or(key)
        .to_string()
}
