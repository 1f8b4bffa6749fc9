//! Field resolution: configured text or the value of the element it names.

use serde_json::Value;

use crate::webform::{ConfigurationTemplate, Name, SubmissionRecord};

/// A template with every text attribute resolved against one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    /// Requester email source.
    pub requester: Value,
    /// Requester name source.
    pub requester_name: Value,
    /// Subject.
    pub subject: Value,
    /// Comment, text or a `{body, ...}` object.
    pub comment: Value,
    /// Tag text or list.
    pub tags: Value,
    /// Priority name.
    pub priority: Value,
    /// Status name.
    pub status: Value,
    /// Type name.
    pub ticket_type: Value,
    /// Assignee id or email.
    pub assignee_id: Value,
    /// Collaborator text or list.
    pub collaborators: Value,
    /// Custom fields YAML.
    pub custom_fields: Value,
}

/// Resolves every text attribute of an already token-expanded template.
pub fn resolve(
    template: &ConfigurationTemplate,
    submission: &SubmissionRecord,
) -> ResolvedTemplate {
    ResolvedTemplate {
        requester: resolve_value(&template.requester, submission),
        requester_name: resolve_value(&template.requester_name, submission),
        subject: resolve_value(&template.subject, submission),
        comment: resolve_value(&template.comment, submission),
        tags: resolve_value(&template.tags, submission),
        priority: resolve_value(&template.priority, submission),
        status: resolve_value(&template.status, submission),
        ticket_type: resolve_value(&template.ticket_type, submission),
        assignee_id: resolve_value(&template.assignee_id, submission),
        collaborators: resolve_value(&template.collaborators, submission),
        custom_fields: resolve_value(&template.custom_fields, submission),
    }
}

/// Returns the submitted value of the element named by `configured`, or the
/// configured text itself when no such element has a non-empty value.
pub fn resolve_value(configured: &str, submission: &SubmissionRecord) -> Value {
    match submission.non_empty_value(configured) {
        Some(value) => value.clone(),
        None => Value::String(configured.to_string()),
    }
}

/// Renders a submitted value as text.
///
/// Lists are joined with `", "`, composite names are flattened, other
/// objects are rendered as JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => match Name::from_value(value) {
            Some(name) => name.full(),
            None => value.to_string(),
        },
    }
}
