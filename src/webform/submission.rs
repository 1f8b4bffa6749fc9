//! Form submissions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ZendeskError;
use crate::models::{deserialize_string_or_int, TicketId};

/// Element the created ticket id is written to.
pub const NOTES_ELEMENT: &str = "notes";

/// Identifier of a stored file, as referenced by a file element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(pub String);

impl<'de> Deserialize<'de> for FileId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserialize_string_or_int(deserializer).map(FileId)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One submission of a form.
///
/// Read-only while it is mapped to a ticket. The only write is
/// [`SubmissionRecord::annotate_ticket`] after a ticket was created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Unique submission id, used as the ticket's external id.
    #[serde(deserialize_with = "deserialize_string_or_int")]
    pub id: String,

    /// Element key to submitted value.
    #[serde(default)]
    pub data: BTreeMap<String, Value>,

    /// File element key to stored file ids.
    #[serde(default)]
    pub files: BTreeMap<String, Vec<FileId>>,
}

impl SubmissionRecord {
    /// Creates an empty submission with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Adds an element value.
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(field.into(), value.into());
        self
    }

    /// Adds stored files for a file element.
    pub fn with_files<I, F>(mut self, field: impl Into<String>, files: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.files.insert(
            field.into(),
            files.into_iter().map(|f| FileId(f.into())).collect(),
        );
        self
    }

    /// Parses a submission from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::Serialization` on malformed input, or
    /// `ZendeskError::Validation` if the id is blank.
    pub fn from_json(text: &str) -> Result<Self, ZendeskError> {
        let submission: Self = serde_json::from_str(text)?;
        if submission.id.trim().is_empty() {
            return Err(ZendeskError::validation("submission id must not be empty"));
        }
        Ok(submission)
    }

    /// Returns the raw value of an element.
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Returns the value of an element only if it is present and non-empty.
    pub fn non_empty_value(&self, field: &str) -> Option<&Value> {
        self.data.get(field).filter(|value| !is_empty_value(value))
    }

    /// Returns the file elements that reference at least one stored file.
    pub fn file_fields(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(field, _)| field.as_str())
    }

    /// Records the created ticket on the submission's notes element.
    pub fn annotate_ticket(&mut self, ticket_id: TicketId) {
        self.data.insert(
            NOTES_ELEMENT.to_string(),
            Value::String(format!("Ticket: {}\n", ticket_id)),
        );
    }
}

/// Returns true for values that do not count as an answer.
///
/// `null`, blank strings, empty lists and empty objects are empty.
/// Numbers and booleans (including `0` and `false`) are answers.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_accepts_numeric_ids() {
        let submission = SubmissionRecord::from_json(
            r#"{"id": 42, "data": {"email": "a@x.com"}, "files": {"upload": [7, "8"]}}"#,
        )
        .unwrap();
        assert_eq!(submission.id, "42");
        assert_eq!(
            submission.files["upload"],
            vec![FileId("7".to_string()), FileId("8".to_string())]
        );
    }

    #[test]
    fn test_from_json_rejects_blank_id() {
        let err = SubmissionRecord::from_json(r#"{"id": " "}"#).unwrap_err();
        assert!(matches!(err, ZendeskError::Validation(_)));
    }

    #[test]
    fn test_non_empty_value() {
        let submission = SubmissionRecord::new("1")
            .with_value("blank", "  ")
            .with_value("list", json!([]))
            .with_value("zero", 0)
            .with_value("email", "a@x.com");

        assert!(submission.non_empty_value("blank").is_none());
        assert!(submission.non_empty_value("list").is_none());
        assert!(submission.non_empty_value("missing").is_none());
        assert_eq!(submission.non_empty_value("zero"), Some(&json!(0)));
        assert_eq!(submission.non_empty_value("email"), Some(&json!("a@x.com")));
    }

    #[test]
    fn test_file_fields_skips_empty_lists() {
        let submission = SubmissionRecord::new("1")
            .with_files("upload", ["3"])
            .with_files("other", Vec::<String>::new());
        assert_eq!(submission.file_fields().collect::<Vec<_>>(), vec!["upload"]);
    }

    #[test]
    fn test_annotate_ticket_sets_notes() {
        let mut submission = SubmissionRecord::new("1").with_value("notes", "old");
        submission.annotate_ticket(TicketId(35436));
        assert_eq!(submission.value("notes"), Some(&json!("Ticket: 35436\n")));
    }
}
