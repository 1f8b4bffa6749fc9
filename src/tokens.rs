//! Token replacement for submission placeholders.
//!
//! Supported tokens:
//!
//! - `[webform_submission:sid]` - the submission id
//! - `[webform_submission:values]` - every submitted value, one
//!   `key: value` line each
//! - `[webform_submission:values:KEY]` - the value of element `KEY`, empty
//!   if it was not submitted
//!
//! Anything else in brackets is left untouched.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::collaborators::TokenReplacer;
use crate::mapping::value_to_text;
use crate::webform::{is_empty_value, ConfigurationTemplate, SubmissionRecord, NOTES_ELEMENT};

static SUBMISSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[webform_submission:([a-z_]+)(?::([^\]\s]+))?\]")
        .expect("Invalid regex pattern for submission tokens")
});

/// Replaces `[webform_submission:*]` tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebformTokens;

impl WebformTokens {
    /// Replaces the tokens in one piece of text.
    pub fn replace_text(&self, text: &str, submission: &SubmissionRecord) -> String {
        if !text.contains("[webform_submission:") {
            return text.to_string();
        }

        SUBMISSION_TOKEN
            .replace_all(text, |caps: &Captures| {
                let kind = &caps[1];
                let key = caps.get(2).map(|m| m.as_str());
                match (kind, key) {
                    ("sid", None) => submission.id.clone(),
                    ("values", None) => all_values(submission),
                    ("values", Some(key)) => submission
                        .value(key)
                        .map(value_to_text)
                        .unwrap_or_default(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl TokenReplacer for WebformTokens {
    fn replace(
        &self,
        template: &ConfigurationTemplate,
        submission: &SubmissionRecord,
    ) -> ConfigurationTemplate {
        template.map_text(|text| self.replace_text(text, submission))
    }
}

/// Lists non-empty submitted values, skipping the handler's own notes element.
fn all_values(submission: &SubmissionRecord) -> String {
    submission
        .data
        .iter()
        .filter(|(key, value)| key.as_str() != NOTES_ELEMENT && !is_empty_value(value))
        .map(|(key, value)| format!("{}: {}", key, value_to_text(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission() -> SubmissionRecord {
        SubmissionRecord::new("42")
            .with_value("name", json!({"first": "Jane", "last": "Doe"}))
            .with_value("email", "jane@example.com")
            .with_value("empty", "")
            .with_value("notes", "internal")
    }

    #[test]
    fn test_sid_token() {
        let text =
            WebformTokens.replace_text("Submission #[webform_submission:sid]", &submission());
        assert_eq!(text, "Submission #42");
    }

    #[test]
    fn test_values_token_lists_answers() {
        let text = WebformTokens.replace_text("[webform_submission:values]", &submission());
        assert_eq!(text, "email: jane@example.com\nname: Jane Doe");
    }

    #[test]
    fn test_single_value_token() {
        let text = WebformTokens.replace_text(
            "From [webform_submission:values:name] <[webform_submission:values:missing]>",
            &submission(),
        );
        assert_eq!(text, "From Jane Doe <>");
    }

    #[test]
    fn test_unknown_tokens_untouched() {
        let text = "[site:name] [webform_submission:created]";
        assert_eq!(WebformTokens.replace_text(text, &submission()), text);
    }

    #[test]
    fn test_replace_template() {
        let template = ConfigurationTemplate {
            subject: "Web form [webform_submission:sid]".to_string(),
            ..ConfigurationTemplate::default()
        };
        let replaced = WebformTokens.replace(&template, &submission());
        assert_eq!(replaced.subject, "Web form 42");
        assert!(replaced.comment.contains("email: jane@example.com"));
        assert_eq!(replaced.tags, "drupal webform");
    }
}
