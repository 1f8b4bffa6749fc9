//! Tag normalization and collaborator parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Anything that cannot appear in a tag.
static TAG_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]+").expect("Invalid regex pattern for tags"));

/// Anything that cannot appear in an email address or user id.
static COLLABORATOR_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[^a-z0-9_\-@.']+").expect("Invalid regex pattern for collaborators")
});

/// Normalizes free-form text into a space-separated tag string.
///
/// `"Drupal, WEBFORM!"` becomes `"drupal webform"`. Empty tokens are
/// dropped, so the result never has leading, trailing or double spaces.
pub fn normalize_tags(text: &str) -> String {
    TAG_SEPARATOR
        .split(&text.to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits normalized tag text into the list sent to Zendesk.
pub fn tag_list(text: &str) -> Vec<String> {
    normalize_tags(text)
        .split(' ')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits text into collaborator emails or ids. No validation is done.
pub fn parse_collaborators(text: &str) -> Vec<String> {
    COLLABORATOR_SEPARATOR
        .split(text)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
