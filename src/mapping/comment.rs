//! Comment shaping.

use serde_json::{Map, Value};

use super::resolve::value_to_text;
use crate::models::{Comment, UploadToken};

/// Builds the ticket's first comment from a resolved value.
///
/// An object that already has a string `body` passes through unchanged,
/// except for an `uploads` entry that is not a list of strings, which is
/// dropped. Anything else becomes the body text. Upload tokens are appended.
pub fn shape_comment(value: &Value, uploads: &[UploadToken]) -> Comment {
    let mut comment = match value {
        Value::Object(map) if map.get("body").is_some_and(Value::is_string) => {
            structured_comment(map)
        }
        _ => Comment::new(value_to_text(value)),
    };
    add_uploads(&mut comment, uploads);
    comment
}

fn structured_comment(map: &Map<String, Value>) -> Comment {
    if let Ok(comment) = serde_json::from_value::<Comment>(Value::Object(map.clone())) {
        return comment;
    }

    let mut extra = map.clone();
    extra.remove("uploads");
    let body = match extra.remove("body") {
        Some(Value::String(body)) => body,
        _ => String::new(),
    };
    tracing::warn!("Ignoring malformed comment uploads");
    Comment {
        body,
        uploads: Vec::new(),
        extra,
    }
}

/// Appends upload tokens to a comment, skipping blank and repeated ones.
pub fn add_uploads(comment: &mut Comment, uploads: &[UploadToken]) {
    for token in uploads {
        let token = token.as_str().trim();
        if !token.is_empty() && !comment.uploads.iter().any(|t| t == token) {
            comment.uploads.push(token.to_string());
        }
    }
}
