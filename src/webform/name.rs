//! Composite name elements.
//!
//! Webform name elements submit an object of parts (`title`, `first`,
//! `middle`, `last`, `suffix`, `degree`). Ticket attributes need one string.

use std::fmt;

use serde_json::Value;

/// The parts recognised in a composite name, in display order.
const NAME_PARTS: [&str; 6] = ["title", "first", "middle", "last", "suffix", "degree"];

/// A person's name as submitted by a composite name element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    /// Honorific, e.g. `Dr.`.
    pub title: String,
    /// Given name.
    pub first: String,
    /// Middle name or initial.
    pub middle: String,
    /// Family name.
    pub last: String,
    /// Suffix, e.g. `Jr.`.
    pub suffix: String,
    /// Academic degree, e.g. `PhD`.
    pub degree: String,
}

impl Name {
    /// Reads a name from a submitted value.
    ///
    /// Returns `None` unless the value is an object with at least one known
    /// name part. Unknown keys are ignored, non-string parts count as blank.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        if !NAME_PARTS.iter().any(|part| map.contains_key(*part)) {
            return None;
        }

        let part = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Some(Self {
            title: part("title"),
            first: part("first"),
            middle: part("middle"),
            last: part("last"),
            suffix: part("suffix"),
            degree: part("degree"),
        })
    }

    /// Returns the non-blank parts joined by single spaces, in fixed order.
    pub fn full(&self) -> String {
        [
            &self.title,
            &self.first,
            &self.middle,
            &self.last,
            &self.suffix,
            &self.degree,
        ]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}
