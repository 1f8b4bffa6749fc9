//! Custom field transformation.

use serde_json::Value;
use serde_yaml::Value as YamlValue;

use super::resolve::{resolve_value, value_to_text};
use crate::error::ZendeskError;
use crate::models::CustomField;
use crate::webform::{OriginMarker, SubmissionRecord};

/// Turns the custom fields YAML into the ticket's custom field list.
///
/// The YAML must be a mapping of field id to value. String values naming a
/// submitted element are replaced by its value, with objects such as
/// composite names rendered to text. Entries keep document order;
/// the origin marker, if any, overrides an entry with its id or is appended.
///
/// # Errors
///
/// Returns `ZendeskError::Mapping` if the YAML does not parse or is not a
/// mapping with scalar keys.
pub fn transform_custom_fields(
    yaml: &str,
    submission: &SubmissionRecord,
    origin_marker: Option<&OriginMarker>,
) -> Result<Vec<CustomField>, ZendeskError> {
    let mut fields = Vec::new();

    if !yaml.trim().is_empty() {
        let parsed: YamlValue = serde_yaml::from_str(yaml)
            .map_err(|e| ZendeskError::mapping(format!("custom_fields is not valid YAML: {}", e)))?;

        match parsed {
            YamlValue::Null => {}
            YamlValue::Mapping(entries) => {
                for (key, value) in entries {
                    let id = field_id(&key)?;
                    let value = match value {
                        YamlValue::String(text) => resolve_value(&text, submission),
                        other => serde_json::to_value(&other).map_err(|e| {
                            ZendeskError::mapping(format!("custom field {}: {}", id, e))
                        })?,
                    };
                    fields.push(CustomField {
                        id,
                        value: scalar_or_list(value),
                    });
                }
            }
            _ => {
                return Err(ZendeskError::mapping(
                    "custom_fields must be a mapping of field id to value",
                ))
            }
        }
    }

    if let Some(marker) = origin_marker {
        let value = Value::String(marker.value.clone());
        match fields.iter_mut().find(|field| field.id == marker.field_id) {
            Some(field) => field.value = value,
            None => fields.push(CustomField::new(marker.field_id.clone(), value)),
        }
    }

    Ok(fields)
}

/// Custom fields take scalars or lists; objects such as composite names
/// are rendered to text.
fn scalar_or_list(value: Value) -> Value {
    match value {
        Value::Object(_) => Value::String(value_to_text(&value)),
        other => other,
    }
}

fn field_id(key: &YamlValue) -> Result<String, ZendeskError> {
    match key {
        YamlValue::String(id) if !id.trim().is_empty() => Ok(id.trim().to_string()),
        YamlValue::Number(id) => Ok(id.to_string()),
        other => Err(ZendeskError::mapping(format!(
            "custom field ids must be numbers or strings, got {:?}",
            other
        ))),
    }
}
