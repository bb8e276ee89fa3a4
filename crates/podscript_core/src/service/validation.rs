//! Structural validation of script documents.
//!
//! # Responsibility
//! - Gate every import before any store is touched.
//!
//! # Invariants
//! - Validation never panics and never mutates.
//! - Referential integrity is NOT checked: dangling `roleId` values are
//!   structurally valid.

use crate::model::role::{ROLE_TYPE_SOUND, ROLE_TYPE_SPEAKER};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// First structural problem found in a script document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Document root is not a JSON object.
    NotAnObject,
    /// `roles` or `replicas` is absent or not an array.
    MissingArray(&'static str),
    /// Entry at `index` of `collection` is not an object.
    EntryNotObject {
        collection: &'static str,
        index: usize,
    },
    /// Required string field is absent, not a string, or empty.
    MissingField {
        collection: &'static str,
        index: usize,
        field: &'static str,
    },
    /// Role `type` is not `speaker` or `sound`.
    InvalidRoleType { index: usize, value: String },
    /// Replica `text` is absent or not a string.
    TextNotString { index: usize },
    /// Replica `roleId` is neither `null` nor a string.
    InvalidRoleId { index: usize },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "script document must be a JSON object"),
            Self::MissingArray(field) => write!(f, "`{field}` must be an array"),
            Self::EntryNotObject { collection, index } => {
                write!(f, "{collection}[{index}] must be an object")
            }
            Self::MissingField {
                collection,
                index,
                field,
            } => write!(f, "{collection}[{index}].{field} must be a non-empty string"),
            Self::InvalidRoleType { index, value } => write!(
                f,
                "roles[{index}].type must be `{ROLE_TYPE_SPEAKER}` or `{ROLE_TYPE_SOUND}`, got `{value}`"
            ),
            Self::TextNotString { index } => write!(f, "replicas[{index}].text must be a string"),
            Self::InvalidRoleId { index } => {
                write!(f, "replicas[{index}].roleId must be null or a string")
            }
        }
    }
}

impl Error for ValidationError {}

/// Checks the structure of a script document.
pub fn validate_script(data: &Value) -> Result<(), ValidationError> {
    let root = data.as_object().ok_or(ValidationError::NotAnObject)?;
    let roles = require_array(root, "roles")?;
    let replicas = require_array(root, "replicas")?;

    for (index, role) in roles.iter().enumerate() {
        validate_role(index, role)?;
    }
    for (index, replica) in replicas.iter().enumerate() {
        validate_replica(index, replica)?;
    }
    Ok(())
}

/// Boolean form of `validate_script`.
pub fn is_valid_script(data: &Value) -> bool {
    validate_script(data).is_ok()
}

fn require_array<'a>(
    root: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Vec<Value>, ValidationError> {
    root.get(field)
        .and_then(Value::as_array)
        .ok_or(ValidationError::MissingArray(field))
}

fn validate_role(index: usize, value: &Value) -> Result<(), ValidationError> {
    let role = value.as_object().ok_or(ValidationError::EntryNotObject {
        collection: "roles",
        index,
    })?;
    require_string(role, "roles", index, "id")?;
    require_string(role, "roles", index, "name")?;
    let kind = require_string(role, "roles", index, "type")?;
    if kind != ROLE_TYPE_SPEAKER && kind != ROLE_TYPE_SOUND {
        return Err(ValidationError::InvalidRoleType {
            index,
            value: kind.to_string(),
        });
    }
    Ok(())
}

fn validate_replica(index: usize, value: &Value) -> Result<(), ValidationError> {
    let replica = value.as_object().ok_or(ValidationError::EntryNotObject {
        collection: "replicas",
        index,
    })?;
    require_string(replica, "replicas", index, "id")?;
    if !replica.get("text").is_some_and(Value::is_string) {
        return Err(ValidationError::TextNotString { index });
    }
    match replica.get("roleId") {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ValidationError::InvalidRoleId { index }),
    }
}

fn require_string<'a>(
    entry: &'a Map<String, Value>,
    collection: &'static str,
    index: usize,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(ValidationError::MissingField {
            collection,
            index,
            field,
        })
}

#[cfg(test)]
mod tests {
    use super::{validate_script, ValidationError};
    use serde_json::json;

    #[test]
    fn missing_role_id_points_at_the_entry() {
        let err = validate_script(&json!({
            "roles": [{"id": "a", "name": "A", "type": "speaker"}, {"name": "B", "type": "sound"}],
            "replicas": []
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                collection: "roles",
                index: 1,
                field: "id"
            }
        );
    }

    #[test]
    fn absent_role_id_on_replica_is_accepted() {
        assert!(validate_script(&json!({
            "roles": [],
            "replicas": [{"id": "p1", "text": ""}]
        }))
        .is_ok());
    }
}
