//! Exchange snapshot and wire records.
//!
//! # Responsibility
//! - Define the JSON shape used for files, auto-save and viewer handoff.
//! - Convert between live entities and their wire records.
//!
//! # Invariants
//! - Field names match the external camelCase schema (`roleId`,
//!   `wordsPerMinute`, `exportDate`, ...).
//! - `statistics` in a snapshot is advisory and never read back as truth.
//! - Decoding a record never fails on dates; bad dates become "now".

use crate::model::entity::{format_timestamp, parse_timestamp, Entity, Timestamps};
use crate::model::replica::Replica;
use crate::model::role::{
    clamp_words_per_minute, Role, RoleKind, ROLE_TYPE_SOUND, ROLE_TYPE_SPEAKER,
};
use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Format tag written into every exported snapshot.
pub const SCRIPT_FORMAT_VERSION: &str = "1.0";

/// Aggregate figures derived from the current roles and replicas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Words spoken by speaker-assigned replicas.
    pub total_words: usize,
    /// Estimated running time in minutes.
    pub total_duration: f64,
    /// `total_duration` rendered as `M:SS`.
    pub total_duration_formatted: String,
    pub role_count: usize,
    pub replica_count: usize,
}

/// Wire form of a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: String,
    pub name: String,
    /// Serialized as `type` to match the external schema.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "deserialize_wire_timestamp")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "deserialize_wire_timestamp")]
    pub updated_at: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_rate",
        skip_serializing_if = "Option::is_none"
    )]
    pub words_per_minute: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Wire form of a replica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaRecord {
    pub id: String,
    pub text: String,
    /// Always written, `null` when unassigned.
    #[serde(default)]
    pub role_id: Option<String>,
    /// Written for consumers; ignored on read and recomputed from `text`.
    #[serde(default, skip_deserializing)]
    pub word_count: usize,
    #[serde(default, deserialize_with = "deserialize_wire_timestamp")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "deserialize_wire_timestamp")]
    pub updated_at: Option<String>,
}

/// Point-in-time snapshot of a whole script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptData {
    pub roles: Vec<RoleRecord>,
    pub replicas: Vec<ReplicaRecord>,
    pub version: String,
    pub export_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<Statistics>,
}

impl From<&Role> for RoleRecord {
    fn from(role: &Role) -> Self {
        let (words_per_minute, duration, color) = match role.kind() {
            RoleKind::Speaker {
                words_per_minute,
                color,
            } => (Some(i64::from(*words_per_minute)), None, color.clone()),
            RoleKind::SoundEffect { duration_secs } => (None, Some(*duration_secs), None),
            RoleKind::Unknown { .. } => (None, None, None),
        };

        Self {
            id: role.id().to_string(),
            name: role.name().to_string(),
            kind: role.type_name().to_string(),
            created_at: Some(format_timestamp(&role.created_at())),
            updated_at: Some(format_timestamp(&role.updated_at())),
            words_per_minute,
            duration,
            color,
        }
    }
}

impl RoleRecord {
    /// Builds the live role, dispatching on the `type` field.
    ///
    /// Missing rate/duration parameters fall back to the given defaults and
    /// are clamped like any other write.
    pub fn into_role(self, default_words_per_minute: u32, default_duration_secs: f64) -> Role {
        let timestamps =
            Timestamps::from_wire(self.created_at.as_deref(), self.updated_at.as_deref());
        let kind = match self.kind.as_str() {
            ROLE_TYPE_SPEAKER => RoleKind::Speaker {
                words_per_minute: clamp_words_per_minute(
                    self.words_per_minute
                        .unwrap_or(i64::from(default_words_per_minute)),
                ),
                color: self.color,
            },
            ROLE_TYPE_SOUND => RoleKind::SoundEffect {
                duration_secs: self.duration.unwrap_or(default_duration_secs),
            },
            _ => RoleKind::Unknown {
                type_name: self.kind.clone(),
            },
        };
        Role::restore(self.id, self.name, kind, timestamps)
    }
}

impl From<&Replica> for ReplicaRecord {
    fn from(replica: &Replica) -> Self {
        Self {
            id: replica.id().to_string(),
            text: replica.text().to_string(),
            role_id: replica.role_id().map(str::to_string),
            word_count: replica.word_count(),
            created_at: Some(format_timestamp(&replica.created_at())),
            updated_at: Some(format_timestamp(&replica.updated_at())),
        }
    }
}

impl ReplicaRecord {
    /// Builds the live replica; the word count is recomputed from `text`.
    pub fn into_replica(self) -> Replica {
        let timestamps =
            Timestamps::from_wire(self.created_at.as_deref(), self.updated_at.as_deref());
        Replica::restore(self.id, self.text, self.role_id, timestamps)
    }
}

/// Accepts any JSON value for a record date.
///
/// ISO-8601 strings and epoch-millisecond numbers are normalized to the
/// export format; anything else reads as absent so the entity falls back to
/// "now" instead of failing the import.
fn deserialize_wire_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let instant = match Value::deserialize(deserializer)? {
        Value::String(text) => parse_timestamp(&text),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|millis| millis.is_finite())
                    .map(|millis| millis.trunc() as i64)
            })
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    };
    Ok(instant.map(|instant| format_timestamp(&instant)))
}

/// Accepts integer or fractional rates; fractional values are rounded.
fn deserialize_rate<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|rate| rate.is_finite()).map(|rate| rate.round() as i64))
}
