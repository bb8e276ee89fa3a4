//! Conversion between exchange documents and live entities.
//!
//! # Responsibility
//! - Parse JSON text, validate its structure and decode typed entities.
//! - Build export snapshots from the live stores.
//! - Sanitize export file names.
//!
//! # Invariants
//! - Decoding is all-or-nothing: either every entry decodes or nothing is
//!   returned, so callers can mutate only after full success.
//! - Decoded documents never contain duplicate role ids or duplicate
//!   replica ids.

use crate::config::EditorConfig;
use crate::model::entity::format_timestamp;
use crate::model::replica::Replica;
use crate::model::role::Role;
use crate::model::script::{ReplicaRecord, RoleRecord, ScriptData, SCRIPT_FORMAT_VERSION};
use crate::repo::replica_store::ReplicaStore;
use crate::repo::role_store::RoleStore;
use crate::service::statistics::compute_statistics;
use crate::service::validation::{validate_script, ValidationError};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static FORBIDDEN_FILENAME_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid filename regex"));

const EXPORT_EXTENSION: &str = ".json";

/// Import failure, raised before any live state is touched.
#[derive(Debug)]
pub enum ImportError {
    /// Text is not valid JSON.
    Parse(serde_json::Error),
    /// Document fails structural validation.
    Validation(ValidationError),
    /// A structurally valid entry carries a field of the wrong type.
    Decode {
        collection: &'static str,
        index: usize,
        source: serde_json::Error,
    },
    /// Two entries of one collection share an id.
    DuplicateId {
        collection: &'static str,
        id: String,
    },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid script JSON: {err}"),
            Self::Validation(err) => write!(f, "invalid script structure: {err}"),
            Self::Decode {
                collection,
                index,
                source,
            } => write!(f, "cannot decode {collection}[{index}]: {source}"),
            Self::DuplicateId { collection, id } => {
                write!(f, "duplicate id `{id}` in {collection}")
            }
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::DuplicateId { .. } => None,
        }
    }
}

impl From<ValidationError> for ImportError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Fully decoded script content, in document order.
#[derive(Debug, Clone)]
pub struct DecodedScript {
    pub roles: Vec<Role>,
    pub replicas: Vec<Replica>,
}

/// Parses JSON text into a document value.
pub fn parse_script_text(text: &str) -> Result<Value, ImportError> {
    serde_json::from_str(text).map_err(ImportError::Parse)
}

/// Validates and decodes a script document.
pub fn decode_script(data: &Value, config: &EditorConfig) -> Result<DecodedScript, ImportError> {
    validate_script(data)?;

    let role_records: Vec<RoleRecord> = decode_entries(data, "roles")?;
    let replica_records: Vec<ReplicaRecord> = decode_entries(data, "replicas")?;

    ensure_unique_ids("roles", role_records.iter().map(|record| record.id.as_str()))?;
    ensure_unique_ids(
        "replicas",
        replica_records.iter().map(|record| record.id.as_str()),
    )?;

    let roles = role_records
        .into_iter()
        .map(|record| {
            record.into_role(
                config.default_words_per_minute,
                config.default_sound_duration_secs,
            )
        })
        .collect();
    let replicas = replica_records
        .into_iter()
        .map(ReplicaRecord::into_replica)
        .collect();

    Ok(DecodedScript { roles, replicas })
}

/// Builds a snapshot of the given stores stamped with `now`.
pub fn build_snapshot(roles: &RoleStore, replicas: &ReplicaStore, now: DateTime<Utc>) -> ScriptData {
    ScriptData {
        roles: roles.to_records(),
        replicas: replicas.to_records(),
        version: SCRIPT_FORMAT_VERSION.to_string(),
        export_date: format_timestamp(&now),
        statistics: Some(compute_statistics(roles, replicas)),
    }
}

/// Produces a safe `.json` file name from user input.
///
/// Strips `<>:"/\|?*`, trims whitespace, falls back to `default_stem` when
/// nothing is left, and appends `.json` unless already present.
pub fn sanitize_export_filename(name: &str, default_stem: &str) -> String {
    let stripped = FORBIDDEN_FILENAME_CHARS_RE.replace_all(name, "");
    let trimmed = stripped.trim();
    let base = if trimmed.is_empty() {
        default_stem
    } else {
        trimmed
    };

    if base.to_ascii_lowercase().ends_with(EXPORT_EXTENSION) {
        base.to_string()
    } else {
        format!("{base}{EXPORT_EXTENSION}")
    }
}

fn decode_entries<T: DeserializeOwned>(
    data: &Value,
    collection: &'static str,
) -> Result<Vec<T>, ImportError> {
    let entries = data
        .get(collection)
        .and_then(Value::as_array)
        .ok_or(ImportError::Validation(ValidationError::MissingArray(
            collection,
        )))?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            T::deserialize(entry).map_err(|source| ImportError::Decode {
                collection,
                index,
                source,
            })
        })
        .collect()
}

fn ensure_unique_ids<'a>(
    collection: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ImportError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ImportError::DuplicateId {
                collection,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
