//! Read-only script viewer fed by the handoff snapshot.
//!
//! # Responsibility
//! - Load the handoff snapshot and present ordered, role-resolved lines.
//! - Reload when the stored snapshot changes (cross-tab sync).
//!
//! # Invariants
//! - The viewer never writes to storage.
//! - A failed reload keeps the previously loaded content.

use crate::config::EditorConfig;
use crate::model::entity::Entity;
use crate::model::script::Statistics;
use crate::repo::kv_repo::{KeyValueStore, KvError};
use crate::repo::replica_store::ReplicaStore;
use crate::repo::role_store::RoleStore;
use crate::service::serialization::{decode_script, parse_script_text, ImportError};
use crate::service::statistics::{compute_statistics, replica_duration_minutes};
use log::{info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Viewer load failure.
#[derive(Debug)]
pub enum ViewerError {
    Store(KvError),
    Import(ImportError),
}

impl Display for ViewerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ViewerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Import(err) => Some(err),
        }
    }
}

impl From<KvError> for ViewerError {
    fn from(value: KvError) -> Self {
        Self::Store(value)
    }
}

impl From<ImportError> for ViewerError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

/// One rendered script line.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerLine {
    pub replica_id: String,
    pub text: String,
    /// `None` for unassigned or dangling replicas.
    pub role_name: Option<String>,
    pub role_type: Option<String>,
    pub color: Option<String>,
    pub word_count: usize,
    pub estimated_seconds: f64,
}

/// Read-only view over a handoff snapshot.
#[derive(Debug, Clone, Default)]
pub struct ScriptViewer {
    roles: RoleStore,
    replicas: ReplicaStore,
    source_text: Option<String>,
    export_date: Option<String>,
}

impl ScriptViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a viewer from snapshot text.
    pub fn from_json(text: &str, config: &EditorConfig) -> Result<Self, ImportError> {
        let mut viewer = Self::new();
        viewer.replace_content(text, config)?;
        Ok(viewer)
    }

    /// Loads the snapshot stored under `key`, if present.
    pub fn load<S: KeyValueStore>(
        store: &S,
        key: &str,
        config: &EditorConfig,
    ) -> Result<Option<Self>, ViewerError> {
        match store.get(key)? {
            Some(text) => Ok(Some(Self::from_json(&text, config)?)),
            None => Ok(None),
        }
    }

    /// Re-reads `key` and reloads if the stored text changed.
    ///
    /// Returns whether the visible content changed. A removed key empties
    /// the viewer.
    pub fn refresh<S: KeyValueStore>(
        &mut self,
        store: &S,
        key: &str,
        config: &EditorConfig,
    ) -> Result<bool, ViewerError> {
        let current = store.get(key)?;
        if current == self.source_text {
            return Ok(false);
        }

        match current {
            Some(text) => {
                if let Err(err) = self.replace_content(&text, config) {
                    warn!("event=viewer_refresh module=viewer status=error error={err}");
                    return Err(err.into());
                }
            }
            None => *self = Self::new(),
        }
        info!(
            "event=viewer_refresh module=viewer status=ok replicas={}",
            self.replicas.len()
        );
        Ok(true)
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty() && self.roles.is_empty()
    }

    pub fn export_date(&self) -> Option<&str> {
        self.export_date.as_deref()
    }

    pub fn statistics(&self) -> Statistics {
        compute_statistics(&self.roles, &self.replicas)
    }

    /// Lines in script order with their resolved roles.
    pub fn lines(&self) -> Vec<ViewerLine> {
        self.replicas
            .iter()
            .map(|replica| {
                let role = replica.role_id().and_then(|id| self.roles.find_by_id(id));
                ViewerLine {
                    replica_id: replica.id().to_string(),
                    text: replica.text().to_string(),
                    role_name: role.map(|role| role.name().to_string()),
                    role_type: role.map(|role| role.type_name().to_string()),
                    color: role.and_then(|role| role.color()).map(str::to_string),
                    word_count: replica.word_count(),
                    estimated_seconds: replica_duration_minutes(replica, role) * 60.0,
                }
            })
            .collect()
    }

    fn replace_content(&mut self, text: &str, config: &EditorConfig) -> Result<(), ImportError> {
        let data = parse_script_text(text)?;
        let decoded = decode_script(&data, config)?;

        let mut roles = RoleStore::new();
        for role in decoded.roles {
            roles.add(role);
        }
        let mut replicas = ReplicaStore::new();
        for replica in decoded.replicas {
            replicas.add(replica);
        }

        self.roles = roles;
        self.replicas = replicas;
        self.export_date = data
            .get("exportDate")
            .and_then(Value::as_str)
            .map(str::to_string);
        self.source_text = Some(text.to_string());
        Ok(())
    }
}
