//! Snapshot persistence: auto-save and viewer handoff.
//!
//! # Responsibility
//! - Write/read editor snapshots under the auto-save key.
//! - Publish snapshots for the read-only viewer under the handoff key.
//! - Drive interval-based auto-save.
//!
//! # Invariants
//! - A corrupt or invalid auto-save snapshot never fails startup; it is
//!   logged and reported as "nothing restored".
//! - Storage errors are always propagated.

use crate::config::EditorConfig;
use crate::repo::kv_repo::{KeyValueStore, KvError};
use crate::service::data_manager::DataManager;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Persistence failure.
#[derive(Debug)]
pub enum PersistenceError {
    Store(KvError),
    Encode(serde_json::Error),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<KvError> for PersistenceError {
    fn from(value: KvError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Snapshot persistence over a key/value store.
pub struct ScriptPersistence<S: KeyValueStore> {
    store: S,
    autosave_key: String,
    viewer_key: String,
}

impl<S: KeyValueStore> ScriptPersistence<S> {
    pub fn new(store: S, config: &EditorConfig) -> Self {
        Self {
            store,
            autosave_key: config.autosave_key.clone(),
            viewer_key: config.viewer_key.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes the current snapshot under the auto-save key.
    pub fn save_autosave(&self, manager: &DataManager) -> Result<(), PersistenceError> {
        let text = serde_json::to_string(&manager.export_data())?;
        self.store.set(&self.autosave_key, &text)?;
        info!(
            "event=autosave module=persistence status=ok roles={} replicas={}",
            manager.roles().len(),
            manager.replicas().len()
        );
        Ok(())
    }

    /// Imports the auto-save snapshot, if any.
    ///
    /// Returns `Ok(false)` when the key is absent or the stored snapshot
    /// cannot be imported; the manager is untouched in that case.
    pub fn restore_autosave(&self, manager: &mut DataManager) -> Result<bool, PersistenceError> {
        let Some(text) = self.store.get(&self.autosave_key)? else {
            return Ok(false);
        };
        match manager.import_json(&text) {
            Ok(summary) => {
                info!(
                    "event=autosave_restore module=persistence status=ok roles={} replicas={}",
                    summary.roles, summary.replicas
                );
                Ok(true)
            }
            Err(err) => {
                warn!(
                    "event=autosave_restore module=persistence status=error error_code=invalid_snapshot error={err}"
                );
                Ok(false)
            }
        }
    }

    /// Deletes the auto-save snapshot. Returns whether one existed.
    pub fn clear_autosave(&self) -> Result<bool, PersistenceError> {
        Ok(self.store.remove(&self.autosave_key)?)
    }

    /// Publishes the current snapshot for the read-only viewer.
    pub fn write_viewer_handoff(&self, manager: &DataManager) -> Result<(), PersistenceError> {
        let text = serde_json::to_string(&manager.export_data())?;
        self.store.set(&self.viewer_key, &text)?;
        info!("event=viewer_handoff module=persistence status=ok");
        Ok(())
    }

    pub fn viewer_key(&self) -> &str {
        &self.viewer_key
    }
}

/// Interval-driven auto-save.
#[derive(Debug, Clone)]
pub struct AutoSaver {
    interval: Duration,
    last_saved_at: Option<DateTime<Utc>>,
}

impl AutoSaver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_saved_at: None,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.autosave_interval)
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Whether a save is due at `now`; the first check is always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_saved_at {
            None => true,
            Some(last) => (now - last).to_std().is_ok_and(|elapsed| elapsed >= self.interval),
        }
    }

    /// Saves when due. Returns whether a save happened.
    pub fn tick<S: KeyValueStore>(
        &mut self,
        now: DateTime<Utc>,
        persistence: &ScriptPersistence<S>,
        manager: &DataManager,
    ) -> Result<bool, PersistenceError> {
        if !self.is_due(now) {
            return Ok(false);
        }
        persistence.save_autosave(manager)?;
        self.last_saved_at = Some(now);
        Ok(true)
    }

    /// Saves unconditionally, as on page unload.
    pub fn flush<S: KeyValueStore>(
        &mut self,
        now: DateTime<Utc>,
        persistence: &ScriptPersistence<S>,
        manager: &DataManager,
    ) -> Result<(), PersistenceError> {
        persistence.save_autosave(manager)?;
        self.last_saved_at = Some(now);
        Ok(())
    }
}
