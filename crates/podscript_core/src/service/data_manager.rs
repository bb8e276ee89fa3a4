//! Data manager: the single mutation gateway for live script state.
//!
//! # Responsibility
//! - Own the role and replica stores and expose every mutation.
//! - Coordinate cascade deletes and single-step undo.
//! - Notify subscribers after every state change, batching bulk work.
//!
//! # Invariants
//! - Callers only see `&RoleStore`/`&ReplicaStore`; stores are never
//!   mutated behind the facade.
//! - Role names are unique (case-insensitive) among roles added or renamed
//!   through the facade.
//! - After `remove_role(R)` no replica references `R`.
//! - Import is validated and decoded in full before any store is cleared; a
//!   failed import leaves existing state untouched.
//! - While a batch is open, notifications are deferred; closing the
//!   outermost batch fires at most one notification.
//! - Statistics are derived on demand and never cached across mutations.

use crate::config::EditorConfig;
use crate::logging::{LogFacadeLogger, ScriptLogger};
use crate::model::entity::{Entity, EntityId};
use crate::model::replica::Replica;
use crate::model::role::{normalize_role_name, Role, RoleValidationError};
use crate::model::script::{ScriptData, Statistics};
use crate::repo::replica_store::ReplicaStore;
use crate::repo::role_store::RoleStore;
use crate::service::serialization::{build_snapshot, decode_script, parse_script_text, ImportError};
use crate::service::statistics::compute_statistics;
use chrono::Utc;
use log::Level;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Mutation rejected by facade-level validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Role name is blank or too long.
    InvalidRoleName(RoleValidationError),
    /// Another role already uses this name (case-insensitive).
    DuplicateRoleName(String),
    /// An entity with this id already exists.
    DuplicateId(EntityId),
    /// Text is blank but the owning role is not a sound effect.
    EmptyReplicaText,
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRoleName(err) => write!(f, "{err}"),
            Self::DuplicateRoleName(name) => write!(f, "role name already in use: `{name}`"),
            Self::DuplicateId(id) => write!(f, "entity id already in use: {id}"),
            Self::EmptyReplicaText => {
                write!(f, "replica text may only be blank for sound effects")
            }
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRoleName(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RoleValidationError> for ScriptError {
    fn from(value: RoleValidationError) -> Self {
        Self::InvalidRoleName(value)
    }
}

/// Handle returned by `add_update_callback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Subscriber invoked with fresh statistics after each change.
pub type UpdateCallback = Box<dyn FnMut(&Statistics)>;

/// Counts reported by a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub roles: usize,
    pub replicas: usize,
}

/// Last removal, kept for a single-step restore.
#[derive(Debug, Clone)]
enum RemovalRecord {
    Role {
        index: usize,
        role: Role,
        /// Cascaded replicas with their original indices, ascending.
        replicas: Vec<(usize, Replica)>,
    },
    Replica {
        index: usize,
        replica: Replica,
    },
}

/// Facade over the live role and replica stores.
pub struct DataManager {
    roles: RoleStore,
    replicas: ReplicaStore,
    config: EditorConfig,
    logger: Rc<dyn ScriptLogger>,
    callbacks: Vec<(CallbackId, UpdateCallback)>,
    next_callback_id: u64,
    batch_depth: u32,
    pending_notify: bool,
    last_removal: Option<RemovalRecord>,
}

impl Default for DataManager {
    fn default() -> Self {
        Self::new(EditorConfig::default(), Rc::new(LogFacadeLogger))
    }
}

impl DataManager {
    /// Creates an empty manager with an injected logger.
    pub fn new(config: EditorConfig, logger: Rc<dyn ScriptLogger>) -> Self {
        Self {
            roles: RoleStore::new(),
            replicas: ReplicaStore::new(),
            config,
            logger,
            callbacks: Vec::new(),
            next_callback_id: 1,
            batch_depth: 0,
            pending_notify: false,
            last_removal: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn roles(&self) -> &RoleStore {
        &self.roles
    }

    pub fn replicas(&self) -> &ReplicaStore {
        &self.replicas
    }

    pub fn find_role_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.find_by_name(name)
    }

    /// True iff both stores are empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.replicas.is_empty()
    }

    // ----- roles -----

    /// Appends a role.
    ///
    /// # Errors
    /// - `InvalidRoleName` for blank or over-long names.
    /// - `DuplicateRoleName` when another role has the same name.
    /// - `DuplicateId` when the id is already present.
    pub fn add_role(&mut self, role: Role) -> Result<EntityId, ScriptError> {
        normalize_role_name(role.name())?;
        if self.roles.is_name_taken(role.name(), None) {
            return Err(ScriptError::DuplicateRoleName(role.name().to_string()));
        }
        let id = role.id().to_string();
        let data = json!({ "roleId": id, "type": role.type_name() });
        if !self.roles.add(role) {
            return Err(ScriptError::DuplicateId(id));
        }

        self.log(Level::Info, "event=role_added module=script status=ok", Some(&data));
        self.changed();
        Ok(id)
    }

    /// Removes a role and every replica assigned to it.
    ///
    /// Returns `false` without mutation when the role does not exist. The
    /// removal (role plus cascaded replicas) becomes the undo target.
    pub fn remove_role(&mut self, role_id: &str) -> bool {
        if self.roles.find_by_id(role_id).is_none() {
            return false;
        }

        let dependents: Vec<EntityId> = self
            .replicas
            .get_by_role(role_id)
            .into_iter()
            .map(|replica| replica.id().to_string())
            .collect();

        // Back to front, so each reported index is the original position.
        let mut removed_replicas = Vec::with_capacity(dependents.len());
        for replica_id in dependents.iter().rev() {
            if let Some((index, replica)) = self.replicas.remove(replica_id) {
                self.log(
                    Level::Debug,
                    "event=replica_cascade_removed module=script status=ok",
                    Some(&json!({ "roleId": role_id, "replicaId": replica_id, "index": index })),
                );
                removed_replicas.push((index, replica));
            }
        }
        removed_replicas.reverse();

        let Some((index, role)) = self.roles.remove(role_id) else {
            return false;
        };

        self.log(
            Level::Info,
            "event=role_removed module=script status=ok",
            Some(&json!({ "roleId": role_id, "cascaded": removed_replicas.len() })),
        );
        self.last_removal = Some(RemovalRecord::Role {
            index,
            role,
            replicas: removed_replicas,
        });
        self.changed();
        true
    }

    /// Renames a role. Returns `Ok(false)` when the role does not exist.
    pub fn update_role_name(&mut self, role_id: &str, name: &str) -> Result<bool, ScriptError> {
        if self.roles.find_by_id(role_id).is_none() {
            return Ok(false);
        }
        let normalized = normalize_role_name(name)?;
        if self.roles.is_name_taken(&normalized, Some(role_id)) {
            return Err(ScriptError::DuplicateRoleName(normalized));
        }
        let Some(role) = self.roles.find_by_id_mut(role_id) else {
            return Ok(false);
        };
        role.set_name(&normalized)?;
        self.changed();
        Ok(true)
    }

    /// Sets a speaker rate (clamped). `false` for unknown or non-speaker ids.
    pub fn set_speaker_rate(&mut self, role_id: &str, words_per_minute: i64) -> bool {
        let updated = self
            .roles
            .find_by_id_mut(role_id)
            .is_some_and(|role| role.set_words_per_minute(words_per_minute));
        if updated {
            self.changed();
        }
        updated
    }

    /// Sets a speaker display color. `false` for unknown or non-speaker ids.
    pub fn set_speaker_color(&mut self, role_id: &str, color: Option<String>) -> bool {
        let updated = self
            .roles
            .find_by_id_mut(role_id)
            .is_some_and(|role| role.set_color(color));
        if updated {
            self.changed();
        }
        updated
    }

    /// Sets a sound effect length (clamped). `false` for unknown or
    /// non-sound ids.
    pub fn set_sound_duration(&mut self, role_id: &str, duration_secs: f64) -> bool {
        let updated = self
            .roles
            .find_by_id_mut(role_id)
            .is_some_and(|role| role.set_duration(duration_secs));
        if updated {
            self.changed();
        }
        updated
    }

    /// Moves a role to `new_index`. `false` when absent or out of bounds.
    pub fn move_role(&mut self, role_id: &str, new_index: usize) -> bool {
        let moved = self.roles.move_to(role_id, new_index);
        if moved {
            self.changed();
        }
        moved
    }

    // ----- replicas -----

    /// Appends a replica.
    ///
    /// # Errors
    /// - `EmptyReplicaText` when text is blank and the role is not a sound
    ///   effect.
    /// - `DuplicateId` when the id is already present.
    pub fn add_replica(&mut self, replica: Replica) -> Result<EntityId, ScriptError> {
        self.ensure_text_allowed(replica.text(), replica.role_id())?;
        let id = replica.id().to_string();
        let data = json!({ "replicaId": id, "roleId": replica.role_id() });
        if !self.replicas.add(replica) {
            return Err(ScriptError::DuplicateId(id));
        }

        self.log(Level::Info, "event=replica_added module=script status=ok", Some(&data));
        self.changed();
        Ok(id)
    }

    /// Removes one replica. Returns `false` when it does not exist.
    pub fn remove_replica(&mut self, replica_id: &str) -> bool {
        let Some((index, replica)) = self.replicas.remove(replica_id) else {
            return false;
        };

        self.log(
            Level::Info,
            "event=replica_removed module=script status=ok",
            Some(&json!({ "replicaId": replica_id, "index": index })),
        );
        self.last_removal = Some(RemovalRecord::Replica { index, replica });
        self.changed();
        true
    }

    /// Replaces replica text. Returns `Ok(false)` when it does not exist.
    pub fn update_replica_text(
        &mut self,
        replica_id: &str,
        text: impl Into<String>,
    ) -> Result<bool, ScriptError> {
        let text = text.into();
        let Some(role_id) = self
            .replicas
            .find_by_id(replica_id)
            .map(|replica| replica.role_id().map(str::to_string))
        else {
            return Ok(false);
        };
        self.ensure_text_allowed(&text, role_id.as_deref())?;

        if let Some(replica) = self.replicas.find_by_id_mut(replica_id) {
            replica.set_text(text);
        }
        self.changed();
        Ok(true)
    }

    /// Reassigns a replica, or unassigns it with `None`.
    ///
    /// Returns `Ok(false)` when the replica does not exist.
    pub fn set_replica_role(
        &mut self,
        replica_id: &str,
        role_id: Option<EntityId>,
    ) -> Result<bool, ScriptError> {
        let Some(text) = self
            .replicas
            .find_by_id(replica_id)
            .map(|replica| replica.text().to_string())
        else {
            return Ok(false);
        };
        self.ensure_text_allowed(&text, role_id.as_deref())?;

        if let Some(replica) = self.replicas.find_by_id_mut(replica_id) {
            replica.set_role(role_id);
        }
        self.changed();
        Ok(true)
    }

    /// Moves a replica to `new_index`; notifies only on success.
    pub fn move_replica(&mut self, replica_id: &str, new_index: usize) -> bool {
        let moved = self.replicas.move_to(replica_id, new_index);
        if moved {
            self.changed();
        }
        moved
    }

    /// Swaps a replica with its predecessor. `false` at the top or if absent.
    pub fn move_replica_up(&mut self, replica_id: &str) -> bool {
        match self.replicas.index_of(replica_id) {
            Some(index) if index > 0 => self.move_replica(replica_id, index - 1),
            _ => false,
        }
    }

    /// Swaps a replica with its successor. `false` at the bottom or if absent.
    pub fn move_replica_down(&mut self, replica_id: &str) -> bool {
        match self.replicas.index_of(replica_id) {
            Some(index) => self.move_replica(replica_id, index + 1),
            None => false,
        }
    }

    // ----- undo -----

    /// Whether a removal can currently be restored.
    pub fn can_undo_removal(&self) -> bool {
        self.last_removal.is_some()
    }

    /// Restores the last removed role (with its cascaded replicas) or
    /// replica at the original positions.
    ///
    /// Returns `false` when there is nothing to restore or when an id has
    /// been reused since; state is untouched in both cases.
    pub fn undo_last_removal(&mut self) -> bool {
        let Some(record) = self.last_removal.take() else {
            return false;
        };

        let restorable = match &record {
            RemovalRecord::Role { role, replicas, .. } => {
                self.roles.find_by_id(role.id()).is_none()
                    && replicas
                        .iter()
                        .all(|(_, replica)| !self.replicas.contains(replica.id()))
            }
            RemovalRecord::Replica { replica, .. } => !self.replicas.contains(replica.id()),
        };
        if !restorable {
            self.log(
                Level::Warn,
                "event=undo_removal module=script status=skipped reason=id_reused",
                None,
            );
            return false;
        }

        match record {
            RemovalRecord::Role {
                index,
                role,
                replicas,
            } => {
                let role_id = role.id().to_string();
                let restored = replicas.len();
                self.roles.insert_at(index, role);
                for (replica_index, replica) in replicas {
                    self.replicas.insert_at(replica_index, replica);
                }
                self.log(
                    Level::Info,
                    "event=undo_removal module=script status=ok kind=role",
                    Some(&json!({ "roleId": role_id, "replicas": restored })),
                );
            }
            RemovalRecord::Replica { index, replica } => {
                let replica_id = replica.id().to_string();
                self.replicas.insert_at(index, replica);
                self.log(
                    Level::Info,
                    "event=undo_removal module=script status=ok kind=replica",
                    Some(&json!({ "replicaId": replica_id })),
                );
            }
        }
        self.changed();
        true
    }

    // ----- bulk -----

    /// Empties both stores and drops any pending undo.
    pub fn clear_all(&mut self) {
        self.roles.clear();
        self.replicas.clear();
        self.last_removal = None;
        self.log(Level::Info, "event=clear_all module=script status=ok", None);
        self.changed();
    }

    /// Fresh statistics over the current stores.
    pub fn statistics(&self) -> Statistics {
        compute_statistics(&self.roles, &self.replicas)
    }

    /// Snapshot of the current state stamped with the current time.
    pub fn export_data(&self) -> ScriptData {
        build_snapshot(&self.roles, &self.replicas, Utc::now())
    }

    /// Pretty-printed JSON of `export_data()`.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.export_data())
    }

    /// Replaces all state with the content of a script document.
    ///
    /// The document is validated and decoded before anything is cleared;
    /// on error the current state is left as it was. On success exactly one
    /// notification fires.
    pub fn import_data(&mut self, data: &Value) -> Result<ImportSummary, ImportError> {
        let decoded = match decode_script(data, &self.config) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.log(
                    Level::Warn,
                    "event=import module=script status=error",
                    Some(&json!({ "error": err.to_string() })),
                );
                return Err(err);
            }
        };

        let summary = ImportSummary {
            roles: decoded.roles.len(),
            replicas: decoded.replicas.len(),
        };

        self.begin_batch();
        self.roles.clear();
        self.replicas.clear();
        self.last_removal = None;
        for role in decoded.roles {
            self.roles.add(role);
        }
        for replica in decoded.replicas {
            self.replicas.add(replica);
        }
        self.pending_notify = true;
        self.end_batch();

        self.log(
            Level::Info,
            "event=import module=script status=ok",
            Some(&json!({ "roles": summary.roles, "replicas": summary.replicas })),
        );
        Ok(summary)
    }

    /// Parses JSON text, then behaves like `import_data`.
    pub fn import_json(&mut self, text: &str) -> Result<ImportSummary, ImportError> {
        let data = match parse_script_text(text) {
            Ok(data) => data,
            Err(err) => {
                self.log(
                    Level::Warn,
                    "event=import module=script status=error",
                    Some(&json!({ "error": err.to_string() })),
                );
                return Err(err);
            }
        };
        self.import_data(&data)
    }

    // ----- notifications -----

    /// Registers a subscriber for change notifications.
    pub fn add_update_callback(&mut self, callback: impl FnMut(&Statistics) + 'static) -> CallbackId {
        let id = CallbackId(self.next_callback_id);
        self.next_callback_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Unregisters a subscriber. Returns `false` for unknown ids.
    pub fn remove_update_callback(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(current, _)| *current != id);
        self.callbacks.len() != before
    }

    /// Defers notifications until the matching `end_batch`.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Closes a batch; the outermost close flushes one pending notification.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.pending_notify {
            self.notify();
        }
    }

    fn changed(&mut self) {
        if self.batch_depth > 0 {
            self.pending_notify = true;
        } else {
            self.notify();
        }
    }

    fn notify(&mut self) {
        self.pending_notify = false;
        let statistics = compute_statistics(&self.roles, &self.replicas);
        for (_, callback) in self.callbacks.iter_mut() {
            callback(&statistics);
        }
    }

    fn ensure_text_allowed(&self, text: &str, role_id: Option<&str>) -> Result<(), ScriptError> {
        if !text.trim().is_empty() {
            return Ok(());
        }
        let is_sound = role_id
            .and_then(|id| self.roles.find_by_id(id))
            .is_some_and(Role::is_sound_effect);
        if is_sound {
            Ok(())
        } else {
            Err(ScriptError::EmptyReplicaText)
        }
    }

    fn log(&self, level: Level, message: &str, data: Option<&Value>) {
        self.logger.log(level, message, data);
    }
}
