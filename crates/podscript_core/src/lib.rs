//! Core domain logic for the podcast script editor.
//! This crate is the single source of truth for script invariants: role and
//! replica identity, cascade deletes, ordering and derived statistics.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::EditorConfig;
pub use logging::{
    default_log_level, init_logging, logging_status, LogFacadeLogger, LoggingError, ScriptLogger,
};
pub use model::entity::{Entity, EntityId, Timestamps};
pub use model::replica::{count_words, Replica};
pub use model::role::{Role, RoleKind, RoleValidationError};
pub use model::script::{
    ReplicaRecord, RoleRecord, ScriptData, Statistics, SCRIPT_FORMAT_VERSION,
};
pub use repo::collection::OrderedCollection;
pub use repo::kv_repo::{KeyValueStore, KvError, MemoryKeyValueStore, SqliteKeyValueStore};
pub use repo::replica_store::ReplicaStore;
pub use repo::role_store::RoleStore;
pub use service::data_manager::{CallbackId, DataManager, ImportSummary, ScriptError};
pub use service::persistence::{AutoSaver, PersistenceError, ScriptPersistence};
pub use service::serialization::{
    decode_script, parse_script_text, sanitize_export_filename, DecodedScript, ImportError,
};
pub use service::statistics::{compute_statistics, format_duration};
pub use service::validation::{is_valid_script, validate_script, ValidationError};
pub use service::viewer::{ScriptViewer, ViewerError, ViewerLine};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
