//! Script domain model.
//!
//! # Responsibility
//! - Define roles (speakers, sound effects) and replicas (script lines).
//! - Define the exchange snapshot (`ScriptData`) and its wire records.
//!
//! # Invariants
//! - Every record is identified by an `EntityId` that never changes.
//! - Derived values (`Replica::word_count`) are recomputed on every write.

pub mod entity;
pub mod replica;
pub mod role;
pub mod script;
