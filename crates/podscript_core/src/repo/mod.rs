//! Storage layer for live script state and persisted snapshots.
//!
//! # Responsibility
//! - Keep roles and replicas in explicit order with id lookup.
//! - Provide a key/value persistence contract for snapshots.
//!
//! # Invariants
//! - In-memory stores never hold two entities with the same id.
//! - Stores do not cascade; cross-store coordination belongs to the
//!   data manager facade.

pub mod collection;
pub mod kv_repo;
pub mod replica_store;
pub mod role_store;
