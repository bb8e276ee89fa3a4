//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store mutations behind the `DataManager` facade.
//! - Derive statistics, validate/convert exchange data, persist snapshots.
//! - Keep UI layers decoupled from store internals.

pub mod data_manager;
pub mod persistence;
pub mod serialization;
pub mod statistics;
pub mod validation;
pub mod viewer;
