//! Statistics engine.
//!
//! # Responsibility
//! - Derive word count and estimated duration from roles and replicas.
//!
//! # Invariants
//! - Pure: output depends only on the passed stores, nothing is cached.
//! - Only speaker-assigned replicas contribute words.
//! - A sound effect contributes its duration once per referencing replica.
//! - Replicas pointing at a missing role contribute nothing.

use crate::model::replica::Replica;
use crate::model::role::{Role, RoleKind};
use crate::model::script::Statistics;
use crate::repo::replica_store::ReplicaStore;
use crate::repo::role_store::RoleStore;

/// Computes fresh statistics over the current stores.
pub fn compute_statistics(roles: &RoleStore, replicas: &ReplicaStore) -> Statistics {
    let mut total_words = 0;
    let mut total_duration = 0.0;

    for replica in replicas.iter() {
        let role = replica.role_id().and_then(|id| roles.find_by_id(id));
        total_words += replica_words(replica, role);
        total_duration += replica_duration_minutes(replica, role);
    }

    Statistics {
        total_words,
        total_duration,
        total_duration_formatted: format_duration(total_duration),
        role_count: roles.len(),
        replica_count: replicas.len(),
    }
}

/// Words one replica contributes given its resolved role.
pub fn replica_words(replica: &Replica, role: Option<&Role>) -> usize {
    match role.map(Role::kind) {
        Some(RoleKind::Speaker { .. }) => replica.word_count(),
        _ => 0,
    }
}

/// Minutes one replica contributes given its resolved role.
pub fn replica_duration_minutes(replica: &Replica, role: Option<&Role>) -> f64 {
    match role.map(Role::kind) {
        Some(RoleKind::Speaker {
            words_per_minute, ..
        }) if *words_per_minute > 0 => replica.word_count() as f64 / f64::from(*words_per_minute),
        Some(RoleKind::SoundEffect { duration_secs }) => duration_secs / 60.0,
        _ => 0.0,
    }
}

/// Renders minutes as `M:SS`, rounding to the nearest second.
pub fn format_duration(minutes: f64) -> String {
    let total_seconds = if minutes.is_finite() && minutes > 0.0 {
        (minutes * 60.0).round() as u64
    } else {
        0
    };
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::format_duration;

    #[test]
    fn format_duration_pads_seconds() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(4.0 / 120.0), "0:02");
        assert_eq!(format_duration(1.5), "1:30");
        assert_eq!(format_duration(61.0), "61:00");
    }

    #[test]
    fn format_duration_rounds_to_nearest_second() {
        assert_eq!(format_duration(59.6 / 60.0), "1:00");
        assert_eq!(format_duration(0.4 / 60.0), "0:00");
    }

    #[test]
    fn format_duration_treats_invalid_input_as_zero() {
        assert_eq!(format_duration(-2.0), "0:00");
        assert_eq!(format_duration(f64::NAN), "0:00");
    }
}
