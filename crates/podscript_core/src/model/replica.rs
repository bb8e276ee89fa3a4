//! Replica domain model.
//!
//! # Responsibility
//! - Represent one script line (spoken text or sound cue).
//! - Keep the derived word count in lockstep with `text`.
//!
//! # Invariants
//! - `word_count == count_words(text)` after every constructor and setter.
//! - `role_id == None` means the replica is unassigned.

use crate::model::entity::{generate_id, Entity, EntityId, Timestamps};

/// One line of a script.
#[derive(Debug, Clone, PartialEq)]
pub struct Replica {
    id: EntityId,
    text: String,
    role_id: Option<EntityId>,
    word_count: usize,
    timestamps: Timestamps,
}

impl Replica {
    /// Creates a replica with a generated id.
    pub fn new(text: impl Into<String>, role_id: Option<EntityId>) -> Self {
        Self::restore(generate_id(), text.into(), role_id, Timestamps::now())
    }

    /// Rebuilds a replica whose identity already exists externally.
    ///
    /// The word count is always recomputed from `text`; any stored count is
    /// discarded.
    pub fn restore(
        id: EntityId,
        text: String,
        role_id: Option<EntityId>,
        timestamps: Timestamps,
    ) -> Self {
        let word_count = count_words(&text);
        Self {
            id,
            text,
            role_id,
            word_count,
            timestamps,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn role_id(&self) -> Option<&str> {
        self.role_id.as_deref()
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn is_assigned(&self) -> bool {
        self.role_id.is_some()
    }

    pub fn belongs_to(&self, role_id: &str) -> bool {
        self.role_id.as_deref() == Some(role_id)
    }

    /// Replaces the text and recomputes the word count.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.word_count = count_words(&self.text);
        self.timestamps.touch();
    }

    /// Repoints the replica to another role, or unassigns it with `None`.
    pub fn set_role(&mut self, role_id: Option<EntityId>) {
        self.role_id = role_id;
        self.timestamps.touch();
    }
}

impl Entity for Replica {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

/// Number of whitespace-delimited tokens in `text`; blank text counts as 0.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
