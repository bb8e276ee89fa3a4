//! Ordered, id-indexed entity container.
//!
//! # Responsibility
//! - Preserve insertion/explicit order for drag-drop and move up/down.
//! - Offer O(1) lookup by id alongside the order list.
//!
//! # Invariants
//! - `order` and `entries` always hold the same id set.
//! - No duplicate ids; `add`/`insert_at` refuse a second entity with a
//!   known id.
//! - `move_to` never changes the collection size.

use crate::model::entity::{Entity, EntityId};
use std::collections::HashMap;

/// Ordered collection of entities keyed by id.
#[derive(Debug, Clone)]
pub struct OrderedCollection<T: Entity> {
    entries: HashMap<EntityId, T>,
    order: Vec<EntityId>,
}

impl<T: Entity> Default for OrderedCollection<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Entity + Clone> OrderedCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity. Returns `false` when the id is already present.
    pub fn add(&mut self, item: T) -> bool {
        let index = self.order.len();
        self.insert_at(index, item)
    }

    /// Inserts an entity at `index`, clamped to the current length.
    ///
    /// Returns `false` when the id is already present.
    pub fn insert_at(&mut self, index: usize, item: T) -> bool {
        let id = item.id().to_string();
        if self.entries.contains_key(&id) {
            return false;
        }
        let index = index.min(self.order.len());
        self.order.insert(index, id.clone());
        self.entries.insert(id, item);
        true
    }

    /// Removes the entity with `id`, returning its former index and value.
    pub fn remove(&mut self, id: &str) -> Option<(usize, T)> {
        let index = self.index_of(id)?;
        self.order.remove(index);
        self.entries.remove(id).map(|item| (index, item))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// 0-based position of `id`, if present.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|current| current == id)
    }

    /// Entity at a 0-based position.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.order.get(index).and_then(|id| self.entries.get(id))
    }

    /// Moves `id` to `new_index` (remove-then-reinsert).
    ///
    /// Returns `false` and leaves the order untouched when `id` is absent
    /// or `new_index >= len()`.
    pub fn move_to(&mut self, id: &str, new_index: usize) -> bool {
        if new_index >= self.order.len() {
            return false;
        }
        let Some(current) = self.index_of(id) else {
            return false;
        };
        let moved = self.order.remove(current);
        self.order.insert(new_index, moved);
        true
    }

    /// Iterates entities in order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Owned copy of all entities in order.
    pub fn get_all(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Ids in order.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::OrderedCollection;
    use crate::model::entity::Entity;
    use crate::model::replica::Replica;

    fn collection_of(texts: &[&str]) -> (OrderedCollection<Replica>, Vec<String>) {
        let mut collection = OrderedCollection::new();
        let mut ids = Vec::new();
        for text in texts {
            let replica = Replica::new(*text, None);
            ids.push(replica.id().to_string());
            assert!(collection.add(replica));
        }
        (collection, ids)
    }

    #[test]
    fn insert_at_clamps_to_length() {
        let (mut collection, ids) = collection_of(&["a", "b"]);
        let extra = Replica::new("c", None);
        let extra_id = extra.id().to_string();
        assert!(collection.insert_at(99, extra));
        assert_eq!(collection.ids(), &[ids[0].clone(), ids[1].clone(), extra_id]);
    }

    #[test]
    fn remove_reports_original_index() {
        let (mut collection, ids) = collection_of(&["a", "b", "c"]);
        let (index, removed) = collection.remove(&ids[1]).unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.text(), "b");
        assert!(collection.remove(&ids[1]).is_none());
        assert_eq!(collection.len(), 2);
    }
}
