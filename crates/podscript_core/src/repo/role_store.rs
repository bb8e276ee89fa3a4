//! Role store: ordered roles with kind and name queries.

use crate::model::entity::Entity;
use crate::model::role::Role;
use crate::model::script::RoleRecord;
use crate::repo::collection::OrderedCollection;

/// Ordered in-memory role storage.
#[derive(Debug, Clone, Default)]
pub struct RoleStore {
    items: OrderedCollection<Role>,
}

impl RoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, role: Role) -> bool {
        self.items.add(role)
    }

    pub fn insert_at(&mut self, index: usize, role: Role) -> bool {
        self.items.insert_at(index, role)
    }

    pub fn remove(&mut self, id: &str) -> Option<(usize, Role)> {
        self.items.remove(id)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Role> {
        self.items.find_by_id(id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Role> {
        self.items.find_by_id_mut(id)
    }

    /// Case-insensitive, trim-insensitive name lookup.
    pub fn find_by_name(&self, name: &str) -> Option<&Role> {
        self.items.iter().find(|role| role.has_name(name))
    }

    /// Whether another role (not `except_id`) already uses `name`.
    pub fn is_name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        self.items
            .iter()
            .any(|role| role.has_name(name) && Some(role.id()) != except_id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.index_of(id)
    }

    pub fn move_to(&mut self, id: &str, new_index: usize) -> bool {
        self.items.move_to(id, new_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> + '_ {
        self.items.iter()
    }

    pub fn get_all(&self) -> Vec<Role> {
        self.items.get_all()
    }

    pub fn get_speakers(&self) -> Vec<&Role> {
        self.items.iter().filter(|role| role.is_speaker()).collect()
    }

    pub fn get_sound_effects(&self) -> Vec<&Role> {
        self.items
            .iter()
            .filter(|role| role.is_sound_effect())
            .collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Wire records in store order.
    pub fn to_records(&self) -> Vec<RoleRecord> {
        self.items.iter().map(RoleRecord::from).collect()
    }
}
