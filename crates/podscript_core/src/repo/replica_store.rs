//! Replica store: ordered script lines with role-ownership queries.

use crate::model::replica::Replica;
use crate::model::script::ReplicaRecord;
use crate::repo::collection::OrderedCollection;

/// Ordered in-memory replica storage.
#[derive(Debug, Clone, Default)]
pub struct ReplicaStore {
    items: OrderedCollection<Replica>,
}

impl ReplicaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, replica: Replica) -> bool {
        self.items.add(replica)
    }

    pub fn insert_at(&mut self, index: usize, replica: Replica) -> bool {
        self.items.insert_at(index, replica)
    }

    pub fn remove(&mut self, id: &str) -> Option<(usize, Replica)> {
        self.items.remove(id)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Replica> {
        self.items.find_by_id(id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Replica> {
        self.items.find_by_id_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.items.index_of(id)
    }

    pub fn get(&self, index: usize) -> Option<&Replica> {
        self.items.get(index)
    }

    pub fn move_to(&mut self, id: &str, new_index: usize) -> bool {
        self.items.move_to(id, new_index)
    }

    /// Replicas assigned to `role_id`, in script order.
    pub fn get_by_role(&self, role_id: &str) -> Vec<&Replica> {
        self.items
            .iter()
            .filter(|replica| replica.belongs_to(role_id))
            .collect()
    }

    /// Replicas with no role assigned, in script order.
    pub fn get_unassigned(&self) -> Vec<&Replica> {
        self.items
            .iter()
            .filter(|replica| !replica.is_assigned())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Replica> + '_ {
        self.items.iter()
    }

    pub fn get_all(&self) -> Vec<Replica> {
        self.items.get_all()
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
    pub fn to_records(&self) -> Vec<ReplicaRecord> {
        self.items.iter().map(ReplicaRecord::from).collect()
    }
}
