//! Named, manually curated entity buckets

use super::EntityId;
use std::collections::BTreeSet;

/// A named set of entities, independent of component composition.
///
/// Used for render layers such as `"scene"` or `"ui"`; an entity may belong
/// to any number of groups. Membership is managed through the
/// [`EntityManager`](super::EntityManager).
#[derive(Debug, Clone)]
pub struct EntityGroup {
    name: String,
    entities: BTreeSet<EntityId>,
}

impl EntityGroup {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: BTreeSet::new(),
        }
    }

    /// Group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the entity is a member
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    /// Member ids in ascending order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(super) fn add(&mut self, id: EntityId) -> bool {
        self.entities.insert(id)
    }

    pub(super) fn remove(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id)
    }

    pub(super) fn take_all(&mut self) -> BTreeSet<EntityId> {
        std::mem::take(&mut self.entities)
    }
}
