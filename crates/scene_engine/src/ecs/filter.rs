//! Cached component-composition queries

use super::{Entity, EntityId};
use std::collections::BTreeSet;

/// Live view of all entities that carry every required component type.
///
/// Filters are created and memoized by the manager, keyed by the sorted,
/// dot-joined list of required type tags, and kept current as components
/// are attached, detached and entities are removed.
#[derive(Debug, Clone)]
pub struct EntityFilter {
    key: String,
    required: Vec<String>,
    entities: BTreeSet<EntityId>,
}

impl EntityFilter {
    /// Cache key for a component list: sorted and joined with `.`
    pub fn key_for<S: AsRef<str>>(type_names: &[S]) -> String {
        let mut sorted: Vec<&str> = type_names.iter().map(AsRef::as_ref).collect();
        sorted.sort_unstable();
        sorted.join(".")
    }

    pub(super) fn new<S: AsRef<str>>(type_names: &[S]) -> Self {
        let mut required: Vec<String> = type_names.iter().map(|s| s.as_ref().to_string()).collect();
        required.sort_unstable();
        Self {
            key: Self::key_for(type_names),
            required,
            entities: BTreeSet::new(),
        }
    }

    /// Cache key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Required type tags, sorted
    pub fn required_components(&self) -> &[String] {
        &self.required
    }

    /// Whether `entity` satisfies the filter
    pub fn matches(&self, entity: &Entity) -> bool {
        entity.has_components(&self.required)
    }

    /// Whether the entity is currently in the result set
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    /// Matching entity ids in ascending order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// Number of matching entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity matches
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Re-test membership of one entity
    pub(super) fn refresh(&mut self, entity: &Entity) {
        if self.matches(entity) {
            self.entities.insert(entity.id());
        } else {
            self.entities.remove(&entity.id());
        }
    }

    pub(super) fn remove(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_order_independent() {
        assert_eq!(EntityFilter::key_for(&["Transform", "Bounds"]), "Bounds.Transform");
        assert_eq!(EntityFilter::key_for(&["Bounds", "Transform"]), "Bounds.Transform");
        assert_eq!(EntityFilter::key_for::<&str>(&[]), "");
    }

    #[test]
    fn test_required_components_sorted() {
        let filter = EntityFilter::new(&["Camera", "Anchor"]);
        assert_eq!(filter.required_components(), &["Anchor".to_string(), "Camera".to_string()]);
        assert!(filter.is_empty());
    }
}
