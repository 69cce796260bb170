//! Entity implementation

use super::component::{downcast_mut, downcast_ref, Component, ComponentType};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use uuid::Uuid;

/// Entity identifier
///
/// Assigned by the owning [`EntityManager`](super::EntityManager) from a
/// monotonically increasing counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id value
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An entity record: identity, components, hierarchy links and group tags.
///
/// Parent and children are stored as ids into the manager's table, so the
/// parent link is a relation, never ownership. Structural changes go through
/// the manager, which keeps filters, groups and transforms consistent.
pub struct Entity {
    id: EntityId,
    uuid: Uuid,
    name: String,
    components: HashMap<&'static str, Box<dyn Component>>,
    pub(super) parent: Option<EntityId>,
    pub(super) children: Vec<EntityId>,
    pub(super) groups: BTreeSet<String>,
}

impl Entity {
    pub(super) fn new(id: EntityId, name: String) -> Self {
        Self {
            id,
            uuid: Uuid::new_v4(),
            name,
            components: HashMap::new(),
            parent: None,
            children: Vec::new(),
            groups: BTreeSet::new(),
        }
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Random identifier for display and debugging; not used for lookups
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Parent entity, `None` for roots
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Owned children in insertion order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Names of the groups this entity belongs to
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    /// Whether a component with the given type tag is attached
    pub fn has_component(&self, type_name: &str) -> bool {
        self.components.contains_key(type_name)
    }

    /// Whether all of the given type tags are attached
    pub fn has_components<S: AsRef<str>>(&self, type_names: &[S]) -> bool {
        type_names.iter().all(|name| self.has_component(name.as_ref()))
    }

    /// Typed component lookup
    pub fn get_component<T: ComponentType>(&self) -> Option<&T> {
        self.components
            .get(T::TYPE_NAME)
            .and_then(|c| downcast_ref::<T>(c.as_ref()))
    }

    /// Typed mutable component lookup
    pub fn get_component_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(T::TYPE_NAME)
            .and_then(|c| downcast_mut::<T>(c.as_mut()))
    }

    /// Lookup by type tag
    pub fn get_component_by_name(&self, type_name: &str) -> Option<&dyn Component> {
        self.components.get(type_name).map(|c| c.as_ref())
    }

    /// Type tags of all attached components, sorted
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.components.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub(super) fn insert_component(&mut self, component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        self.components.insert(component.type_name(), component)
    }

    pub(super) fn take_component(&mut self, type_name: &str) -> Option<Box<dyn Component>> {
        self.components.remove(type_name)
    }

    pub(super) fn drain_components(&mut self) -> Vec<Box<dyn Component>> {
        self.components.drain().map(|(_, c)| c).collect()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("uuid", &self.uuid)
            .field("name", &self.name)
            .field("components", &self.component_names())
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("groups", &self.groups)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{ColliderBox, Transform};
    use crate::foundation::math::Vec3;

    fn entity_with_transform() -> Entity {
        let mut entity = Entity::new(EntityId::from_raw(7), "crate".to_string());
        entity.insert_component(Box::new(Transform::from_position(Vec3::new(1.0, 2.0, 3.0))));
        entity
    }

    #[test]
    fn test_lookup_by_type_tag() {
        let entity = entity_with_transform();

        let found = entity.get_component_by_name("Transform").unwrap();
        assert_eq!(found.type_name(), Transform::TYPE_NAME);
        let transform = downcast_ref::<Transform>(found).unwrap();
        assert_eq!(transform.position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_lookup_by_unknown_tag_is_none() {
        let entity = entity_with_transform();
        assert!(entity.get_component_by_name("Collider").is_none());
        assert!(entity.get_component_by_name("").is_none());
        assert!(entity.get_component::<ColliderBox>().is_none());
    }

    #[test]
    fn test_component_names_are_sorted() {
        let mut entity = entity_with_transform();
        entity.insert_component(Box::new(ColliderBox::unit()));

        let mut expected = vec![Transform::TYPE_NAME, ColliderBox::TYPE_NAME];
        expected.sort_unstable();
        assert_eq!(entity.component_names(), expected);
        assert!(entity.has_components(&[Transform::TYPE_NAME, ColliderBox::TYPE_NAME]));

        entity.take_component(Transform::TYPE_NAME);
        assert_eq!(entity.component_names(), vec![ColliderBox::TYPE_NAME]);
    }

    #[test]
    fn test_insert_same_tag_returns_previous() {
        let mut entity = entity_with_transform();
        let previous = entity.insert_component(Box::new(Transform::identity()));

        assert!(previous.is_some());
        assert_eq!(entity.component_names().len(), 1);
        assert_eq!(entity.get_component::<Transform>().unwrap().position(), Vec3::zeros());
    }

    #[test]
    fn test_display_id() {
        assert_eq!(EntityId::from_raw(42).to_string(), "#42");
        assert_eq!(EntityId::from_raw(42).raw(), 42);
    }
}
