//! Entity manager: the canonical entity table plus filter and group caches

use super::component::{downcast_box, Component, ComponentType};
use super::components::{Anchor, Dimensions, Transform};
use super::{Entity, EntityFilter, EntityGroup, EntityId, SceneError, SceneResult};
use crate::events::{EventSystem, HandlerKey, PointerEvent, PointerEventType, PointerHandler};
use crate::input::MouseDevice;
use std::collections::{BTreeMap, HashMap};

/// Owns every entity of a scene.
///
/// Entities live in an id-keyed table; hierarchy links are ids into the same
/// table. The manager keeps three derived structures consistent with it:
/// memoized component filters, named groups and the pointer handler registry.
/// All structural mutation (components, children, groups, removal) goes
/// through here so that no observation point sees a stale filter.
pub struct EntityManager {
    next_id: u64,
    pub(super) entities: BTreeMap<EntityId, Entity>,
    filters: HashMap<String, EntityFilter>,
    groups: HashMap<String, EntityGroup>,
    events: EventSystem,
}

impl EntityManager {
    /// Create an empty manager. The first entity gets id 1.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entities: BTreeMap::new(),
            filters: HashMap::new(),
            groups: HashMap::new(),
            events: EventSystem::new(),
        }
    }

    /// Create a root entity and register it
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId::from_raw(self.next_id);
        self.next_id += 1;

        let entity = Entity::new(id, name.into());
        log::debug!("Created entity {} '{}' ({})", id, entity.name(), entity.uuid());
        self.entities.insert(id, entity);
        self.refresh_filters(id);
        id
    }

    /// Create an entity and return a builder handle to it
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityMut<'_> {
        let id = self.create_entity(name);
        EntityMut { manager: self, id }
    }

    /// Create an entity as the last child of `parent`
    pub fn create_child(&mut self, parent: EntityId, name: impl Into<String>) -> SceneResult<EntityId> {
        if !self.contains(parent) {
            return Err(SceneError::EntityNotFound(parent));
        }
        let id = self.create_entity(name);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Remove an entity together with its owned children.
    ///
    /// The removed entities leave every filter and group, their handlers are
    /// unregistered and their components are uninitialized. Returns whether
    /// anything was removed.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.get(&id) else {
            return false;
        };
        if let Some(parent) = entity.parent {
            self.detach_from_parent(parent, id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(mut entity) = self.entities.remove(&current) else {
                continue;
            };
            stack.extend(entity.children.iter().copied());

            for mut component in entity.drain_components() {
                component.uninitialize(current);
            }
            for filter in self.filters.values_mut() {
                filter.remove(current);
            }
            for group_name in &entity.groups {
                if let Some(group) = self.groups.get_mut(group_name) {
                    group.remove(current);
                }
            }
            self.events.unregister_entity(current);
            log::debug!("Removed entity {} '{}'", current, entity.name());
        }
        true
    }

    /// Whether the id is registered
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the manager holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable handle to an entity
    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_>> {
        if self.contains(id) {
            Some(EntityMut { manager: self, id })
        } else {
            None
        }
    }

    /// All entities in ascending id order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Attach a component, replacing any component with the same type tag.
    ///
    /// The replaced component is uninitialized and handed back.
    pub fn add_component<C: Component>(&mut self, id: EntityId, component: C) -> SceneResult<Option<Box<dyn Component>>> {
        self.add_boxed_component(id, Box::new(component))
    }

    /// Attach a boxed component; see [`add_component`](Self::add_component)
    pub fn add_boxed_component(
        &mut self,
        id: EntityId,
        mut component: Box<dyn Component>,
    ) -> SceneResult<Option<Box<dyn Component>>> {
        let type_name = component.type_name();
        if type_name.is_empty() {
            return Err(SceneError::UndefinedComponentType);
        }
        let entity = self.entities.get_mut(&id).ok_or(SceneError::EntityNotFound(id))?;

        component.base_mut().dirty = true;
        component.init(id);
        let mut replaced = entity.insert_component(component);
        if let Some(old) = replaced.as_mut() {
            old.uninitialize(id);
            log::debug!("Replaced {} on entity {}", type_name, id);
        } else {
            log::debug!("Added {} to entity {}", type_name, id);
        }

        self.on_component_changed(id, type_name);
        Ok(replaced)
    }

    /// Detach a component by type tag
    pub fn remove_component(&mut self, id: EntityId, type_name: &str) -> Option<Box<dyn Component>> {
        let mut component = self.entities.get_mut(&id)?.take_component(type_name)?;
        component.uninitialize(id);
        log::debug!("Removed {} from entity {}", type_name, id);

        self.on_component_changed(id, type_name);
        Some(component)
    }

    /// Detach a component by type
    pub fn take_component<T: ComponentType>(&mut self, id: EntityId) -> Option<T> {
        self.entity(id)?.get_component::<T>()?;
        self.remove_component(id, T::TYPE_NAME)
            .and_then(downcast_box::<T>)
            .map(|boxed| *boxed)
    }

    /// Typed component lookup
    pub fn get_component<T: ComponentType>(&self, id: EntityId) -> Option<&T> {
        self.entities.get(&id)?.get_component::<T>()
    }

    /// Typed mutable component lookup.
    ///
    /// Changes made through this reference bypass dirty tracking; use the
    /// dedicated manager setters for transforms and dimensions.
    pub fn get_component_mut<T: ComponentType>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(&id)?.get_component_mut::<T>()
    }

    /// Whether the entity carries a component with the given tag
    pub fn has_component(&self, id: EntityId, type_name: &str) -> bool {
        self.entities.get(&id).is_some_and(|e| e.has_component(type_name))
    }

    pub(super) fn on_component_changed(&mut self, id: EntityId, type_name: &str) {
        self.refresh_filters(id);
        match type_name {
            Transform::TYPE_NAME => self.propagate_transform_dirty(id),
            Dimensions::TYPE_NAME | Anchor::TYPE_NAME => self.mark_bounds_dirty(id),
            _ => {}
        }
    }

    fn refresh_filters(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        for filter in self.filters.values_mut() {
            filter.refresh(entity);
        }
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------

    /// Make `child` the last child of `parent`.
    ///
    /// The child is detached from any previous parent first and its transform
    /// subtree is marked dirty.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> SceneResult<()> {
        if !self.contains(parent) {
            return Err(SceneError::EntityNotFound(parent));
        }
        let previous = self
            .entities
            .get(&child)
            .ok_or(SceneError::EntityNotFound(child))?
            .parent;
        if previous == Some(parent) {
            return Ok(());
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::HierarchyCycle { parent, child });
        }

        if let Some(previous) = previous {
            self.detach_from_parent(previous, child);
        }
        if let Some(entity) = self.entities.get_mut(&parent) {
            entity.children.push(child);
        }
        if let Some(entity) = self.entities.get_mut(&child) {
            entity.parent = Some(parent);
        }
        log::debug!("Attached entity {} under {}", child, parent);

        self.mark_transform_dirty(child);
        Ok(())
    }

    /// Detach `child` from `parent`; returns false if it was not a child
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> bool {
        if self.entities.get(&child).and_then(Entity::parent) != Some(parent) {
            return false;
        }
        self.detach_from_parent(parent, child);
        log::debug!("Detached entity {} from {}", child, parent);

        self.mark_transform_dirty(child);
        true
    }

    fn detach_from_parent(&mut self, parent: EntityId, child: EntityId) {
        if let Some(entity) = self.entities.get_mut(&parent) {
            if let Some(index) = entity.children.iter().position(|c| *c == child) {
                entity.children.remove(index);
            }
        }
        if let Some(entity) = self.entities.get_mut(&child) {
            entity.parent = None;
        }
    }

    fn is_ancestor_or_self(&self, ancestor: EntityId, mut id: EntityId) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.entities.get(&id).and_then(Entity::parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    // ------------------------------------------------------------------
    // Filters and groups
    // ------------------------------------------------------------------

    /// Entities carrying every listed component type.
    ///
    /// The filter is created on first use and memoized under its sorted key,
    /// so `["A", "B"]` and `["B", "A"]` share one instance.
    pub fn filter_by_components<S: AsRef<str>>(&mut self, type_names: &[S]) -> &EntityFilter {
        let entities = &self.entities;
        self.filters
            .entry(EntityFilter::key_for(type_names))
            .or_insert_with(|| {
                let mut filter = EntityFilter::new(type_names);
                for entity in entities.values() {
                    filter.refresh(entity);
                }
                log::debug!("Created filter '{}' with {} entities", filter.key(), filter.len());
                filter
            })
    }

    /// Previously created filter, if any
    pub fn filter<S: AsRef<str>>(&self, type_names: &[S]) -> Option<&EntityFilter> {
        self.filters.get(&EntityFilter::key_for(type_names))
    }

    /// Number of memoized filters
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Members of a group, creating the group if absent
    pub fn filter_by_group_name(&mut self, name: &str) -> &EntityGroup {
        self.group_entry(name)
    }

    /// Existing group, if any
    pub fn group(&self, name: &str) -> Option<&EntityGroup> {
        self.groups.get(name)
    }

    /// Add an entity to a group; returns false if it was already a member
    /// or the entity is unknown
    pub fn add_entity_to_group(&mut self, id: EntityId, name: &str) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        entity.groups.insert(name.to_string());
        self.group_entry(name).add(id)
    }

    /// Remove an entity from a group; returns false if it was not a member
    pub fn remove_entity_from_group(&mut self, id: EntityId, name: &str) -> bool {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.groups.remove(name);
        }
        self.group_entry(name).remove(id)
    }

    /// Empty a group; returns the number of entities removed
    pub fn remove_all_entities_from_group(&mut self, name: &str) -> usize {
        let members = self.group_entry(name).take_all();
        for id in &members {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.groups.remove(name);
            }
        }
        members.len()
    }

    fn group_entry(&mut self, name: &str) -> &mut EntityGroup {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| EntityGroup::new(name))
    }

    // ------------------------------------------------------------------
    // Pointer events
    // ------------------------------------------------------------------

    /// Subscribe a handler to one pointer event type on an entity
    pub fn on(
        &mut self,
        id: EntityId,
        event_type: PointerEventType,
        handler: impl PointerHandler + 'static,
    ) -> SceneResult<HandlerKey> {
        if !self.contains(id) {
            return Err(SceneError::EntityNotFound(id));
        }
        Ok(self.events.register(id, event_type, Box::new(handler)))
    }

    /// Unsubscribe a handler; returns false if it was already gone
    pub fn off(&mut self, key: HandlerKey) -> bool {
        self.events.unregister(key)
    }

    /// Deliver an event to its target's handlers; returns the number invoked
    pub fn dispatch_pointer_event(&mut self, event: &PointerEvent, device: &mut MouseDevice) -> usize {
        self.events.dispatch(event, device)
    }

    /// Handler registry
    pub fn events(&self) -> &EventSystem {
        &self.events
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("next_id", &self.next_id)
            .field("entities", &self.entities.len())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .field("groups", &self.groups.keys().collect::<Vec<_>>())
            .field("events", &self.events)
            .finish()
    }
}

/// Mutable handle to one registered entity, for chained scene building
pub struct EntityMut<'a> {
    manager: &'a mut EntityManager,
    id: EntityId,
}

impl EntityMut<'_> {
    /// Entity id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Rename the entity
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        if let Some(entity) = self.manager.entities.get_mut(&self.id) {
            entity.set_name(name);
        }
        self
    }

    /// Attach a component, dropping any component it replaces
    pub fn with<C: Component>(&mut self, component: C) -> SceneResult<&mut Self> {
        self.manager.add_component(self.id, component)?;
        Ok(self)
    }

    /// Attach a component and return the one it replaced
    pub fn add_component<C: Component>(&mut self, component: C) -> SceneResult<Option<Box<dyn Component>>> {
        self.manager.add_component(self.id, component)
    }

    /// Detach a component by type tag
    pub fn remove_component(&mut self, type_name: &str) -> Option<Box<dyn Component>> {
        self.manager.remove_component(self.id, type_name)
    }

    /// Typed component lookup
    pub fn get_component<T: ComponentType>(&self) -> Option<&T> {
        self.manager.get_component::<T>(self.id)
    }

    /// Make `child` the last child of this entity
    pub fn add_child(&mut self, child: EntityId) -> SceneResult<&mut Self> {
        self.manager.add_child(self.id, child)?;
        Ok(self)
    }

    /// Add this entity to a group
    pub fn add_to_group(&mut self, name: &str) -> &mut Self {
        self.manager.add_entity_to_group(self.id, name);
        self
    }

    /// Attach this entity under `parent`
    pub fn set_parent(&mut self, parent: EntityId) -> SceneResult<&mut Self> {
        self.manager.add_child(parent, self.id)?;
        Ok(self)
    }

    /// Manager the entity belongs to
    pub fn manager(&mut self) -> &mut EntityManager {
        self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::ComponentBase;

    #[derive(Debug, Default)]
    struct Tag {
        base: ComponentBase,
        label: &'static str,
    }

    impl Component for Tag {
        fn type_name(&self) -> &'static str {
            Self::TYPE_NAME
        }
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
    }

    impl ComponentType for Tag {
        const TYPE_NAME: &'static str = "Tag";
    }

    #[derive(Debug, Default)]
    struct Other {
        base: ComponentBase,
    }

    impl Component for Other {
        fn type_name(&self) -> &'static str {
            Self::TYPE_NAME
        }
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
    }

    impl ComponentType for Other {
        const TYPE_NAME: &'static str = "Other";
    }

    #[derive(Debug, Default)]
    struct Untagged {
        base: ComponentBase,
    }

    impl Component for Untagged {
        fn type_name(&self) -> &'static str {
            ""
        }
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
    }

    #[test]
    fn test_ids_are_monotonic_and_not_reused() {
        let mut manager = EntityManager::new();
        let a = manager.create_entity("a");
        let b = manager.create_entity("b");
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);

        assert!(manager.remove_entity(b));
        let c = manager.create_entity("c");
        assert_eq!(c.raw(), 3);
    }

    #[test]
    fn test_untagged_component_is_rejected() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity("e");
        let result = manager.add_component(id, Untagged::default());
        assert_eq!(result.unwrap_err(), SceneError::UndefinedComponentType);
    }

    #[test]
    fn test_add_to_unknown_entity_fails() {
        let mut manager = EntityManager::new();
        let missing = EntityId::from_raw(42);
        let result = manager.add_component(missing, Tag::default());
        assert_eq!(result.unwrap_err(), SceneError::EntityNotFound(missing));
    }

    #[test]
    fn test_replacement_uninitializes_old_component() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity("e");
        manager.add_component(id, Tag { label: "first", ..Tag::default() }).unwrap();
        assert_eq!(manager.get_component::<Tag>(id).unwrap().entity(), Some(id));

        let replaced = manager
            .add_component(id, Tag { label: "second", ..Tag::default() })
            .unwrap()
            .expect("old component returned");
        assert_eq!(replaced.entity(), None);
        assert_eq!(manager.get_component::<Tag>(id).unwrap().label, "second");
    }

    #[test]
    fn test_take_component_returns_concrete_value() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity("e");
        manager.add_component(id, Tag { label: "x", ..Tag::default() }).unwrap();

        let tag = manager.take_component::<Tag>(id).unwrap();
        assert_eq!(tag.label, "x");
        assert_eq!(tag.entity(), None);
        assert!(!manager.has_component(id, "Tag"));
        assert!(manager.take_component::<Tag>(id).is_none());
    }

    #[test]
    fn test_filter_is_order_independent_and_memoized() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity("e");
        manager.add_component(id, Tag::default()).unwrap();
        manager.add_component(id, Other::default()).unwrap();

        let key_ab = manager.filter_by_components(&["Tag", "Other"]).key().to_string();
        let key_ba = manager.filter_by_components(&["Other", "Tag"]).key().to_string();
        assert_eq!(key_ab, key_ba);
        assert_eq!(manager.filter_count(), 1);
        assert!(manager.filter(&["Tag", "Other"]).unwrap().contains(id));
    }

    #[test]
    fn test_filter_tracks_add_and_remove() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity("e");
        assert!(manager.filter_by_components(&["Tag"]).is_empty());

        manager.add_component(id, Tag::default()).unwrap();
        assert!(manager.filter(&["Tag"]).unwrap().contains(id));

        manager.remove_component(id, "Tag");
        assert!(!manager.filter(&["Tag"]).unwrap().contains(id));
    }

    #[test]
    fn test_remove_entity_purges_filters_groups_and_children() {
        let mut manager = EntityManager::new();
        let parent = manager.create_entity("parent");
        let child = manager.create_child(parent, "child").unwrap();
        manager.add_component(parent, Tag::default()).unwrap();
        manager.add_component(child, Tag::default()).unwrap();
        manager.filter_by_components(&["Tag"]);
        manager.add_entity_to_group(parent, "scene");
        manager.add_entity_to_group(child, "ui");

        assert!(manager.remove_entity(parent));
        assert!(!manager.remove_entity(parent));
        assert!(manager.is_empty());
        assert!(manager.filter(&["Tag"]).unwrap().is_empty());
        assert!(manager.group("scene").unwrap().is_empty());
        assert!(manager.group("ui").unwrap().is_empty());
    }

    #[test]
    fn test_remove_child_removes_exactly_one() {
        let mut manager = EntityManager::new();
        let parent = manager.create_entity("parent");
        let a = manager.create_child(parent, "a").unwrap();
        let b = manager.create_child(parent, "b").unwrap();
        let c = manager.create_child(parent, "c").unwrap();

        assert!(manager.remove_child(parent, b));
        assert_eq!(manager.entity(parent).unwrap().children(), &[a, c]);
        assert_eq!(manager.entity(b).unwrap().parent(), None);
        assert!(!manager.remove_child(parent, b));
    }

    #[test]
    fn test_reparenting_detaches_from_previous_parent() {
        let mut manager = EntityManager::new();
        let first = manager.create_entity("first");
        let second = manager.create_entity("second");
        let child = manager.create_child(first, "child").unwrap();

        manager.add_child(second, child).unwrap();
        assert!(manager.entity(first).unwrap().children().is_empty());
        assert_eq!(manager.entity(second).unwrap().children(), &[child]);
        assert_eq!(manager.entity(child).unwrap().parent(), Some(second));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut manager = EntityManager::new();
        let root = manager.create_entity("root");
        let child = manager.create_child(root, "child").unwrap();

        assert_eq!(
            manager.add_child(child, root),
            Err(SceneError::HierarchyCycle { parent: child, child: root })
        );
        assert_eq!(
            manager.add_child(root, root),
            Err(SceneError::HierarchyCycle { parent: root, child: root })
        );
    }

    #[test]
    fn test_group_membership() {
        let mut manager = EntityManager::new();
        let a = manager.create_entity("a");
        let b = manager.create_entity("b");

        assert!(manager.filter_by_group_name("scene").is_empty());
        assert!(manager.add_entity_to_group(a, "scene"));
        assert!(!manager.add_entity_to_group(a, "scene"));
        assert!(manager.add_entity_to_group(b, "scene"));
        assert!(manager.add_entity_to_group(a, "ui"));
        assert_eq!(manager.entity(a).unwrap().groups().collect::<Vec<_>>(), vec!["scene", "ui"]);

        assert!(manager.remove_entity_from_group(b, "scene"));
        assert!(!manager.remove_entity_from_group(b, "scene"));
        assert_eq!(manager.remove_all_entities_from_group("scene"), 1);
        assert_eq!(manager.entity(a).unwrap().groups().collect::<Vec<_>>(), vec!["ui"]);
    }

    #[test]
    fn test_handlers_are_dropped_with_entity() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity("e");
        let key = manager
            .on(id, PointerEventType::MouseDown, |_: &PointerEvent, _: &mut MouseDevice| {})
            .unwrap();
        assert_eq!(manager.events().handler_count(id, PointerEventType::MouseDown), 1);

        manager.remove_entity(id);
        assert_eq!(manager.events().handler_count(id, PointerEventType::MouseDown), 0);
        assert!(!manager.off(key));
    }

    #[test]
    fn test_spawn_builder() {
        let mut manager = EntityManager::new();
        let parent = manager.create_entity("parent");
        let id = manager
            .spawn("built")
            .with(Tag::default())
            .unwrap()
            .set_parent(parent)
            .unwrap()
            .add_to_group("scene")
            .id();

        assert!(manager.has_component(id, "Tag"));
        assert_eq!(manager.entity(id).unwrap().parent(), Some(parent));
        assert!(manager.group("scene").unwrap().contains(id));
    }
}
