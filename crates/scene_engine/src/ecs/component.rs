//! Component trait and shared component state

use super::EntityId;
use std::any::Any;
use std::fmt;

/// Upcast helper so boxed components can be downcast to their concrete type
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Convert an owned box into `Box<dyn Any>`
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// State every component carries: a dirty flag and the owning entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentBase {
    /// Cached derived state is stale
    pub dirty: bool,
    /// Owning entity, set while attached
    pub entity: Option<EntityId>,
}

impl ComponentBase {
    /// Base for a freshly created component (dirty, detached)
    pub fn new() -> Self {
        Self { dirty: true, entity: None }
    }
}

/// A typed capability unit attached to at most one entity per type tag.
///
/// The type tag returned by [`Component::type_name`] is the key under which
/// the entity stores the component and the name entity filters match on.
pub trait Component: AsAny + fmt::Debug {
    /// Type tag. An empty tag is rejected when the component is attached.
    fn type_name(&self) -> &'static str;

    /// Shared component state
    fn base(&self) -> &ComponentBase;

    /// Shared component state (mutable)
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Called by the manager after the component is attached to `entity`
    fn init(&mut self, entity: EntityId) {
        self.base_mut().entity = Some(entity);
    }

    /// Called by the manager when the component is detached or replaced
    fn uninitialize(&mut self, _entity: EntityId) {
        self.base_mut().entity = None;
    }

    /// Whether cached derived state is stale
    fn is_dirty(&self) -> bool {
        self.base().dirty
    }

    /// Owning entity, if attached
    fn entity(&self) -> Option<EntityId> {
        self.base().entity
    }
}

/// Components with a statically known type tag, usable for typed lookups.
pub trait ComponentType: Component + Sized {
    /// Static type tag, equal to what `type_name()` returns
    const TYPE_NAME: &'static str;
}

/// Downcast a component trait object to a concrete type
pub fn downcast_ref<T: ComponentType>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

/// Downcast a mutable component trait object to a concrete type
pub fn downcast_mut<T: ComponentType>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

/// Downcast an owned component box
pub fn downcast_box<T: ComponentType>(component: Box<dyn Component>) -> Option<Box<T>> {
    component.into_any().downcast::<T>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Marker {
        base: ComponentBase,
    }

    impl Component for Marker {
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

    impl ComponentType for Marker {
        const TYPE_NAME: &'static str = "Marker";
    }

    #[test]
    fn test_init_sets_and_uninitialize_clears_owner() {
        let mut marker = Marker::default();
        marker.init(EntityId::from_raw(7));
        assert_eq!(marker.entity(), Some(EntityId::from_raw(7)));

        marker.uninitialize(EntityId::from_raw(7));
        assert_eq!(marker.entity(), None);
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let boxed: Box<dyn Component> = Box::new(Marker::default());
        assert!(downcast_ref::<Marker>(boxed.as_ref()).is_some());
    }
}
