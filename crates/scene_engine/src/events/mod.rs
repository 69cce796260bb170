//! Entity event system
//!
//! Typed publish/subscribe for pointer events delivered to entities:
//! - Handlers register per (entity, event type) and get a [`HandlerKey`] back
//! - Dispatch runs every handler registered for the target entity, in
//!   registration order
//! - Handlers stop delivery to further entities through the [`MouseDevice`]
//!   propagation flag

use crate::ecs::EntityId;
use crate::foundation::math::{Vec2, Vec3};
use crate::input::{MouseButton, MouseDevice, MouseEventKind};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Pointer event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventType {
    /// Entity became the top of the hit list
    MouseEnter,
    /// Entity stopped being the top of the hit list
    MouseLeave,
    /// Cursor moved over the entity
    MouseMove,
    /// Button pressed over the entity
    MouseDown,
    /// Button released over the entity
    MouseUp,
    /// Wheel scrolled over the entity
    MouseScroll,
}

impl PointerEventType {
    /// Event name
    pub fn name(self) -> &'static str {
        match self {
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::MouseMove => "mousemove",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseScroll => "mousescroll",
        }
    }
}

impl From<MouseEventKind> for PointerEventType {
    fn from(kind: MouseEventKind) -> Self {
        match kind {
            MouseEventKind::Move => Self::MouseMove,
            MouseEventKind::Down => Self::MouseDown,
            MouseEventKind::Up => Self::MouseUp,
            MouseEventKind::Scroll => Self::MouseScroll,
        }
    }
}

/// Where the picking ray hit the entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerHit {
    /// Distance from the ray origin to the hit point
    pub depth: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Event delivered to an entity's handlers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Type of event
    pub event_type: PointerEventType,
    /// Entity the event is delivered to
    pub target: EntityId,
    /// Viewport-relative cursor position
    pub screen_position: Vec2,
    /// Button for press/release events
    pub button: Option<MouseButton>,
    /// Wheel delta for scroll events
    pub scroll_delta: f32,
    /// Hit information; `None` for leave events
    pub hit: Option<PointerHit>,
}

/// Pointer event handler
pub trait PointerHandler {
    /// Handle an event; call `device.stop_event_propagation()` to keep it
    /// from reaching entities further down the hit list
    fn on_event(&mut self, event: &PointerEvent, device: &mut MouseDevice);
}

impl<F> PointerHandler for F
where
    F: FnMut(&PointerEvent, &mut MouseDevice),
{
    fn on_event(&mut self, event: &PointerEvent, device: &mut MouseDevice) {
        self(event, device);
    }
}

slotmap::new_key_type! {
    /// Registration handle returned by [`EventSystem::register`]
    pub struct HandlerKey;
}

struct Registration {
    entity: EntityId,
    event_type: PointerEventType,
    handler: Box<dyn PointerHandler>,
}

/// Handler registry keyed by target entity and event type
#[derive(Default)]
pub struct EventSystem {
    handlers: SlotMap<HandlerKey, Registration>,
    by_target: HashMap<(EntityId, PointerEventType), Vec<HandlerKey>>,
}

impl EventSystem {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event type on one entity
    pub fn register(
        &mut self,
        entity: EntityId,
        event_type: PointerEventType,
        handler: Box<dyn PointerHandler>,
    ) -> HandlerKey {
        let key = self.handlers.insert(Registration { entity, event_type, handler });
        self.by_target.entry((entity, event_type)).or_default().push(key);
        key
    }

    /// Remove a handler; returns false if it was already gone
    pub fn unregister(&mut self, key: HandlerKey) -> bool {
        let Some(registration) = self.handlers.remove(key) else {
            return false;
        };
        let target = (registration.entity, registration.event_type);
        if let Some(keys) = self.by_target.get_mut(&target) {
            keys.retain(|k| *k != key);
            if keys.is_empty() {
                self.by_target.remove(&target);
            }
        }
        true
    }

    /// Remove every handler registered on `entity`
    pub fn unregister_entity(&mut self, entity: EntityId) {
        self.by_target.retain(|(target, _), _| *target != entity);
        self.handlers.retain(|_, registration| registration.entity != entity);
    }

    /// Number of handlers registered for an entity and event type
    pub fn handler_count(&self, entity: EntityId, event_type: PointerEventType) -> usize {
        self.by_target.get(&(entity, event_type)).map_or(0, Vec::len)
    }

    /// Deliver an event to the handlers of `event.target`
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&mut self, event: &PointerEvent, device: &mut MouseDevice) -> usize {
        let Some(keys) = self.by_target.get(&(event.target, event.event_type)) else {
            return 0;
        };
        let keys = keys.clone();

        let mut invoked = 0;
        for key in keys {
            if let Some(registration) = self.handlers.get_mut(key) {
                registration.handler.on_event(event, device);
                invoked += 1;
            }
        }
        invoked
    }

    /// Drop all handlers
    pub fn clear(&mut self) {
        self.handlers.clear();
        self.by_target.clear();
    }
}

impl std::fmt::Debug for EventSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSystem")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event(target: EntityId, event_type: PointerEventType) -> PointerEvent {
        PointerEvent {
            event_type,
            target,
            screen_position: Vec2::zeros(),
            button: None,
            scroll_delta: 0.0,
            hit: None,
        }
    }

    #[test]
    fn test_dispatch_reaches_only_matching_handlers() {
        let mut system = EventSystem::new();
        let mut device = MouseDevice::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = EntityId::from_raw(1);
        let b = EntityId::from_raw(2);

        let sink = Rc::clone(&log);
        system.register(a, PointerEventType::MouseDown, Box::new(move |e: &PointerEvent, _: &mut MouseDevice| {
            sink.borrow_mut().push((e.target, e.event_type));
        }));
        let sink = Rc::clone(&log);
        system.register(b, PointerEventType::MouseDown, Box::new(move |e: &PointerEvent, _: &mut MouseDevice| {
            sink.borrow_mut().push((e.target, e.event_type));
        }));

        assert_eq!(system.dispatch(&event(a, PointerEventType::MouseDown), &mut device), 1);
        assert_eq!(system.dispatch(&event(a, PointerEventType::MouseUp), &mut device), 0);
        assert_eq!(*log.borrow(), vec![(a, PointerEventType::MouseDown)]);
    }

    #[test]
    fn test_unregister() {
        let mut system = EventSystem::new();
        let mut device = MouseDevice::default();
        let a = EntityId::from_raw(1);

        let key = system.register(a, PointerEventType::MouseMove, Box::new(|_: &PointerEvent, _: &mut MouseDevice| {}));
        assert_eq!(system.handler_count(a, PointerEventType::MouseMove), 1);
        assert!(system.unregister(key));
        assert!(!system.unregister(key));
        assert_eq!(system.dispatch(&event(a, PointerEventType::MouseMove), &mut device), 0);
    }

    #[test]
    fn test_unregister_entity_drops_all_its_handlers() {
        let mut system = EventSystem::new();
        let a = EntityId::from_raw(1);
        let b = EntityId::from_raw(2);
        system.register(a, PointerEventType::MouseEnter, Box::new(|_: &PointerEvent, _: &mut MouseDevice| {}));
        system.register(a, PointerEventType::MouseLeave, Box::new(|_: &PointerEvent, _: &mut MouseDevice| {}));
        system.register(b, PointerEventType::MouseEnter, Box::new(|_: &PointerEvent, _: &mut MouseDevice| {}));

        system.unregister_entity(a);

        assert_eq!(system.handler_count(a, PointerEventType::MouseEnter), 0);
        assert_eq!(system.handler_count(a, PointerEventType::MouseLeave), 0);
        assert_eq!(system.handler_count(b, PointerEventType::MouseEnter), 1);
    }

    #[test]
    fn test_handler_can_stop_propagation() {
        let mut system = EventSystem::new();
        let mut device = MouseDevice::default();
        let a = EntityId::from_raw(1);
        system.register(a, PointerEventType::MouseDown, Box::new(|_: &PointerEvent, d: &mut MouseDevice| {
            d.stop_event_propagation();
        }));

        system.dispatch(&event(a, PointerEventType::MouseDown), &mut device);
        assert!(!device.is_event_propagation_enabled());
    }
}
