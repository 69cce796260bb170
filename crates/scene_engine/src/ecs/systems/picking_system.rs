//! Mouse picking: per-event hit testing and hover/propagation state machine
//!
//! Orchestrates the picking pipeline for every mouse event:
//! input -> camera ray -> collider hit tests -> hover transition -> dispatch

use crate::config::{HitOrder, PickingConfig};
use crate::ecs::components::{Camera, ColliderBox};
use crate::ecs::{ComponentType, EntityId, EntityManager};
use crate::events::{PointerEvent, PointerEventType, PointerHit};
use crate::foundation::math::{transform_point, Mat4, Vec2, Vec3};
use crate::input::{MouseDevice, MouseEvent};
use crate::physics::Ray;
use std::collections::HashMap;

/// One entity hit by the picking ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    /// Group member the hit is attributed to
    pub entity: EntityId,
    /// Entity whose collider was hit (the member itself or a descendant)
    pub target: EntityId,
    /// Distance from the ray origin to the hit point
    pub depth: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Hit-tests mouse events against collider boxes and drives hover state.
///
/// The hovered entity is the first entry of the sorted hit list. Entering
/// and leaving are reported with `MouseEnter`/`MouseLeave` before the
/// triggering event is dispatched down the hit list.
#[derive(Debug, Default)]
pub struct PickingController {
    config: PickingConfig,
    current_hits: HashMap<EntityId, HitRecord>,
    previous_hits: HashMap<EntityId, HitRecord>,
    sorted_hits: Vec<HitRecord>,
    top_of_stack: Option<EntityId>,
}

impl PickingController {
    /// Create a controller
    pub fn new(config: PickingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current settings
    pub fn config(&self) -> &PickingConfig {
        &self.config
    }

    /// Replace the settings
    pub fn set_config(&mut self, config: PickingConfig) {
        self.config = config;
    }

    /// Entity currently under the cursor
    pub fn hovered(&self) -> Option<EntityId> {
        self.top_of_stack
    }

    /// Sorted hit list of the last processed event
    pub fn hits(&self) -> &[HitRecord] {
        &self.sorted_hits
    }

    /// Hit map kept from the last pass after the current/previous swap
    pub fn previous_hits(&self) -> &HashMap<EntityId, HitRecord> {
        &self.previous_hits
    }

    /// Process every event queued on the device, oldest first
    pub fn process_pending(&mut self, manager: &mut EntityManager, device: &mut MouseDevice) {
        for event in device.drain_events() {
            self.handle_event(manager, device, &event);
        }
    }

    /// Run one picking pass for a mouse event.
    pub fn handle_event(&mut self, manager: &mut EntityManager, device: &mut MouseDevice, event: &MouseEvent) {
        if !self.config.enabled {
            return;
        }
        let screen_position = event.position();

        self.current_hits.clear();
        self.collect_hits(manager, screen_position);
        self.sort_hits();
        log::trace!(
            "{} at ({:.1}, {:.1}): {} hits",
            event.kind.name(),
            screen_position.x,
            screen_position.y,
            self.sorted_hits.len()
        );

        self.update_hover(manager, device, screen_position);

        device.enable_event_propagation();
        let event_type = PointerEventType::from(event.kind);
        for hit in &self.sorted_hits {
            let pointer_event = PointerEvent {
                event_type,
                target: hit.entity,
                screen_position,
                button: event.button,
                scroll_delta: event.scroll_delta,
                hit: Some(PointerHit { depth: hit.depth, point: hit.point }),
            };
            manager.dispatch_pointer_event(&pointer_event, device);
            if !device.is_event_propagation_enabled() {
                log::trace!("{} propagation stopped at entity {}", event_type.name(), hit.entity);
                break;
            }
        }

        std::mem::swap(&mut self.current_hits, &mut self.previous_hits);
    }

    fn collect_hits(&mut self, manager: &mut EntityManager, screen_position: Vec2) {
        let cameras: Vec<EntityId> = manager
            .filter_by_components(&[Camera::TYPE_NAME])
            .entities()
            .collect();

        for camera_id in cameras {
            let Some(camera) = manager.get_component::<Camera>(camera_id) else {
                continue;
            };
            if !camera.is_enabled() || camera.render_groups().is_empty() {
                continue;
            }
            let groups = camera.render_groups().to_vec();
            let Some(ray) = manager.camera_picking_ray(camera_id, screen_position.x, screen_position.y) else {
                continue;
            };

            for group in &groups {
                let members: Vec<EntityId> = manager.filter_by_group_name(group).entities().collect();
                for member in members {
                    self.visit(manager, member, &ray);
                }
            }
        }
    }

    /// Hit-test a group member and its whole subtree in pre-order; every hit
    /// is recorded under the member, later hits overwriting earlier ones.
    fn visit(&mut self, manager: &mut EntityManager, member: EntityId, ray: &Ray) {
        let mut stack = vec![member];
        while let Some(id) = stack.pop() {
            if let Some((depth, point)) = hit_test(manager, id, ray) {
                self.current_hits.insert(member, HitRecord { entity: member, target: id, depth, point });
            }
            if let Some(entity) = manager.entity(id) {
                stack.extend(entity.children().iter().rev().copied());
            }
        }
    }

    fn sort_hits(&mut self) {
        self.sorted_hits.clear();
        self.sorted_hits.extend(self.current_hits.values().copied());
        match self.config.hit_order {
            HitOrder::EntityId => self.sorted_hits.sort_by_key(|hit| hit.entity),
            HitOrder::Depth => self
                .sorted_hits
                .sort_by(|a, b| a.depth.total_cmp(&b.depth).then(a.entity.cmp(&b.entity))),
        }
    }

    fn update_hover(&mut self, manager: &mut EntityManager, device: &mut MouseDevice, screen_position: Vec2) {
        let first = self.sorted_hits.first().copied();
        match first {
            Some(first) if self.top_of_stack != Some(first.entity) => {
                if let Some(previous) = self.top_of_stack {
                    emit_hover(manager, device, PointerEventType::MouseLeave, previous, screen_position, None);
                }
                let hit = PointerHit { depth: first.depth, point: first.point };
                emit_hover(manager, device, PointerEventType::MouseEnter, first.entity, screen_position, Some(hit));
                self.top_of_stack = Some(first.entity);
            }
            None => {
                if let Some(previous) = self.top_of_stack.take() {
                    emit_hover(manager, device, PointerEventType::MouseLeave, previous, screen_position, None);
                }
            }
            Some(_) => {}
        }
    }
}

fn emit_hover(
    manager: &mut EntityManager,
    device: &mut MouseDevice,
    event_type: PointerEventType,
    target: EntityId,
    screen_position: Vec2,
    hit: Option<PointerHit>,
) {
    log::trace!("{} on entity {}", event_type.name(), target);
    let event = PointerEvent {
        event_type,
        target,
        screen_position,
        button: None,
        scroll_delta: 0.0,
        hit,
    };
    manager.dispatch_pointer_event(&event, device);
}

/// Intersect the ray with the entity's collider in collider space.
///
/// Returns the depth and world-space hit point. Entities without a transform
/// are tested with the identity matrix.
fn hit_test(manager: &mut EntityManager, id: EntityId, ray: &Ray) -> Option<(f32, Vec3)> {
    let local_box = *manager.get_component::<ColliderBox>(id)?.bounding_box();
    let world = manager.world_matrix(id).unwrap_or_else(Mat4::identity);
    let Some(inverse) = world.try_inverse() else {
        log::warn!("Skipping collider on entity {}: world matrix is not invertible", id);
        return None;
    };

    let local_point = ray.transformed(&inverse).intersect_box(&local_box)?;
    let point = transform_point(&world, &local_point);
    Some(((point - ray.origin).norm(), point))
}
