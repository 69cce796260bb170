//! World-space bounding boxes derived from dimensions and transforms

use super::{Dimensions, Transform};
use crate::ecs::component::{Component, ComponentBase, ComponentType};
use crate::ecs::{EntityId, EntityManager, SceneError, SceneResult};
use crate::foundation::math::transform_point;
use crate::physics::AABB;

/// Local box of an entity plus its last computed world box
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    base: ComponentBase,
    local_box: AABB,
    world_box: AABB,
}

impl Bounds {
    /// Bounds that derive their local box from the entity's [`Dimensions`]
    pub fn new() -> Self {
        Self {
            base: ComponentBase::new(),
            local_box: AABB::empty(),
            world_box: AABB::empty(),
        }
    }

    /// Local-space box; empty until first computed
    pub fn local_box(&self) -> &AABB {
        &self.local_box
    }

    /// World box from the last [`EntityManager::world_bounding_box`] call
    pub fn world_box(&self) -> &AABB {
        &self.world_box
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Bounds {
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

impl ComponentType for Bounds {
    const TYPE_NAME: &'static str = "Bounds";
}

impl EntityManager {
    /// World-space AABB of the entity's bounds.
    ///
    /// A dirty local box is rebuilt from [`Dimensions`], which fails if the
    /// entity lacks a transform or dimensions. The eight local corners are
    /// then transformed by the anchored world matrix into an empty box.
    pub fn world_bounding_box(&mut self, id: EntityId) -> SceneResult<AABB> {
        let entity = self.entity(id).ok_or(SceneError::EntityNotFound(id))?;
        let bounds = entity.get_component::<Bounds>().ok_or(SceneError::MissingComponent {
            entity: id,
            component: Bounds::TYPE_NAME,
        })?;
        if !entity.has_component(Transform::TYPE_NAME) {
            return Err(SceneError::MissingComponent { entity: id, component: Transform::TYPE_NAME });
        }

        if bounds.is_dirty() {
            let half = entity
                .get_component::<Dimensions>()
                .ok_or(SceneError::MissingComponent { entity: id, component: Dimensions::TYPE_NAME })?
                .half_size();
            let bounds = self.bounds_mut(id)?;
            bounds.local_box = AABB::new(-half, half);
            bounds.base.dirty = false;
            log::trace!("Rebuilt local bounds of entity {}", id);
        }

        let matrix = self
            .anchored_world_matrix(id)
            .ok_or(SceneError::MissingComponent { entity: id, component: Transform::TYPE_NAME })?;
        let bounds = self.bounds_mut(id)?;
        let mut world_box = AABB::empty();
        for corner in &bounds.local_box.corners() {
            world_box.expand_by_point(&transform_point(&matrix, corner));
        }
        bounds.world_box = world_box;
        Ok(world_box)
    }

    pub(crate) fn mark_bounds_dirty(&mut self, id: EntityId) {
        if let Some(bounds) = self.get_component_mut::<Bounds>(id) {
            bounds.base.dirty = true;
        }
    }

    fn bounds_mut(&mut self, id: EntityId) -> SceneResult<&mut Bounds> {
        self.get_component_mut::<Bounds>(id).ok_or(SceneError::MissingComponent {
            entity: id,
            component: Bounds::TYPE_NAME,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Anchor;
    use crate::foundation::math::{constants::HALF_PI, Vec3};
    use approx::assert_relative_eq;

    fn boxed_entity(manager: &mut EntityManager, transform: Transform, dims: Dimensions) -> EntityId {
        let id = manager.create_entity("box");
        manager.add_component(id, transform).unwrap();
        manager.add_component(id, dims).unwrap();
        manager.add_component(id, Bounds::new()).unwrap();
        id
    }

    #[test]
    fn test_world_box_follows_transform() {
        let mut manager = EntityManager::new();
        let id = boxed_entity(
            &mut manager,
            Transform::from_position(Vec3::new(10.0, 0.0, 0.0)),
            Dimensions::new(2.0, 4.0, 6.0),
        );

        let world = manager.world_bounding_box(id).unwrap();
        assert_relative_eq!(world.min, Vec3::new(9.0, -2.0, -3.0));
        assert_relative_eq!(world.max, Vec3::new(11.0, 2.0, 3.0));
        assert!(!manager.get_component::<Bounds>(id).unwrap().is_dirty());
    }

    #[test]
    fn test_rotation_swaps_extents() {
        let mut manager = EntityManager::new();
        let id = boxed_entity(&mut manager, Transform::identity(), Dimensions::new(2.0, 4.0, 6.0));
        manager.set_rotation_from_euler(id, 0.0, 0.0, HALF_PI).unwrap();

        let world = manager.world_bounding_box(id).unwrap();
        assert_relative_eq!(world.size(), Vec3::new(4.0, 2.0, 6.0), epsilon = 1e-5);
    }

    #[test]
    fn test_anchor_shifts_box() {
        let mut manager = EntityManager::new();
        let id = boxed_entity(&mut manager, Transform::identity(), Dimensions::new(2.0, 2.0, 2.0));
        manager.add_component(id, Anchor::new(0.0, 0.0, 0.5)).unwrap();

        let world = manager.world_bounding_box(id).unwrap();
        assert_relative_eq!(world.min, Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(world.max, Vec3::new(2.0, 2.0, 1.0));
    }

    #[test]
    fn test_resize_marks_bounds_dirty() {
        let mut manager = EntityManager::new();
        let id = boxed_entity(&mut manager, Transform::identity(), Dimensions::default());
        manager.world_bounding_box(id).unwrap();

        manager.set_dimensions(id, 4.0, 4.0, 4.0).unwrap();
        assert!(manager.get_component::<Bounds>(id).unwrap().is_dirty());
        let world = manager.world_bounding_box(id).unwrap();
        assert_relative_eq!(world.max, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_missing_collaborators_fail() {
        let mut manager = EntityManager::new();
        let id = manager.create_entity("loose");
        manager.add_component(id, Bounds::new()).unwrap();
        assert_eq!(
            manager.world_bounding_box(id),
            Err(SceneError::MissingComponent { entity: id, component: "Transform" })
        );

        manager.add_component(id, Transform::identity()).unwrap();
        assert_eq!(
            manager.world_bounding_box(id),
            Err(SceneError::MissingComponent { entity: id, component: "Dimensions" })
        );
    }
}
