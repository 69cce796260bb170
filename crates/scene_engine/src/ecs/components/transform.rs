//! Transform component with lazily cached hierarchical world matrices
//!
//! Local position/rotation/scale are the source of truth; the local matrix,
//! world matrix and the world position/rotation/scale decomposed from it are
//! caches. A transform is either clean or dirty:
//! - any local mutation marks it dirty and marks every clean descendant
//!   transform dirty (already dirty subtrees are skipped)
//! - the only dirty -> clean transition is [`EntityManager::world_matrix`]

use super::{Anchor, Dimensions};
use crate::ecs::component::{Component, ComponentBase, ComponentType};
use crate::ecs::{Entity, EntityId, EntityManager, SceneError, SceneResult};
use crate::foundation::math::{compose_trs, decompose_trs, quat_from_euler_xyz, Mat4, Quat, Vec3};

/// Spatial transform relative to the parent entity
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    base: ComponentBase,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,

    local_matrix: Mat4,
    world_matrix: Mat4,
    world_position: Vec3,
    world_rotation: Quat,
    world_scale: Vec3,
    recompute_count: u64,
}

impl Component for Transform {
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

impl ComponentType for Transform {
    const TYPE_NAME: &'static str = "Transform";
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            base: ComponentBase::new(),
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            local_matrix: Mat4::identity(),
            world_matrix: Mat4::identity(),
            world_position: Vec3::zeros(),
            world_rotation: Quat::identity(),
            world_scale: Vec3::new(1.0, 1.0, 1.0),
            recompute_count: 0,
        }
    }
}

impl Transform {
    /// Identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create from position, rotation and scale
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            ..Default::default()
        }
    }

    /// Builder: set the local rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder: set the local scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// How many times the cached matrices were rebuilt
    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Rebuild local and world caches and clear the dirty flag.
    fn recompute(&mut self, parent_world: Option<&Mat4>) {
        self.local_matrix = compose_trs(&self.position, &self.rotation, &self.scale);
        self.world_matrix = match parent_world {
            Some(parent) => parent * self.local_matrix,
            None => self.local_matrix,
        };

        let (position, rotation, scale) = decompose_trs(&self.world_matrix);
        self.world_position = position;
        self.world_rotation = rotation;
        self.world_scale = scale;

        self.recompute_count += 1;
        self.base.dirty = false;
    }
}

impl EntityManager {
    /// World matrix of the entity's transform, recomputing it if dirty.
    ///
    /// When the direct parent has a transform the result is
    /// `parent_world * local`, otherwise it equals the local matrix.
    /// Returns `None` when the entity has no transform.
    ///
    /// Dirty ancestors are collected walking up and rebuilt top-down, so
    /// hierarchy depth does not grow the call stack.
    pub fn world_matrix(&mut self, id: EntityId) -> Option<Mat4> {
        let transform = self.get_component::<Transform>(id)?;
        if !transform.is_dirty() {
            return Some(transform.world_matrix);
        }

        let mut dirty = vec![id];
        let mut parent_world = None;
        let mut current = id;
        while let Some(parent) = self.entities.get(&current).and_then(Entity::parent) {
            let Some(transform) = self.get_component::<Transform>(parent) else {
                break;
            };
            if !transform.is_dirty() {
                parent_world = Some(transform.world_matrix);
                break;
            }
            dirty.push(parent);
            current = parent;
        }

        for node in dirty.into_iter().rev() {
            let transform = self.get_component_mut::<Transform>(node)?;
            transform.recompute(parent_world.as_ref());
            log::trace!("Recomputed world matrix of entity {}", node);
            parent_world = Some(transform.world_matrix);
        }
        parent_world
    }

    /// Local matrix (`T * R * S`), recomputing if dirty
    pub fn local_matrix(&mut self, id: EntityId) -> Option<Mat4> {
        self.world_matrix(id)?;
        self.get_component::<Transform>(id).map(|t| t.local_matrix)
    }

    /// World-space position
    pub fn world_position(&mut self, id: EntityId) -> Option<Vec3> {
        self.world_matrix(id)?;
        self.get_component::<Transform>(id).map(|t| t.world_position)
    }

    /// World-space rotation
    pub fn world_rotation(&mut self, id: EntityId) -> Option<Quat> {
        self.world_matrix(id)?;
        self.get_component::<Transform>(id).map(|t| t.world_rotation)
    }

    /// World-space scale
    pub fn world_scale(&mut self, id: EntityId) -> Option<Vec3> {
        self.world_matrix(id)?;
        self.get_component::<Transform>(id).map(|t| t.world_scale)
    }

    /// Set the local position
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> SceneResult<()> {
        self.transform_mut(id)?.position = position;
        self.mark_transform_dirty(id);
        Ok(())
    }

    /// Move by an offset in parent space
    pub fn translate(&mut self, id: EntityId, offset: Vec3) -> SceneResult<()> {
        self.transform_mut(id)?.position += offset;
        self.mark_transform_dirty(id);
        Ok(())
    }

    /// Set the local scale
    pub fn set_scale(&mut self, id: EntityId, scale: Vec3) -> SceneResult<()> {
        self.transform_mut(id)?.scale = scale;
        self.mark_transform_dirty(id);
        Ok(())
    }

    /// Set the local rotation
    pub fn set_rotation(&mut self, id: EntityId, rotation: Quat) -> SceneResult<()> {
        self.transform_mut(id)?.rotation = rotation;
        self.mark_transform_dirty(id);
        Ok(())
    }

    /// Set the local rotation from XYZ Euler angles in radians
    pub fn set_rotation_from_euler(&mut self, id: EntityId, x: f32, y: f32, z: f32) -> SceneResult<()> {
        self.set_rotation(id, quat_from_euler_xyz(x, y, z))
    }

    /// Rotate the entity so its -Z axis points at `target` (parent space)
    pub fn look_at(&mut self, id: EntityId, target: Vec3, up: Vec3) -> SceneResult<()> {
        let position = self.transform_mut(id)?.position;
        let rotation = Quat::face_towards(&(position - target), &up);
        self.set_rotation(id, rotation)
    }

    /// World matrix shifted so the anchor point sits at the entity origin.
    ///
    /// The box described by [`Dimensions`] is centered on the origin in local
    /// space; an anchor of `(0.5, 0.5, 0.5)` leaves it there, `(0, 0, 0)`
    /// moves the origin to the box's min corner.
    pub fn anchored_world_matrix(&mut self, id: EntityId) -> Option<Mat4> {
        let world = self.world_matrix(id)?;
        let Some(dimensions) = self.get_component::<Dimensions>(id) else {
            return Some(world);
        };
        let anchor = self
            .get_component::<Anchor>(id)
            .map_or_else(|| Vec3::new(0.5, 0.5, 0.5), Anchor::point);

        let offset = (Vec3::new(0.5, 0.5, 0.5) - anchor).component_mul(&dimensions.size());
        Some(world * Mat4::new_translation(&offset))
    }

    /// Mark the entity's transform dirty and propagate to its descendants
    pub(crate) fn mark_transform_dirty(&mut self, id: EntityId) {
        let Some(transform) = self.get_component_mut::<Transform>(id) else {
            return;
        };
        transform.base.dirty = true;
        self.propagate_transform_dirty(id);
    }

    /// Mark clean descendant transforms dirty.
    ///
    /// Walks direct children that carry a transform; a child that is already
    /// dirty is skipped along with its subtree.
    pub(crate) fn propagate_transform_dirty(&mut self, id: EntityId) {
        let mut stack: Vec<EntityId> = match self.entities.get(&id) {
            Some(entity) => entity.children.clone(),
            None => return,
        };

        while let Some(child) = stack.pop() {
            let Some(entity) = self.entities.get_mut(&child) else {
                continue;
            };
            let Some(transform) = entity.get_component_mut::<Transform>() else {
                continue;
            };
            if transform.base.dirty {
                continue;
            }
            transform.base.dirty = true;
            stack.extend(entity.children.iter().copied());
        }
    }

    fn transform_mut(&mut self, id: EntityId) -> SceneResult<&mut Transform> {
        let entity = self.entities.get_mut(&id).ok_or(SceneError::EntityNotFound(id))?;
        entity.get_component_mut::<Transform>().ok_or(SceneError::MissingComponent {
            entity: id,
            component: Transform::TYPE_NAME,
        })
    }
}
