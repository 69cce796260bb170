//! Extent and anchor components consumed by bounds and picking math

use crate::ecs::component::{Component, ComponentBase, ComponentType};
use crate::ecs::{EntityId, EntityManager, SceneError, SceneResult};
use crate::foundation::math::Vec3;

/// Size of an entity's box in local units, centered on the local origin.
///
/// Attached extents change through [`EntityManager::set_dimensions`] so the
/// entity's bounds are rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimensions {
    base: ComponentBase,
    width: f32,
    height: f32,
    depth: f32,
}

impl Dimensions {
    /// Create dimensions from the three extents
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            base: ComponentBase::new(),
            width,
            height,
            depth,
        }
    }

    /// Extent along X
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Extent along Y
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Extent along Z
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Extents as a vector
    pub fn size(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }

    /// Half extents as a vector
    pub fn half_size(&self) -> Vec3 {
        self.size() * 0.5
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl Component for Dimensions {
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

impl ComponentType for Dimensions {
    const TYPE_NAME: &'static str = "Dimensions";
}

/// Normalized point of the box that sits at the entity origin.
///
/// Each coordinate is in `[0, 1]` across the matching extent;
/// `(0.5, 0.5, 0.5)` is the box center.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    base: ComponentBase,
    point: Vec3,
}

impl Anchor {
    /// Create an anchor
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            base: ComponentBase::new(),
            point: Vec3::new(x, y, z),
        }
    }

    /// Anchor at the box center
    pub fn center() -> Self {
        Self::new(0.5, 0.5, 0.5)
    }

    /// Anchor point
    pub fn point(&self) -> Vec3 {
        self.point
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::center()
    }
}

impl Component for Anchor {
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

impl ComponentType for Anchor {
    const TYPE_NAME: &'static str = "Anchor";
}

impl EntityManager {
    /// Resize an entity's box; marks its bounds dirty
    pub fn set_dimensions(&mut self, id: EntityId, width: f32, height: f32, depth: f32) -> SceneResult<()> {
        let dimensions = self
            .get_component_mut::<Dimensions>(id)
            .ok_or(SceneError::MissingComponent { entity: id, component: Dimensions::TYPE_NAME })?;
        dimensions.width = width;
        dimensions.height = height;
        dimensions.depth = depth;
        self.mark_bounds_dirty(id);
        Ok(())
    }

    /// Move an entity's anchor; marks its bounds dirty
    pub fn set_anchor(&mut self, id: EntityId, x: f32, y: f32, z: f32) -> SceneResult<()> {
        let anchor = self
            .get_component_mut::<Anchor>(id)
            .ok_or(SceneError::MissingComponent { entity: id, component: Anchor::TYPE_NAME })?;
        anchor.point = Vec3::new(x, y, z);
        self.mark_bounds_dirty(id);
        Ok(())
    }
}
