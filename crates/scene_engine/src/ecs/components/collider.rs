//! Box collider used for picking

use crate::ecs::component::{Component, ComponentBase, ComponentType};
use crate::foundation::math::Vec3;
use crate::physics::AABB;

/// Axis-aligned box in the owning entity's local space
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderBox {
    base: ComponentBase,
    bounding_box: AABB,
}

impl ColliderBox {
    /// Collider with an explicit local box
    pub fn new(bounding_box: AABB) -> Self {
        Self {
            base: ComponentBase::new(),
            bounding_box,
        }
    }

    /// Box of the given size centered on the local origin
    pub fn from_size(size: Vec3) -> Self {
        Self::new(AABB::from_center_extents(Vec3::zeros(), size * 0.5))
    }

    /// Unit cube centered on the local origin
    pub fn unit() -> Self {
        Self::from_size(Vec3::new(1.0, 1.0, 1.0))
    }

    /// Local-space box
    pub fn bounding_box(&self) -> &AABB {
        &self.bounding_box
    }
}

impl Default for ColliderBox {
    fn default() -> Self {
        Self::unit()
    }
}

impl Component for ColliderBox {
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

impl ComponentType for ColliderBox {
    const TYPE_NAME: &'static str = "ColliderBox";
}
