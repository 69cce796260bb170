//! Camera component: view/projection matrices and picking rays
//!
//! The camera looks down its entity's local -Z axis with +Y up. Its view
//! matrix is the inverse of the entity's world matrix and is refreshed by
//! [`Camera::update_view`] before every use. Projection matrices follow the
//! OpenGL clip convention (NDC depth in `[-1, 1]`), so unprojecting depth 0
//! and depth 1 means NDC z = -1 and z = +1.

use crate::ecs::component::{Component, ComponentBase, ComponentType};
use crate::ecs::{EntityId, EntityManager};
use crate::foundation::math::{transform_point, utils, Mat4, Vec2, Vec3};
use crate::physics::Ray;

/// Viewport rectangle in pixels, origin at the bottom-left of the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl ViewRect {
    /// Create a rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Width over height; 1.0 for degenerate rectangles
    pub fn aspect(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Whether the pixel lies inside the rectangle
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective frustum
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
        /// Near plane distance
        near: f32,
        /// Far plane distance
        far: f32,
    },
    /// Orthographic box; the horizontal extent follows the view rect aspect
    Orthographic {
        /// Half of the visible height in world units
        half_height: f32,
        /// Near plane distance
        near: f32,
        /// Far plane distance
        far: f32,
    },
}

impl Projection {
    /// Projection matrix for the given aspect ratio
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        let mut m = Mat4::zeros();
        match *self {
            Self::Perspective { fov_y, near, far } => {
                let f = 1.0 / (fov_y * 0.5).tan();
                m[(0, 0)] = f / aspect;
                m[(1, 1)] = f;
                m[(2, 2)] = (far + near) / (near - far);
                m[(2, 3)] = 2.0 * far * near / (near - far);
                m[(3, 2)] = -1.0;
            }
            Self::Orthographic { half_height, near, far } => {
                let half_width = half_height * aspect;
                m[(0, 0)] = 1.0 / half_width;
                m[(1, 1)] = 1.0 / half_height;
                m[(2, 2)] = -2.0 / (far - near);
                m[(2, 3)] = -(far + near) / (far - near);
                m[(3, 3)] = 1.0;
            }
        }
        m
    }
}

/// Camera component
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    base: ComponentBase,
    projection: Projection,
    view_rect: ViewRect,
    enabled: bool,
    render_groups: Vec<String>,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    fn with_projection(projection: Projection, view_rect: ViewRect) -> Self {
        Self {
            base: ComponentBase::new(),
            projection,
            view_rect,
            enabled: true,
            render_groups: Vec::new(),
            view_matrix: Mat4::identity(),
            projection_matrix: projection.matrix(view_rect.aspect()),
        }
    }

    /// Perspective camera; `fov_degrees` is the vertical field of view
    pub fn perspective(fov_degrees: f32, near: f32, far: f32, view_rect: ViewRect) -> Self {
        let projection = Projection::Perspective {
            fov_y: utils::deg_to_rad(fov_degrees),
            near,
            far,
        };
        Self::with_projection(projection, view_rect)
    }

    /// Orthographic camera showing `2 * half_height` world units vertically
    pub fn orthographic(half_height: f32, near: f32, far: f32, view_rect: ViewRect) -> Self {
        Self::with_projection(Projection::Orthographic { half_height, near, far }, view_rect)
    }

    /// Builder: render (and pick) the named group
    pub fn with_render_group(mut self, group: impl Into<String>) -> Self {
        self.add_render_group(group);
        self
    }

    /// Add a render group if not already present
    pub fn add_render_group(&mut self, group: impl Into<String>) {
        let group = group.into();
        if !self.render_groups.contains(&group) {
            self.render_groups.push(group);
        }
    }

    /// Groups this camera renders, in insertion order
    pub fn render_groups(&self) -> &[String] {
        &self.render_groups
    }

    /// Whether the camera takes part in rendering and picking
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the camera
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Viewport rectangle in pixels
    pub fn view_rect(&self) -> ViewRect {
        self.view_rect
    }

    /// Change the viewport; the projection follows the new aspect ratio
    pub fn set_view_rect(&mut self, view_rect: ViewRect) {
        self.view_rect = view_rect;
        self.projection_matrix = self.projection.matrix(view_rect.aspect());
    }

    /// Projection model
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Replace the projection model
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.projection_matrix = projection.matrix(self.view_rect.aspect());
    }

    /// World to view space
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// View to clip space
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// `projection * view`
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Refresh the view matrix from the camera entity's world matrix.
    ///
    /// Returns false, keeping the previous view, if the matrix is singular.
    pub fn update_view(&mut self, world: &Mat4) -> bool {
        match world.try_inverse() {
            Some(view) => {
                self.view_matrix = view;
                true
            }
            None => false,
        }
    }

    /// Map a viewport pixel (bottom-left origin) to normalized device coordinates
    pub fn screen_to_ndc(&self, x: f32, y: f32) -> Vec2 {
        let rect = &self.view_rect;
        Vec2::new(
            (x - rect.x) / rect.width * 2.0 - 1.0,
            (y - rect.y) / rect.height * 2.0 - 1.0,
        )
    }

    /// World-space ray through a viewport pixel.
    ///
    /// Unprojects the pixel at depth 0 and depth 1 through the inverse of
    /// `projection * view`; the ray starts at the near point and points
    /// towards the far point. `None` if the matrix cannot be inverted.
    pub fn create_picking_ray(&self, x: f32, y: f32) -> Option<Ray> {
        let inverse = self.view_projection().try_inverse()?;
        let ndc = self.screen_to_ndc(x, y);

        let near = transform_point(&inverse, &Vec3::new(ndc.x, ndc.y, -1.0));
        let far = transform_point(&inverse, &Vec3::new(ndc.x, ndc.y, 1.0));
        Some(Ray::between(near, far))
    }
}

impl Component for Camera {
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

impl ComponentType for Camera {
    const TYPE_NAME: &'static str = "Camera";
}

impl EntityManager {
    /// Picking ray of the camera on `id` through a viewport pixel.
    ///
    /// Refreshes the camera's view matrix from the entity's world matrix
    /// first (identity when the entity has no transform).
    pub fn camera_picking_ray(&mut self, id: EntityId, x: f32, y: f32) -> Option<Ray> {
        let world = self.world_matrix(id).unwrap_or_else(Mat4::identity);
        let camera = self.get_component_mut::<Camera>(id)?;
        if !camera.update_view(&world) {
            log::warn!("Camera on entity {} has a singular world matrix", id);
            return None;
        }
        camera.create_picking_ray(x, y)
    }
}
