//! # Scene Engine
//!
//! The scene model of a 3D scene editor: an entity/component graph with
//! lazily cached hierarchical transforms, plus ray-based mouse picking.
//!
//! ## Features
//!
//! - **Entity/Component graph**: arena-owned entities, one component per type tag
//! - **Queries**: memoized component filters and named entity groups
//! - **Transforms**: dirty-flag propagation and cached world matrices
//! - **Picking**: camera rays, slab ray/box tests and a hover state machine
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! let mut scene = EntityManager::new();
//! scene
//!     .spawn("camera")
//!     .with(Transform::from_position(Vec3::new(0.0, 0.0, 5.0)))?
//!     .with(Camera::perspective(60.0, 0.1, 100.0, ViewRect::new(0.0, 0.0, 800.0, 600.0)).with_render_group("scene"))?;
//! let cube = scene
//!     .spawn("cube")
//!     .with(Transform::identity())?
//!     .with(ColliderBox::unit())?
//!     .add_to_group("scene")
//!     .id();
//!
//! let mut device = MouseDevice::new(600.0);
//! let mut picking = PickingController::new(PickingConfig::default());
//! device.cursor_moved(400.0, 300.0);
//! picking.process_pending(&mut scene, &mut device);
//! assert_eq!(picking.hovered(), Some(cube));
//! # Ok::<(), SceneError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod input;
pub mod physics;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, EditorConfig, HitOrder, PickingConfig},
        ecs::{
            components::{Anchor, Bounds, Camera, ColliderBox, Dimensions, Projection, Transform, ViewRect},
            systems::{HitRecord, PickingController},
            Component, ComponentBase, ComponentType, Entity, EntityFilter, EntityGroup, EntityId, EntityManager,
            EntityMut, SceneError, SceneResult,
        },
        events::{HandlerKey, PointerEvent, PointerEventType, PointerHandler},
        foundation::math::{Mat4, Quat, Vec2, Vec3},
        input::{MouseButton, MouseButtons, MouseDevice, MouseEvent, MouseEventKind},
        physics::{Ray, Triangle, AABB},
    };
}
