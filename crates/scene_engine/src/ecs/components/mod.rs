//! Built-in components

pub mod bounds;
pub mod camera;
pub mod collider;
pub mod dimensions;
pub mod transform;

pub use bounds::Bounds;
pub use camera::{Camera, Projection, ViewRect};
pub use collider::ColliderBox;
pub use dimensions::{Anchor, Dimensions};
pub use transform::Transform;
