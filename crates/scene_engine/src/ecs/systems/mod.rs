//! ECS Systems module

pub mod picking_system;

pub use picking_system::{HitRecord, PickingController};
