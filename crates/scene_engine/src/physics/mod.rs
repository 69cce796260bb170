//! Geometric primitives and ray intersection
//!
//! Stateless value types used by bounds computation and picking.

pub mod aabb;
pub mod primitives;

pub use aabb::AABB;
pub use primitives::{Ray, Triangle};
