//! Entity-Component scene graph
//!
//! Entities live in an [`EntityManager`] arena and carry at most one
//! component per type tag. The manager maintains memoized component filters,
//! named groups and the pointer handler registry; built-in components cover
//! cached hierarchical transforms, bounds, cameras and box colliders.

pub mod component;
pub mod components;
pub mod entity;
pub mod entity_manager;
pub mod error;
pub mod filter;
pub mod group;
pub mod systems;

#[cfg(test)]
mod tests;

pub use component::{Component, ComponentBase, ComponentType};
pub use entity::{Entity, EntityId};
pub use entity_manager::{EntityManager, EntityMut};
pub use error::{SceneError, SceneResult};
pub use filter::EntityFilter;
pub use group::EntityGroup;
