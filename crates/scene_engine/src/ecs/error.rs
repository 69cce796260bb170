//! Scene graph error types

use super::EntityId;

/// Errors raised by scene graph operations
///
/// These cover configuration mistakes (a required collaborator component is
/// missing) and programmer misuse (unnamed component types, hierarchy cycles).
/// Conditions that are expected to be absent are reported with `Option`
/// instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A component reported an empty type tag
    #[error("component type tag is undefined")]
    UndefinedComponentType,

    /// The entity id is not registered with the manager
    #[error("entity {0} is not registered")]
    EntityNotFound(EntityId),

    /// A collaborator component required by the operation is absent
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        /// Entity the operation targeted
        entity: EntityId,
        /// Type tag of the missing component
        component: &'static str,
    },

    /// Attaching the child would make an entity its own ancestor
    #[error("cannot attach entity {child} under {parent}: it would create a cycle")]
    HierarchyCycle {
        /// Prospective parent
        parent: EntityId,
        /// Prospective child
        child: EntityId,
    },
}

/// Result alias for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;
