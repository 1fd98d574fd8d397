//! Error taxonomy for the Manager core

use thiserror::Error;

use crate::entity::Entity;

/// Errors surfaced by [`Manager`](crate::Manager) operations.
///
/// A missing component is deliberately not represented here:
/// [`Manager::get_component`](crate::Manager::get_component) returns
/// `Option` because querying for optional components is a normal,
/// frequent operation in processor logic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManagerError {
    /// An operation referenced an entity that was never created or has
    /// been killed. Indicates a lifecycle bug in the caller.
    #[error("entity '{0}' does not exist")]
    EntityNotFound(Entity),

    /// `publish` was called with an action that is not a JSON object
    /// carrying a string `type` field.
    #[error("action must have a string 'type' field")]
    InvalidAction,

    /// `mutate` drained an action whose type has no registered mutator.
    /// Raised unconditionally: an unhandled action is a wiring bug.
    #[error("no mutator registered for action type '{0}'")]
    UnhandledActionType(String),
}
