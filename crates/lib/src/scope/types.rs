//! Error types for the scope engine.

use thiserror::Error;

use crate::runtime::UnitId;

/// Errors raised by [`Scope::init`](super::Scope::init).
///
/// Both signal a programming error: `init` is meant to run once per connected
/// group of units, at its root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
  /// The current unit already has a store.
  #[error("scope already initialized in {unit}")]
  AlreadyInitialized { unit: UnitId },

  /// A unit reachable from the current one already has a store.
  #[error("cannot initialize scope in {unit}: {ancestor} is already initialized")]
  AncestorInitialized { unit: UnitId, ancestor: UnitId },
}
