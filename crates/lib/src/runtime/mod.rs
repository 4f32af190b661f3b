//! The capability the scope engine consumes from the surrounding runtime.
//!
//! The engine never owns units or their link graph. It asks the runtime who
//! the current unit is, who its neighbors are, whether a unit is still alive,
//! and what a unit's store currently looks like. Writes only ever target the
//! current unit's own store.

pub mod registry;
pub mod task;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::Store;

/// Identity of one execution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "unit#{}", self.0)
  }
}

/// Runtime services needed by [`Scope`](crate::Scope).
pub trait UnitRuntime {
  type Value: Clone;

  /// The unit on whose behalf the engine is running.
  fn current_unit(&self) -> UnitId;

  /// Direct neighbors of `unit` in the adjacency graph, in runtime order.
  ///
  /// Dead or unknown units have no neighbors.
  fn neighbors_of(&self, unit: UnitId) -> Vec<UnitId>;

  fn is_alive(&self, unit: UnitId) -> bool;

  /// Current store snapshot of `unit`, or `None` if it has none or is gone.
  fn store_of(&self, unit: UnitId) -> Option<Arc<Store<Self::Value>>>;

  /// Replace the current unit's store with `store`.
  fn publish_store(&self, store: Store<Self::Value>);
}

impl<R: UnitRuntime + ?Sized> UnitRuntime for &R {
  type Value = R::Value;

  fn current_unit(&self) -> UnitId {
    (**self).current_unit()
  }

  fn neighbors_of(&self, unit: UnitId) -> Vec<UnitId> {
    (**self).neighbors_of(unit)
  }

  fn is_alive(&self, unit: UnitId) -> bool {
    (**self).is_alive(unit)
  }

  fn store_of(&self, unit: UnitId) -> Option<Arc<Store<Self::Value>>> {
    (**self).store_of(unit)
  }

  fn publish_store(&self, store: Store<Self::Value>) {
    (**self).publish_store(store)
  }
}
