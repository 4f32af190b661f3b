//! Tokio tasks as execution units.
//!
//! [`spawn_unit`] registers a unit (optionally linked to a parent), hands the
//! task body a [`Scope`] bound to it, and tears the unit down when the task
//! finishes, panics or is aborted, which discards its store.

use std::future::Future;

use tokio::task::{JoinError, JoinHandle};
use tracing::debug;

use crate::runtime::UnitId;
use crate::runtime::registry::{Registry, RegistryError, UnitCtx};
use crate::scope::Scope;

/// Handle to a running unit task.
#[derive(Debug)]
pub struct UnitTask<T> {
  unit: UnitId,
  handle: JoinHandle<T>,
}

impl<T> UnitTask<T> {
  pub fn id(&self) -> UnitId {
    self.unit
  }

  /// Wait for the task to finish. The unit has exited once this returns.
  pub async fn join(self) -> Result<T, JoinError> {
    self.handle.await
  }

  pub fn abort(&self) {
    self.handle.abort();
  }
}

/// Exits the unit when dropped, i.e. when the task's future is dropped.
struct ExitGuard<V> {
  registry: Registry<V>,
  unit: UnitId,
}

impl<V> Drop for ExitGuard<V> {
  fn drop(&mut self) {
    if self.registry.exit(self.unit) {
      debug!(unit = %self.unit, "unit task ended");
    }
  }
}

/// Spawn `body` on the tokio runtime as a new unit.
///
/// With `Some(parent)` the unit is linked to `parent` before `body` starts, so
/// it inherits from the parent's group from its first instruction.
///
/// # Errors
///
/// Returns `UnitNotFound` if `parent` has already exited.
pub fn spawn_unit<V, F, Fut>(
  registry: &Registry<V>,
  parent: Option<UnitId>,
  body: F,
) -> Result<UnitTask<Fut::Output>, RegistryError>
where
  V: Clone + Send + Sync + 'static,
  F: FnOnce(Scope<UnitCtx<V>>) -> Fut,
  Fut: Future + Send + 'static,
  Fut::Output: Send + 'static,
{
  let unit = match parent {
    Some(parent) => registry.spawn_linked(parent)?,
    None => registry.spawn_root(),
  };

  let guard = ExitGuard {
    registry: registry.clone(),
    unit,
  };
  let future = body(registry.scope(unit));

  let handle = tokio::spawn(async move {
    let _guard = guard;
    future.await
  });

  Ok(UnitTask { unit, handle })
}
