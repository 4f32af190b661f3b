//! Guard and mutation API over a unit's store.
//!
//! [`Scope`] ties the local store of the current unit to the [`Walker`]:
//! - `init` creates the store once per connected group of units
//! - `get` reads locally, then inherits from reachable units and caches the hit
//! - `unsafe_put` / `unsafe_update` write the local store without any guard
//!
//! Inheritance is copy-on-first-read: once a value is cached locally it is
//! never refreshed from the unit it came from.

pub mod types;
pub mod walker;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::key::Key;
use crate::runtime::{UnitId, UnitRuntime};
use crate::store::{InitData, Store};

pub use types::ScopeError;
pub use walker::{Found, Walker};

/// Scope engine running on behalf of the runtime's current unit.
#[derive(Debug, Clone)]
pub struct Scope<R> {
  runtime: R,
}

impl<R: UnitRuntime> Scope<R> {
  pub fn new(runtime: R) -> Self {
    Self { runtime }
  }

  pub fn runtime(&self) -> &R {
    &self.runtime
  }

  /// The unit this scope reads and writes.
  pub fn unit(&self) -> UnitId {
    self.runtime.current_unit()
  }

  /// The current unit's store snapshot, if it has one.
  pub fn snapshot(&self) -> Option<Arc<Store<R::Value>>> {
    self.runtime.store_of(self.unit())
  }

  /// Whether the current unit has a store. An empty store counts.
  pub fn is_initialized(&self) -> bool {
    self.snapshot().is_some()
  }

  /// Build the next local snapshot from the current one and publish it.
  fn write_local(&self, edit: impl FnOnce(&mut Store<R::Value>)) {
    let mut next = self.snapshot().map(|s| Store::clone(&s)).unwrap_or_default();
    edit(&mut next);
    self.runtime.publish_store(next);
  }

  /// Value of `key` in the current unit's own store. Never walks the graph.
  pub fn get_local(&self, key: impl Into<Key>) -> Option<R::Value> {
    let key = key.into();
    self.snapshot()?.get(&key).cloned()
  }

  /// Set `key` in the current unit's own store, creating the store if needed.
  pub fn put_local(&self, key: impl Into<Key>, value: R::Value) {
    let key = key.into();
    self.write_local(|store| {
      store.insert(key, value);
    });
  }

  /// Initialize the current unit's store from `data`.
  ///
  /// # Errors
  ///
  /// Returns `AlreadyInitialized` if the current unit has a store, and
  /// `AncestorInitialized` if any unit reachable from it has one.
  pub fn init(&self, data: impl Into<InitData<R::Value>>) -> Result<(), ScopeError> {
    let unit = self.unit();

    if self.is_initialized() {
      debug!(unit = %unit, "refusing init: unit already initialized");
      return Err(ScopeError::AlreadyInitialized { unit });
    }

    if let Some(ancestor) = Walker::new(&self.runtime).find_initialized() {
      debug!(unit = %unit, ancestor = %ancestor, "refusing init: reachable unit already initialized");
      return Err(ScopeError::AncestorInitialized { unit, ancestor });
    }

    let store = Store::from(data.into());
    debug!(unit = %unit, keys = store.len(), "initialized scope");
    self.runtime.publish_store(store);
    Ok(())
  }

  /// Look `key` up locally, then in reachable units.
  ///
  /// A value found elsewhere is cached in the local store before it is
  /// returned, creating the store if the unit never had one. Absence is not an
  /// error and leaves the local store untouched.
  pub fn get(&self, key: impl Into<Key>) -> Option<R::Value> {
    let key = key.into();
    let unit = self.unit();

    if let Some(value) = self.get_local(key) {
      trace!(unit = %unit, key = %key, "local hit");
      return Some(value);
    }

    let found = Walker::new(&self.runtime).find_value(&key)?;
    debug!(unit = %unit, key = %key, source = %found.unit, "cached inherited value");
    self.put_local(key, found.value.clone());
    Some(found.value)
  }

  /// Like [`get`](Self::get), falling back to `default`. The fallback is not cached.
  pub fn get_or(&self, key: impl Into<Key>, default: R::Value) -> R::Value {
    self.get(key).unwrap_or(default)
  }

  /// The unit a `get` of `key` would copy its value from, without caching.
  ///
  /// Returns the current unit itself if the key is already local.
  pub fn inherited_from(&self, key: impl Into<Key>) -> Option<UnitId> {
    let key = key.into();
    if self.get_local(key).is_some() {
      return Some(self.unit());
    }
    Walker::new(&self.runtime).find_value(&key).map(|found| found.unit)
  }

  /// Merge `pairs` into the local store without consulting the guard.
  ///
  /// Later duplicates override earlier ones.
  pub fn unsafe_put<K, I>(&self, pairs: I)
  where
    K: Into<Key>,
    I: IntoIterator<Item = (K, R::Value)>,
  {
    let unit = self.unit();
    self.write_local(|store| {
      store.extend(pairs);
      trace!(unit = %unit, keys = store.len(), "unsafe put");
    });
  }

  /// Replace the local value of `key` with `update(current)`.
  ///
  /// `update` receives `None` when the key is absent locally; inherited values
  /// are not consulted.
  pub fn unsafe_update<F>(&self, key: impl Into<Key>, update: F)
  where
    F: FnOnce(Option<R::Value>) -> R::Value,
  {
    let key = key.into();
    self.write_local(|store| {
      let next = update(store.get(&key).cloned());
      store.insert(key, next);
    });
  }

  /// Fallible [`unsafe_update`](Self::unsafe_update).
  ///
  /// An error from `update` is returned unchanged and nothing is written.
  pub fn try_unsafe_update<E, F>(&self, key: impl Into<Key>, update: F) -> Result<(), E>
  where
    F: FnOnce(Option<R::Value>) -> Result<R::Value, E>,
  {
    let key = key.into();
    let next = update(self.get_local(key))?;
    self.put_local(key, next);
    Ok(())
  }
}
