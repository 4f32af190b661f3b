//! In-memory unit runtime.
//!
//! The registry owns the live units, the undirected link graph between them
//! and one scratch area per unit. A scratch area maps names to store
//! snapshots; the configured scratch key is the slot the scope engine uses.
//!
//! Topology (graph and unit table) sits behind a single `RwLock` that is only
//! held for one lookup or one change. Scratch areas are `ArcSwap`s, so other
//! units read a unit's store without locking while the owner republishes it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arc_swap::ArcSwap;
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use thiserror::Error;
use tracing::debug;

use crate::config::ScopeConfig;
use crate::runtime::{UnitId, UnitRuntime};
use crate::scope::Scope;
use crate::store::Store;

type ScratchArea<V> = ArcSwap<HashMap<String, Arc<Store<V>>>>;

/// Errors that can occur when changing the registry topology.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
  /// The unit has exited or was never registered.
  #[error("unit not found: {0}")]
  UnitNotFound(UnitId),
}

struct UnitSlot<V> {
  node: NodeIndex,
  scratch: Arc<ScratchArea<V>>,
}

struct Topology<V> {
  graph: StableUnGraph<UnitId, ()>,
  units: HashMap<UnitId, UnitSlot<V>>,
}

impl<V> Topology<V> {
  fn slot(&self, unit: UnitId) -> Result<&UnitSlot<V>, RegistryError> {
    self.units.get(&unit).ok_or(RegistryError::UnitNotFound(unit))
  }
}

struct Inner<V> {
  config: ScopeConfig,
  next_id: AtomicU64,
  topology: RwLock<Topology<V>>,
}

/// A shared handle to a set of live units and their links.
///
/// Cloning is cheap; all clones see the same units.
pub struct Registry<V> {
  inner: Arc<Inner<V>>,
}

impl<V> Clone for Registry<V> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<V> Default for Registry<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V> Registry<V> {
  /// Create a registry configured from the environment.
  pub fn new() -> Self {
    Self::with_config(ScopeConfig::from_env())
  }

  pub fn with_config(config: ScopeConfig) -> Self {
    Self {
      inner: Arc::new(Inner {
        config,
        next_id: AtomicU64::new(1),
        topology: RwLock::new(Topology {
          graph: StableUnGraph::default(),
          units: HashMap::new(),
        }),
      }),
    }
  }

  pub fn config(&self) -> &ScopeConfig {
    &self.inner.config
  }

  fn read(&self) -> RwLockReadGuard<'_, Topology<V>> {
    self.inner.topology.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, Topology<V>> {
    self.inner.topology.write().unwrap_or_else(PoisonError::into_inner)
  }

  fn register(&self, topology: &mut Topology<V>) -> (UnitId, NodeIndex) {
    let unit = UnitId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
    let node = topology.graph.add_node(unit);
    topology.units.insert(
      unit,
      UnitSlot {
        node,
        scratch: Arc::new(ArcSwap::from_pointee(HashMap::new())),
      },
    );
    (unit, node)
  }

  /// Register a unit with no links.
  pub fn spawn_root(&self) -> UnitId {
    let mut topology = self.write();
    let (unit, _) = self.register(&mut topology);
    debug!(unit = %unit, "spawned root unit");
    unit
  }

  /// Register a unit linked to `parent`.
  pub fn spawn_linked(&self, parent: UnitId) -> Result<UnitId, RegistryError> {
    let mut topology = self.write();
    let parent_node = topology.slot(parent)?.node;
    let (unit, node) = self.register(&mut topology);
    topology.graph.add_edge(parent_node, node, ());
    debug!(unit = %unit, parent = %parent, "spawned linked unit");
    Ok(unit)
  }

  /// Link two live units. Linking a unit to itself or re-linking is a no-op.
  pub fn link(&self, a: UnitId, b: UnitId) -> Result<(), RegistryError> {
    let mut topology = self.write();
    let a_node = topology.slot(a)?.node;
    let b_node = topology.slot(b)?.node;

    if a_node != b_node && topology.graph.find_edge(a_node, b_node).is_none() {
      topology.graph.add_edge(a_node, b_node, ());
      debug!(a = %a, b = %b, "linked units");
    }
    Ok(())
  }

  pub fn unlink(&self, a: UnitId, b: UnitId) -> Result<(), RegistryError> {
    let mut topology = self.write();
    let a_node = topology.slot(a)?.node;
    let b_node = topology.slot(b)?.node;

    if let Some(edge) = topology.graph.find_edge(a_node, b_node) {
      topology.graph.remove_edge(edge);
      debug!(a = %a, b = %b, "unlinked units");
    }
    Ok(())
  }

  /// Tear a unit down, dropping its links and its scratch area.
  ///
  /// Returns `false` if the unit was already gone.
  pub fn exit(&self, unit: UnitId) -> bool {
    let mut topology = self.write();
    match topology.units.remove(&unit) {
      Some(slot) => {
        topology.graph.remove_node(slot.node);
        debug!(unit = %unit, "unit exited");
        true
      }
      None => false,
    }
  }

  pub fn is_alive(&self, unit: UnitId) -> bool {
    self.read().units.contains_key(&unit)
  }

  /// Direct neighbors of `unit`; empty if the unit is gone.
  pub fn neighbors(&self, unit: UnitId) -> Vec<UnitId> {
    let topology = self.read();
    match topology.units.get(&unit) {
      Some(slot) => topology.graph.neighbors(slot.node).map(|n| topology.graph[n]).collect(),
      None => Vec::new(),
    }
  }

  pub fn unit_count(&self) -> usize {
    self.read().units.len()
  }

  fn scratch_area(&self, unit: UnitId) -> Option<Arc<ScratchArea<V>>> {
    self.read().units.get(&unit).map(|slot| Arc::clone(&slot.scratch))
  }

  /// Read the store kept under `name` in a unit's scratch area.
  pub fn scratch(&self, unit: UnitId, name: &str) -> Option<Arc<Store<V>>> {
    let scratch = self.scratch_area(unit)?;
    let slots = scratch.load();
    slots.get(name).cloned()
  }

  /// Publish `store` under `name` in a unit's scratch area.
  pub fn put_scratch(&self, unit: UnitId, name: &str, store: Arc<Store<V>>) -> Result<(), RegistryError> {
    let scratch = self.scratch_area(unit).ok_or(RegistryError::UnitNotFound(unit))?;
    scratch.rcu(|current| {
      let mut next = HashMap::clone(current);
      next.insert(name.to_string(), Arc::clone(&store));
      next
    });
    Ok(())
  }

  /// The scope store of `unit`, kept under the configured scratch key.
  pub fn store(&self, unit: UnitId) -> Option<Arc<Store<V>>> {
    self.scratch(unit, &self.inner.config.scratch_key)
  }

  pub fn set_store(&self, unit: UnitId, store: Store<V>) -> Result<(), RegistryError> {
    self.put_scratch(unit, &self.inner.config.scratch_key, Arc::new(store))
  }

  /// Runtime capability bound to `unit`.
  pub fn context(&self, unit: UnitId) -> UnitCtx<V> {
    UnitCtx {
      registry: self.clone(),
      unit,
    }
  }
}

impl<V: Clone> Registry<V> {
  /// Scope engine running on behalf of `unit`.
  pub fn scope(&self, unit: UnitId) -> Scope<UnitCtx<V>> {
    Scope::new(self.context(unit))
  }
}

/// A [`Registry`] seen from one unit.
pub struct UnitCtx<V> {
  registry: Registry<V>,
  unit: UnitId,
}

impl<V> Clone for UnitCtx<V> {
  fn clone(&self) -> Self {
    Self {
      registry: self.registry.clone(),
      unit: self.unit,
    }
  }
}

impl<V> UnitCtx<V> {
  pub fn registry(&self) -> &Registry<V> {
    &self.registry
  }

  pub fn unit(&self) -> UnitId {
    self.unit
  }
}

impl<V: Clone> UnitRuntime for UnitCtx<V> {
  type Value = V;

  fn current_unit(&self) -> UnitId {
    self.unit
  }

  fn neighbors_of(&self, unit: UnitId) -> Vec<UnitId> {
    self.registry.neighbors(unit)
  }

  fn is_alive(&self, unit: UnitId) -> bool {
    self.registry.is_alive(unit)
  }

  fn store_of(&self, unit: UnitId) -> Option<Arc<Store<V>>> {
    self.registry.store(unit)
  }

  fn publish_store(&self, store: Store<V>) {
    // A unit that already exited has nowhere to keep a store.
    if let Err(err) = self.registry.set_store(self.unit, store) {
      debug!(unit = %self.unit, error = %err, "dropped store write for exited unit");
    }
  }
}
