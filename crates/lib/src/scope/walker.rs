//! Hierarchy walker.
//!
//! Searches every unit reachable from the current unit through the adjacency
//! graph, depth-first in adjacency order, and stops at the first unit whose
//! store satisfies a probe.
//!
//! # Algorithm
//!
//! 1. Seed the visited set with the current unit and stack its neighbors
//! 2. Pop a unit; skip it if already visited, otherwise mark it visited
//! 3. Dead units are non-matches and their neighbors are never read
//! 4. Probe the unit's store snapshot; the first match ends the walk
//! 5. Otherwise stack the unit's unvisited neighbors and continue
//!
//! The graph is undirected, so "ancestors" here means any connected unit,
//! including siblings and children.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::key::Key;
use crate::runtime::{UnitId, UnitRuntime};
use crate::store::Store;

/// Outcome of a single walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Found<T> {
  /// The unit whose store matched.
  pub unit: UnitId,
  pub value: T,
}

pub struct Walker<'a, R> {
  runtime: &'a R,
  origin: UnitId,
  visited: HashSet<UnitId>,
  stack: Vec<UnitId>,
}

impl<'a, R: UnitRuntime> Walker<'a, R> {
  /// Start a walk from the runtime's current unit.
  pub fn new(runtime: &'a R) -> Self {
    let origin = runtime.current_unit();
    let mut visited = HashSet::new();
    visited.insert(origin);

    Self {
      runtime,
      origin,
      visited,
      stack: Vec::new(),
    }
  }

  /// Push the unvisited neighbors of `unit` so that they pop in adjacency order.
  fn push_neighbors(&mut self, unit: UnitId) {
    let neighbors = self.runtime.neighbors_of(unit);
    trace!(unit = %unit, neighbors = neighbors.len(), "read adjacency");

    self
      .stack
      .extend(neighbors.into_iter().rev().filter(|n| !self.visited.contains(n)));
  }

  /// Walk until `probe` returns a value for some reachable unit's store.
  pub fn find_map<T, F>(mut self, mut probe: F) -> Option<Found<T>>
  where
    F: FnMut(&Store<R::Value>) -> Option<T>,
  {
    self.push_neighbors(self.origin);

    while let Some(unit) = self.stack.pop() {
      if !self.visited.insert(unit) {
        continue;
      }

      if !self.runtime.is_alive(unit) {
        trace!(unit = %unit, "skipping dead unit");
        continue;
      }

      if let Some(store) = self.runtime.store_of(unit)
        && let Some(value) = probe(&store)
      {
        debug!(origin = %self.origin, found = %unit, visited = self.visited.len() - 1, "walk matched");
        return Some(Found { unit, value });
      }

      self.push_neighbors(unit);
    }

    debug!(origin = %self.origin, visited = self.visited.len() - 1, "walk exhausted");
    None
  }

  /// First reachable unit, other than the origin, that has a store at all.
  pub fn find_initialized(self) -> Option<UnitId> {
    self.find_map(|_| Some(())).map(|found| found.unit)
  }

  /// First reachable unit, other than the origin, whose store holds `key`.
  pub fn find_value(self, key: &Key) -> Option<Found<R::Value>> {
    self.find_map(|store| store.get(key).cloned())
  }
}
