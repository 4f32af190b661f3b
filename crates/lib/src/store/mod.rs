//! Per-unit key/value stores.
//!
//! A [`Store`] is an immutable snapshot: the owning unit never mutates a
//! published store in place, it builds the next snapshot and publishes that
//! instead. Other units therefore always read a consistent mapping.
//!
//! # Example
//!
//! ```json
//! {
//!   "entries": {
//!     "tenant": "acme",
//!     "trace_id": "4bf92f3577b34da6"
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::key::Key;

/// The key/value mapping owned by exactly one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store<V> {
  entries: HashMap<Key, V>,
}

impl<V> Default for Store<V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<V> Store<V> {
  /// Create an empty store. An empty store still marks its unit as initialized.
  pub fn new() -> Self {
    Self {
      entries: HashMap::new(),
    }
  }

  /// Build a store from pairs; later duplicates override earlier ones.
  pub fn from_pairs<K, I>(pairs: I) -> Self
  where
    K: Into<Key>,
    I: IntoIterator<Item = (K, V)>,
  {
    let mut store = Self::new();
    store.extend(pairs);
    store
  }

  pub fn get(&self, key: &Key) -> Option<&V> {
    self.entries.get(key)
  }

  pub fn contains_key(&self, key: &Key) -> bool {
    self.entries.contains_key(key)
  }

  pub fn insert(&mut self, key: impl Into<Key>, value: V) -> Option<V> {
    self.entries.insert(key.into(), value)
  }

  /// Merge pairs into the store; later duplicates override earlier ones.
  pub fn extend<K, I>(&mut self, pairs: I)
  where
    K: Into<Key>,
    I: IntoIterator<Item = (K, V)>,
  {
    self.entries.extend(pairs.into_iter().map(|(k, v)| (k.into(), v)));
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Keys in sorted order.
  pub fn keys(&self) -> Vec<Key> {
    let mut keys: Vec<Key> = self.entries.keys().copied().collect();
    keys.sort();
    keys
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Key, &V)> {
    self.entries.iter()
  }
}

impl<V> From<InitData<V>> for Store<V> {
  fn from(data: InitData<V>) -> Self {
    match data {
      InitData::Pairs(pairs) => Store::from_pairs(pairs),
      InitData::Map(entries) => Store { entries },
    }
  }
}

/// Initial contents handed to [`Scope::init`](crate::Scope::init).
///
/// Both forms produce the same store for the same logical data.
#[derive(Debug, Clone, PartialEq)]
pub enum InitData<V> {
  /// Ordered pairs; later duplicates override earlier ones.
  Pairs(Vec<(Key, V)>),
  /// An already keyed mapping.
  Map(HashMap<Key, V>),
}

impl<V> InitData<V> {
  pub fn len(&self) -> usize {
    match self {
      InitData::Pairs(pairs) => pairs.len(),
      InitData::Map(entries) => entries.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl<K: Into<Key>, V> From<Vec<(K, V)>> for InitData<V> {
  fn from(pairs: Vec<(K, V)>) -> Self {
    InitData::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
  }
}

impl<K: Into<Key>, V, const N: usize> From<[(K, V); N]> for InitData<V> {
  fn from(pairs: [(K, V); N]) -> Self {
    InitData::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
  }
}

impl<V> From<HashMap<Key, V>> for InitData<V> {
  fn from(entries: HashMap<Key, V>) -> Self {
    InitData::Map(entries)
  }
}

impl<V> From<BTreeMap<Key, V>> for InitData<V> {
  fn from(entries: BTreeMap<Key, V>) -> Self {
    InitData::Map(entries.into_iter().collect())
  }
}
