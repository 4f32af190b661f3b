//! Interned symbolic keys.
//!
//! Store keys are atoms: every distinct name is leaked once into a process-wide
//! interner and afterwards handled as a `&'static str`. This keeps [`Key`]
//! `Copy` and makes the set of names bounded by what the program actually uses.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

static INTERNER: OnceLock<Mutex<HashSet<&'static str>>> = OnceLock::new();

/// An interned key naming one entry of a [`Store`](crate::Store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(&'static str);

impl Key {
  /// Wrap a string literal without touching the interner.
  pub const fn from_static(name: &'static str) -> Self {
    Self(name)
  }

  /// Intern `name`, reusing the existing allocation if it was seen before.
  pub fn intern(name: &str) -> Self {
    let interner = INTERNER.get_or_init(|| Mutex::new(HashSet::new()));
    let mut names = interner.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(&existing) = names.get(name) {
      return Self(existing);
    }

    let leaked: &'static str = Box::leak(name.to_owned().into_boxed_str());
    names.insert(leaked);
    Self(leaked)
  }

  pub fn as_str(&self) -> &'static str {
    self.0
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.0)
  }
}

impl From<&str> for Key {
  fn from(name: &str) -> Self {
    Key::intern(name)
  }
}

impl From<String> for Key {
  fn from(name: String) -> Self {
    Key::intern(&name)
  }
}

impl From<&String> for Key {
  fn from(name: &String) -> Self {
    Key::intern(name)
  }
}

impl AsRef<str> for Key {
  fn as_ref(&self) -> &str {
    self.0
  }
}

impl Serialize for Key {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.0)
  }
}

impl<'de> Deserialize<'de> for Key {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let name = String::deserialize(deserializer)?;
    Ok(Key::intern(&name))
  }
}
