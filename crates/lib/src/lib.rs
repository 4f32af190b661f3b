//! lineage-lib: dynamic-scope state propagation for concurrent execution units.
//!
//! A unit owns a private key/value [`Store`] that transparently inherits values
//! from every unit reachable through the runtime's adjacency graph:
//! - [`Scope`]: the guard and mutation API (`init`, `get`, `unsafe_put`, `unsafe_update`)
//! - [`UnitRuntime`]: the capability the engine needs from the surrounding runtime
//! - [`Registry`]: an in-memory unit runtime with a link graph and per-unit scratch areas
//! - [`spawn_unit`]: runs a tokio task as a unit that is torn down when the task ends

pub mod config;
pub mod consts;
pub mod key;
pub mod runtime;
pub mod scope;
pub mod store;
pub mod util;

pub use config::{ConfigError, ScopeConfig};
pub use key::Key;
pub use runtime::registry::{Registry, RegistryError, UnitCtx};
pub use runtime::task::{UnitTask, spawn_unit};
pub use runtime::{UnitId, UnitRuntime};
pub use scope::{Scope, ScopeError};
pub use store::{InitData, Store};
