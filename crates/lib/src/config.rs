//! Engine configuration.
//!
//! Configuration is small: it names the reserved scratch-area slot that holds
//! each unit's store. It can be embedded in a host application's JSON config
//! or overridden from the environment.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{DEFAULT_SCRATCH_KEY, SCRATCH_KEY_ENV};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
  /// Scratch-area identifier under which a unit's store is kept.
  pub scratch_key: String,
}

impl Default for ScopeConfig {
  fn default() -> Self {
    Self {
      scratch_key: DEFAULT_SCRATCH_KEY.to_string(),
    }
  }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to parse configuration JSON.
  #[error("failed to parse scope config: {0}")]
  Parse(#[source] serde_json::Error),

  /// A field holds a value the engine cannot work with.
  #[error("invalid scope config: {0}")]
  Invalid(String),
}

impl ScopeConfig {
  /// Defaults, with `LINEAGE_SCRATCH_KEY` applied when set and non-empty.
  pub fn from_env() -> Self {
    let mut config = Self::default();

    if let Ok(key) = std::env::var(SCRATCH_KEY_ENV)
      && !key.is_empty()
    {
      debug!(scratch_key = %key, "scratch key overridden from environment");
      config.scratch_key = key;
    }

    config
  }

  /// Parse and validate a JSON document. Missing fields take their defaults.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    let config: ScopeConfig = serde_json::from_str(content).map_err(ConfigError::Parse)?;
    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.scratch_key.is_empty() {
      return Err(ConfigError::Invalid("scratch_key cannot be empty".to_string()));
    }
    Ok(())
  }
}
