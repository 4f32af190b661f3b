/// Scratch-area identifier under which a unit's store is kept unless configured otherwise.
pub const DEFAULT_SCRATCH_KEY: &str = "$lineage_scope";

/// Environment variable overriding [`DEFAULT_SCRATCH_KEY`].
pub const SCRATCH_KEY_ENV: &str = "LINEAGE_SCRATCH_KEY";
