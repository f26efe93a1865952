//! Default configuration values

/// Name of the core project created by the bootstrap step
pub const DEFAULT_CORE_PROJECT: &str = "DocumentumCoreProject";

/// Whether referenced projects are pre-built before each project
pub const DEFAULT_PREBUILD_REFERENCES: bool = true;

/// Workspace subdirectory under the data directory
pub const DEFAULT_WORKSPACE_SUBDIR: &str = "workspace";

/// Settings file name in the config directory
pub const SETTINGS_FILE: &str = "config.toml";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
