//! Platform-specific directory management
//!
//! Provides the config and data directories darbuild uses.
//! Follows XDG Base Directory Specification on Linux and standard locations on macOS.
//!
//! Environment variables can override default directories:
//! - `DARBUILD_CONFIG_DIR` - Override config directory
//! - `DARBUILD_DATA_DIR` - Override data directory

use std::env;
use std::path::PathBuf;

use crate::config::defaults::{DEFAULT_WORKSPACE_SUBDIR, SETTINGS_FILE};

/// Environment variable names for directory overrides
pub const ENV_CONFIG_DIR: &str = "DARBUILD_CONFIG_DIR";
pub const ENV_DATA_DIR: &str = "DARBUILD_DATA_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "darbuild";

/// Platform-specific directory provider for darbuild
#[derive(Debug, Clone)]
pub struct DarbuildDirs {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl DarbuildDirs {
    /// Create a new `DarbuildDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: env::var(ENV_CONFIG_DIR)
                .map_or_else(|_| Self::platform_dir(dirs::config_dir(), ".config"), PathBuf::from),
            data_dir: env::var(ENV_DATA_DIR).map_or_else(
                |_| Self::platform_dir(dirs::data_dir(), ".local/share"),
                PathBuf::from,
            ),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/darbuild` or `~/.config/darbuild`
    /// - macOS: `~/Library/Application Support/darbuild`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the data directory path
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }

    /// Path of the settings file in the config directory
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Default live workspace location, under the data directory
    #[must_use]
    pub fn default_workspace_dir(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_WORKSPACE_SUBDIR)
    }

    fn platform_dir(base: Option<PathBuf>, home_fallback: &str) -> PathBuf {
        base.map(|p| p.join(APP_NAME)).unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(home_fallback)
                .join(APP_NAME)
        })
    }
}

impl Default for DarbuildDirs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_new_creates_instance() {
        let dirs = DarbuildDirs::new();
        assert!(!dirs.config_dir().as_os_str().is_empty());
        assert!(!dirs.data_dir().as_os_str().is_empty());
    }

    #[test]
    fn test_settings_path_is_under_config_dir() {
        let dirs = DarbuildDirs::new();
        assert!(dirs.settings_path().starts_with(dirs.config_dir()));
        assert!(dirs.settings_path().ends_with("config.toml"));
    }

    #[test]
    fn test_workspace_dir_is_under_data_dir() {
        let dirs = DarbuildDirs::new();
        assert!(dirs.default_workspace_dir().starts_with(dirs.data_dir()));
    }
}
