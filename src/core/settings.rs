//! Settings file
//!
//! Optional `config.toml` with workspace, engine and build defaults.
//! A missing file yields defaults; an invalid one is a configuration error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::defaults::{DEFAULT_CORE_PROJECT, DEFAULT_PREBUILD_REFERENCES};
use crate::error::ConfigError;
use crate::infra::dirs::DarbuildDirs;

/// darbuild settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Live workspace settings
    #[serde(default)]
    pub workspace: WorkspaceSettings,

    /// Build engine settings
    #[serde(default)]
    pub engine: EngineSettings,

    /// Build run settings
    #[serde(default)]
    pub build: BuildSettings,
}

/// Live workspace settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    /// Workspace root directory
    pub root: Option<PathBuf>,

    /// Name of the core project created on bootstrap
    pub core_project: Option<String>,
}

/// Build engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Program and leading arguments of the engine command
    #[serde(default)]
    pub command: Vec<String>,
}

/// Build run settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Pre-build referenced projects before each project
    pub prebuild_references: Option<bool>,
}

impl Settings {
    /// Load settings from the config directory
    pub fn load(dirs: &DarbuildDirs) -> Result<Self, ConfigError> {
        Self::load_from_path(&dirs.settings_path())
    }

    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Settings {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Settings {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Effective workspace root
    #[must_use]
    pub fn workspace_root(&self, dirs: &DarbuildDirs) -> PathBuf {
        self.workspace
            .root
            .clone()
            .unwrap_or_else(|| dirs.default_workspace_dir())
    }

    /// Effective core project name
    #[must_use]
    pub fn core_project(&self) -> &str {
        self.workspace
            .core_project
            .as_deref()
            .unwrap_or(DEFAULT_CORE_PROJECT)
    }

    /// Effective pre-build setting
    #[must_use]
    pub fn prebuild_references(&self) -> bool {
        self.build
            .prebuild_references
            .unwrap_or(DEFAULT_PREBUILD_REFERENCES)
    }
}
