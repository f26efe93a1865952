//! Run parameters
//!
//! Besides regular flags, `build` accepts the headless launcher form
//! `-projectsDir <dir> -outputDir <dir>` after `--`. Explicit flags win
//! over launcher pairs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Launcher parameter naming the projects directory
pub const PROJECTS_DIR_PARAM: &str = "projectsDir";

/// Launcher parameter naming the output directory
pub const OUTPUT_DIR_PARAM: &str = "outputDir";

/// Parsed `-name value` launcher pairs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    values: BTreeMap<String, String>,
}

impl LaunchArgs {
    /// Parse alternating `-name value` arguments
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, ConfigError> {
        let mut values = BTreeMap::new();
        let mut args = args.iter().map(AsRef::as_ref);
        while let Some(raw) = args.next() {
            let name = raw
                .strip_prefix('-')
                .ok_or_else(|| ConfigError::MalformedParameter {
                    name: raw.to_string(),
                })?;
            let value = args.next().ok_or_else(|| ConfigError::MissingValue {
                name: name.to_string(),
            })?;
            if name != PROJECTS_DIR_PARAM && name != OUTPUT_DIR_PARAM {
                tracing::warn!("Ignoring unknown parameter '-{name}'");
            }
            values.insert(name.to_string(), value.to_string());
        }
        Ok(Self { values })
    }

    /// Value of a parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Validated directories of a build run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// Existing projects directory
    pub projects_dir: PathBuf,
    /// Output directory (created by the run if missing)
    pub output_dir: PathBuf,
}

impl RunPaths {
    /// Combine explicit flags with launcher pairs and validate
    pub fn resolve(
        projects_dir: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        launch: &LaunchArgs,
    ) -> Result<Self, ConfigError> {
        let projects_dir = required(projects_dir, launch, PROJECTS_DIR_PARAM)?;
        let output_dir = required(output_dir, launch, OUTPUT_DIR_PARAM)?;

        if !projects_dir.is_dir() {
            return Err(ConfigError::ProjectsDirNotFound { path: projects_dir });
        }

        Ok(Self {
            projects_dir,
            output_dir,
        })
    }
}

fn required(
    explicit: Option<PathBuf>,
    launch: &LaunchArgs,
    name: &str,
) -> Result<PathBuf, ConfigError> {
    explicit
        .or_else(|| launch.get(name).map(PathBuf::from))
        .ok_or_else(|| ConfigError::MissingParameter {
            name: name.to_string(),
        })
}
