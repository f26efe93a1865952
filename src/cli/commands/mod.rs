//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod plan;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;

use crate::cli::output::OutputConfig;
use crate::core::settings::Settings;
use crate::infra::dirs::DarbuildDirs;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every project in dependency order and collect the artifacts
    ///
    /// Launcher-style parameters are accepted after `--`:
    /// `darbuild build -- -projectsDir <dir> -outputDir <dir>`
    Build {
        /// Directory containing the projects to build
        #[arg(short, long, env = "DARBUILD_PROJECTS_DIR")]
        projects_dir: Option<PathBuf>,

        /// Directory receiving the built artifacts
        #[arg(short, long, env = "DARBUILD_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Live workspace directory (overrides the settings file)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Skip the incremental pre-build of referenced projects
        #[arg(long)]
        no_prebuild: bool,

        /// Launcher parameters (`-name value` pairs)
        #[arg(last = true, allow_hyphen_values = true)]
        legacy: Vec<String>,
    },

    /// Show the build order without building
    Plan {
        /// Directory containing the projects to build
        #[arg(short, long, env = "DARBUILD_PROJECTS_DIR")]
        projects_dir: PathBuf,

        /// Live workspace directory (overrides the settings file)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}

impl Commands {
    /// Execute the command
    pub fn run(self, settings_path: Option<&Path>, output: &OutputConfig) -> Result<()> {
        let dirs = DarbuildDirs::new();
        match self {
            Self::Build {
                projects_dir,
                output_dir,
                workspace,
                no_prebuild,
                legacy,
            } => {
                let options = build::BuildOptions {
                    projects_dir,
                    output_dir,
                    workspace,
                    no_prebuild,
                    legacy,
                };
                let settings = load_settings(&dirs, settings_path)?;
                build::execute(&dirs, &settings, options, output)
            }
            Self::Plan {
                projects_dir,
                workspace,
            } => {
                let settings = load_settings(&dirs, settings_path)?;
                plan::execute(&dirs, &settings, &projects_dir, workspace, output)
            }
        }
    }
}

fn load_settings(dirs: &DarbuildDirs, path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load(dirs)?,
    };
    Ok(settings)
}
