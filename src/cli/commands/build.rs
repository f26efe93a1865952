//! Build command implementation
//!
//! Implements `darbuild build`: resolves the run directories, opens the
//! live workspace and drives one orchestrated run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::args::{LaunchArgs, RunPaths};
use crate::cli::output::{self, status, OutputConfig};
use crate::core::orchestrator::{BuildEvent, BuildReport, Orchestrator, RunOptions};
use crate::core::settings::Settings;
use crate::error::DarbuildError;
use crate::infra::dirs::DarbuildDirs;
use crate::infra::engine::CommandEngine;
use crate::infra::workspace::DirWorkspace;

/// Build options
#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Projects directory flag
    pub projects_dir: Option<PathBuf>,
    /// Output directory flag
    pub output_dir: Option<PathBuf>,
    /// Workspace directory flag
    pub workspace: Option<PathBuf>,
    /// Skip pre-building referenced projects
    pub no_prebuild: bool,
    /// Launcher parameters
    pub legacy: Vec<String>,
}

/// Execute the build command
pub fn execute(
    dirs: &DarbuildDirs,
    settings: &Settings,
    options: BuildOptions,
    output: &OutputConfig,
) -> Result<()> {
    let launch = LaunchArgs::parse(&options.legacy).map_err(DarbuildError::from)?;
    let paths = RunPaths::resolve(options.projects_dir, options.output_dir, &launch)
        .map_err(DarbuildError::from)?;

    let workspace_root = options
        .workspace
        .unwrap_or_else(|| settings.workspace_root(dirs));
    let engine = CommandEngine::new(settings.engine.command.clone());
    if !engine.is_configured() {
        tracing::warn!("No build engine command configured; builds will fail");
    }
    let mut workspace = DirWorkspace::open(&workspace_root, settings.core_project(), engine)
        .with_context(|| format!("Failed to open workspace {}", workspace_root.display()))?;

    let run_options = RunOptions {
        projects_dir: paths.projects_dir,
        output_dir: paths.output_dir.clone(),
        prebuild_references: settings.prebuild_references() && !options.no_prebuild,
    };

    let bar = output.show_progress().then(|| output::create_build_bar(0));
    let observer_bar = bar.clone();
    let mut orchestrator =
        Orchestrator::new(&mut workspace, run_options).with_observer(move |event| {
            let Some(pb) = observer_bar.as_ref() else {
                return;
            };
            match event {
                BuildEvent::Planned { projects } => pb.set_length(projects.len() as u64),
                BuildEvent::Started { project, .. } => pb.set_message(project.to_string()),
                BuildEvent::Finished { .. } => pb.inc(1),
            }
        });

    let result = orchestrator.run();
    if let Some(pb) = &bar {
        pb.finish_and_clear();
    }
    let report = result?;

    print_report(&report, &paths.output_dir, output)
}

fn print_report(report: &BuildReport, output_dir: &Path, output: &OutputConfig) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    if output.quiet {
        return Ok(());
    }

    for project in &report.built {
        println!(
            "{} {} ({} artifact(s))",
            status::SUCCESS,
            project.name,
            project.artifacts.len()
        );
    }
    println!(
        "{} Built {} project(s) into {}",
        status::INFO,
        report.built.len(),
        output_dir.display()
    );
    Ok(())
}
