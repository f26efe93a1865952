//! Plan command implementation
//!
//! Implements `darbuild plan` to print the build order of a projects
//! directory against the live workspace, without building anything.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::cli::output::OutputConfig;
use crate::core::orchestrator;
use crate::core::settings::Settings;
use crate::infra::dirs::DarbuildDirs;
use crate::infra::engine::CommandEngine;
use crate::infra::workspace::DirWorkspace;

#[derive(Serialize)]
struct PlanEntry<'a> {
    name: &'a str,
    directory: &'a Path,
    references: Vec<&'a str>,
}

/// Execute the plan command
pub fn execute(
    dirs: &DarbuildDirs,
    settings: &Settings,
    projects_dir: &Path,
    workspace: Option<PathBuf>,
    output: &OutputConfig,
) -> Result<()> {
    if !projects_dir.is_dir() {
        bail!("Projects directory not found: {}", projects_dir.display());
    }

    let workspace_root = workspace.unwrap_or_else(|| settings.workspace_root(dirs));
    let workspace = DirWorkspace::open(
        &workspace_root,
        settings.core_project(),
        CommandEngine::default(),
    )
    .with_context(|| format!("Failed to open workspace {}", workspace_root.display()))?;

    let plan = orchestrator::preview(&workspace, projects_dir, settings.core_project())?;

    if output.json {
        let entries: Vec<PlanEntry<'_>> = plan
            .projects()
            .iter()
            .map(|p| PlanEntry {
                name: &p.name,
                directory: &p.directory,
                references: p.referenced_names.iter().map(String::as_str).collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if !output.quiet {
        if plan.is_empty() {
            println!("No projects to build");
        }
        for (index, project) in plan.projects().iter().enumerate() {
            println!("{:>3}. {}", index + 1, project.name);
        }
    }
    Ok(())
}
