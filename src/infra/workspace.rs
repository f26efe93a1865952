//! Directory-backed live workspace
//!
//! Keeps the workspace state (auto-build flag and materialized projects)
//! in `<root>/.metadata/workspace.toml` and delegates builds to a
//! [`CommandEngine`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::layout::{
    CORE_NATURE, PROJECT_FILE, WORKSPACE_METADATA_DIR, WORKSPACE_STATE_FILE,
};
use crate::core::descriptor::{ProjectDescription, ProjectDescriptor};
use crate::core::workspace::{BuildKind, Diagnostic, DiagnosticDepth, LiveProject, Workspace};
use crate::error::WorkspaceError;
use crate::infra::engine::CommandEngine;
use crate::infra::filesystem;

/// Persisted workspace state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WorkspaceState {
    #[serde(default = "default_auto_build")]
    auto_build: bool,
    #[serde(default)]
    projects: Vec<ProjectRecord>,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self {
            auto_build: default_auto_build(),
            projects: Vec::new(),
        }
    }
}

fn default_auto_build() -> bool {
    true
}

/// A materialized project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ProjectRecord {
    name: String,
    location: PathBuf,
    #[serde(default)]
    references: Vec<String>,
    #[serde(default)]
    natures: Vec<String>,
    #[serde(default)]
    open: bool,
}

impl ProjectRecord {
    fn to_live(&self) -> LiveProject {
        LiveProject {
            name: self.name.clone(),
            location: self.location.clone(),
            references: self.references.clone(),
            natures: self.natures.clone(),
        }
    }
}

/// Workspace persisted in a directory
#[derive(Debug)]
pub struct DirWorkspace {
    root: PathBuf,
    core_project: String,
    engine: CommandEngine,
    state: WorkspaceState,
    diagnostics: HashMap<String, Vec<Diagnostic>>,
}

impl DirWorkspace {
    /// Open the workspace at `root`, starting empty if it has no state yet
    pub fn open(
        root: impl Into<PathBuf>,
        core_project: impl Into<String>,
        engine: CommandEngine,
    ) -> Result<Self, WorkspaceError> {
        let root = root.into();
        let state_path = state_path(&root);
        let state = if state_path.exists() {
            let content = filesystem::read_file(&state_path)?;
            toml::from_str(&content).map_err(|e| WorkspaceError::State {
                path: state_path.clone(),
                error: e.to_string(),
            })?
        } else {
            WorkspaceState::default()
        };

        tracing::debug!(
            "Opened workspace {} with {} projects",
            root.display(),
            state.projects.len()
        );
        Ok(Self {
            root,
            core_project: core_project.into(),
            engine,
            state,
            diagnostics: HashMap::new(),
        })
    }

    fn save(&self) -> Result<(), WorkspaceError> {
        let path = state_path(&self.root);
        let content = toml::to_string_pretty(&self.state).map_err(|e| WorkspaceError::State {
            path: path.clone(),
            error: e.to_string(),
        })?;
        filesystem::write_file(&path, &content)?;
        Ok(())
    }

    fn record(&self, name: &str) -> Result<&ProjectRecord, WorkspaceError> {
        self.state
            .projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| WorkspaceError::UnknownProject {
                name: name.to_string(),
            })
    }

    /// Register or refresh a project from its directory
    fn register(&mut self, name: &str, location: &Path) -> Result<(), WorkspaceError> {
        let description = ProjectDescription::load(location)?;
        let references = description
            .references_in(location)?
            .into_iter()
            .filter(|r| r != name)
            .collect();
        let record = ProjectRecord {
            name: name.to_string(),
            location: location.to_path_buf(),
            references,
            natures: description.natures,
            open: true,
        };

        match self.state.projects.iter_mut().find(|p| p.name == name) {
            Some(existing) => {
                let action = if existing.open { "Refreshing" } else { "Opening" };
                tracing::debug!("{action} project '{name}'");
                *existing = record;
            }
            None => {
                tracing::debug!("Creating project '{name}' from {}", location.display());
                self.state.projects.push(record);
            }
        }
        self.save()
    }
}

fn state_path(root: &Path) -> PathBuf {
    root.join(WORKSPACE_METADATA_DIR).join(WORKSPACE_STATE_FILE)
}

fn core_project_xml(name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<projectDescription>
	<name>{name}</name>
	<comment></comment>
	<projects>
	</projects>
	<natures>
		<nature>{CORE_NATURE}</nature>
	</natures>
</projectDescription>
"#
    )
}

impl Workspace for DirWorkspace {
    fn projects(&self) -> Result<Vec<LiveProject>, WorkspaceError> {
        Ok(self
            .state
            .projects
            .iter()
            .filter(|p| p.open)
            .map(ProjectRecord::to_live)
            .collect())
    }

    fn auto_build(&self) -> Result<bool, WorkspaceError> {
        Ok(self.state.auto_build)
    }

    fn set_auto_build(&mut self, enabled: bool) -> Result<(), WorkspaceError> {
        self.state.auto_build = enabled;
        self.save()
    }

    fn create_core_projects(&mut self) -> Result<(), WorkspaceError> {
        let name = self.core_project.clone();
        let location = self.root.join(&name);
        let project_file = location.join(PROJECT_FILE);
        if !project_file.exists() {
            filesystem::write_file(&project_file, &core_project_xml(&name))?;
        }
        tracing::info!("Created core project '{name}'");
        self.register(&name, &location)
    }

    fn materialize_or_refresh(&mut self, project: &ProjectDescriptor) -> Result<(), WorkspaceError> {
        self.register(&project.name, &project.directory)
    }

    fn referenced_projects(&self, name: &str) -> Result<Vec<String>, WorkspaceError> {
        Ok(self.record(name)?.references.clone())
    }

    fn build(&mut self, name: &str, kind: BuildKind) -> Result<(), WorkspaceError> {
        let location = self.record(name)?.location.clone();
        let diagnostics = self.engine.run(name, &location, kind)?;
        self.diagnostics.insert(name.to_string(), diagnostics);
        Ok(())
    }

    fn diagnostics(
        &self,
        name: &str,
        depth: DiagnosticDepth,
    ) -> Result<Vec<Diagnostic>, WorkspaceError> {
        self.record(name)?;
        Ok(self
            .diagnostics
            .get(name)
            .map(|all| {
                all.iter()
                    .filter(|d| depth.admits(&d.resource))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
