//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use darbuild::config::layout::{BUILD_OUTPUT_DIR, CLASSPATH_FILE, CORE_NATURE, PROJECT_FILE};
use darbuild::core::descriptor::{ProjectDescription, ProjectDescriptor};
use darbuild::core::workspace::{
    BuildKind, Diagnostic, DiagnosticDepth, LiveProject, Workspace,
};
use darbuild::error::WorkspaceError;
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Create `projects/<name>` with a `.project` referencing `refs`
    pub fn create_dar_project(&self, name: &str, refs: &[&str]) -> PathBuf {
        self.create_file(&format!("projects/{name}/{PROJECT_FILE}"), &project_xml(name, refs));
        self.create_file(
            &format!("projects/{name}/Artifacts/Types/{name}.type"),
            "<type/>",
        );
        self.path().join("projects").join(name)
    }

    /// Add a `.classpath` with source entries on `refs` to `projects/<name>`
    pub fn create_classpath(&self, name: &str, refs: &[&str]) {
        self.create_file(&format!("projects/{name}/{CLASSPATH_FILE}"), &classpath_xml(refs));
    }

    /// Projects directory used by [`Self::create_dar_project`]
    pub fn projects_dir(&self) -> PathBuf {
        self.path().join("projects")
    }

    /// Output directory for artifacts
    pub fn output_dir(&self) -> PathBuf {
        self.path().join("out")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// `.project` document with the given references
pub fn project_xml(name: &str, refs: &[&str]) -> String {
    let projects: String = refs
        .iter()
        .map(|r| format!("\t\t<project>{r}</project>\n"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<projectDescription>
	<name>{name}</name>
	<comment></comment>
	<projects>
{projects}	</projects>
	<natures>
		<nature>com.emc.ide.project.dmProjectNatureId</nature>
	</natures>
</projectDescription>
"#
    )
}

/// `.classpath` document with a source entry per referenced project
pub fn classpath_xml(refs: &[&str]) -> String {
    let entries: String = refs
        .iter()
        .map(|r| format!("\t<classpathentry kind=\"src\" path=\"/{r}\"/>\n"))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<classpath>\n\t<classpathentry kind=\"src\" path=\"src\"/>\n{entries}</classpath>\n"
    )
}

/// Write the artifacts a successful engine build leaves behind
pub fn write_artifacts(project_dir: &Path, name: &str) {
    let out = project_dir.join(BUILD_OUTPUT_DIR);
    std::fs::create_dir_all(&out).expect("Failed to create build output");
    std::fs::write(out.join(format!("{name}.dar")), b"dar").expect("Failed to write dar");
    std::fs::write(out.join(format!("{name}.installparam")), b"<params/>")
        .expect("Failed to write installparam");
}

/// In-memory workspace recording every call made to it
#[derive(Debug, Default)]
pub struct FakeWorkspace {
    pub projects: Vec<LiveProject>,
    pub auto_build: bool,
    pub auto_build_sets: Vec<bool>,
    /// Whether `create_core_projects` actually creates a core project
    pub bootstrap_creates_core: bool,
    pub bootstrap_attempts: usize,
    pub builds: Vec<(String, BuildKind)>,
    /// Projects whose full build leaves no artifacts
    pub skip_artifacts: BTreeSet<String>,
    /// Diagnostics reported after a project's full build
    pub diagnostics: BTreeMap<String, Vec<Diagnostic>>,
    /// Projects whose diagnostics query fails
    pub failing_diagnostics: BTreeSet<String>,
}

impl FakeWorkspace {
    /// Workspace with auto-build on and a working bootstrap
    pub fn new() -> Self {
        Self {
            auto_build: true,
            bootstrap_creates_core: true,
            ..Self::default()
        }
    }

    /// Add a core project to the workspace
    pub fn with_core(mut self, name: &str) -> Self {
        self.projects.push(core_project(name));
        self
    }

    /// Names of the projects that got a full build, in order
    pub fn full_builds(&self) -> Vec<String> {
        self.builds
            .iter()
            .filter(|(_, kind)| *kind == BuildKind::Full)
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn live(&self, name: &str) -> Result<&LiveProject, WorkspaceError> {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| WorkspaceError::UnknownProject {
                name: name.to_string(),
            })
    }
}

fn core_project(name: &str) -> LiveProject {
    LiveProject {
        name: name.to_string(),
        location: PathBuf::from("/workspace").join(name),
        references: Vec::new(),
        natures: vec![CORE_NATURE.to_string()],
    }
}

impl Workspace for FakeWorkspace {
    fn projects(&self) -> Result<Vec<LiveProject>, WorkspaceError> {
        Ok(self.projects.clone())
    }

    fn auto_build(&self) -> Result<bool, WorkspaceError> {
        Ok(self.auto_build)
    }

    fn set_auto_build(&mut self, enabled: bool) -> Result<(), WorkspaceError> {
        self.auto_build_sets.push(enabled);
        self.auto_build = enabled;
        Ok(())
    }

    fn create_core_projects(&mut self) -> Result<(), WorkspaceError> {
        self.bootstrap_attempts += 1;
        if self.bootstrap_creates_core {
            self.projects.push(core_project("DocumentumCoreProject"));
        }
        Ok(())
    }

    /// Re-reads the project files from disk, like the directory workspace
    fn materialize_or_refresh(&mut self, project: &ProjectDescriptor) -> Result<(), WorkspaceError> {
        let description = ProjectDescription::load(&project.directory)?;
        let references = description
            .references_in(&project.directory)?
            .into_iter()
            .filter(|r| *r != project.name)
            .collect();
        let live = LiveProject {
            name: project.name.clone(),
            location: project.directory.clone(),
            references,
            natures: description.natures,
        };
        match self.projects.iter_mut().find(|p| p.name == project.name) {
            Some(existing) => *existing = live,
            None => self.projects.push(live),
        }
        Ok(())
    }

    fn referenced_projects(&self, name: &str) -> Result<Vec<String>, WorkspaceError> {
        Ok(self.live(name)?.references.clone())
    }

    fn build(&mut self, name: &str, kind: BuildKind) -> Result<(), WorkspaceError> {
        let location = self.live(name)?.location.clone();
        self.builds.push((name.to_string(), kind));
        if kind == BuildKind::Full && !self.skip_artifacts.contains(name) {
            write_artifacts(&location, name);
        }
        Ok(())
    }

    fn diagnostics(
        &self,
        name: &str,
        depth: DiagnosticDepth,
    ) -> Result<Vec<Diagnostic>, WorkspaceError> {
        if self.failing_diagnostics.contains(name) {
            return Err(WorkspaceError::Engine {
                project: name.to_string(),
                error: "marker query failed".to_string(),
            });
        }
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
