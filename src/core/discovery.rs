//! Project discovery
//!
//! Collects descriptors from two sources: the projects directory
//! (foreign projects) and the live workspace (own projects), and merges
//! them into one [`Registry`] keyed by name.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::layout::PROJECT_FILE;
use crate::core::descriptor::{Origin, ProjectDescriptor};
use crate::core::workspace::Workspace;
use crate::error::{DarbuildError, FilesystemError};

/// Descriptors known for one run, keyed by project name
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registry {
    projects: BTreeMap<String, ProjectDescriptor>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge own and foreign descriptors
    ///
    /// Own (workspace) descriptors take precedence on a name collision.
    pub fn merge(
        own: impl IntoIterator<Item = ProjectDescriptor>,
        foreign: impl IntoIterator<Item = ProjectDescriptor>,
    ) -> Self {
        let mut registry = Self::new();
        for descriptor in own {
            registry.insert(descriptor);
        }
        for descriptor in foreign {
            match registry.projects.get(&descriptor.name) {
                Some(existing) if same_location(&existing.directory, &descriptor.directory) => {
                    tracing::debug!(
                        "Project '{}' already in workspace, skipping projects dir copy",
                        descriptor.name
                    );
                }
                Some(existing) => {
                    tracing::warn!(
                        "Project '{}' in {} shadows a workspace project at {}; using the workspace one",
                        descriptor.name,
                        descriptor.directory.display(),
                        existing.directory.display()
                    );
                }
                None => registry.insert(descriptor),
            }
        }
        registry
    }

    /// Add or replace a descriptor
    pub fn insert(&mut self, descriptor: ProjectDescriptor) {
        self.projects.insert(descriptor.name.clone(), descriptor);
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&ProjectDescriptor> {
        self.projects.get(name)
    }

    /// Descriptors in name order
    pub fn iter(&self) -> impl Iterator<Item = &ProjectDescriptor> {
        self.projects.values()
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Result of scanning the live workspace
#[derive(Debug, Default, Clone)]
pub struct WorkspaceScan {
    /// Descriptors of all workspace projects
    pub descriptors: Vec<ProjectDescriptor>,
}

impl WorkspaceScan {
    /// Whether at least one core project is present
    pub fn has_core(&self) -> bool {
        self.descriptors.iter().any(|d| d.is_core)
    }
}

/// Scan the live workspace for its projects
pub fn scan_workspace<W: Workspace + ?Sized>(workspace: &W) -> Result<WorkspaceScan, DarbuildError> {
    let mut descriptors: Vec<ProjectDescriptor> = workspace
        .projects()?
        .iter()
        .map(ProjectDescriptor::from_live)
        .collect();
    descriptors.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!("Workspace holds {} projects", descriptors.len());
    Ok(WorkspaceScan { descriptors })
}

/// Scan the immediate subdirectories of `root` for projects
///
/// Core projects are skipped: they must come from the workspace.
pub fn scan_projects_dir(root: &Path) -> Result<Vec<ProjectDescriptor>, DarbuildError> {
    let entries = std::fs::read_dir(root).map_err(|e| FilesystemError::ReadDir {
        path: root.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut descriptors = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FilesystemError::ReadDir {
            path: root.to_path_buf(),
            error: e.to_string(),
        })?;
        let path = entry.path();
        if !path.is_dir() || !path.join(PROJECT_FILE).is_file() {
            continue;
        }

        let descriptor = ProjectDescriptor::from_directory(&path, Origin::ProjectsDir)?;
        if descriptor.is_core {
            tracing::debug!("Skipping core project '{}' in projects dir", descriptor.name);
            continue;
        }
        descriptors.push(descriptor);
    }
    descriptors.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(
        "Found {} projects in {}",
        descriptors.len(),
        root.display()
    );
    Ok(descriptors)
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::layout::CORE_NATURE;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_project(root: &Path, name: &str, refs: &[&str], nature: &str) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let projects: String = refs.iter().map(|r| format!("<project>{r}</project>")).collect();
        std::fs::write(
            dir.join(PROJECT_FILE),
            format!(
                "<projectDescription><name>{name}</name><projects>{projects}</projects><natures><nature>{nature}</nature></natures></projectDescription>"
            ),
        )
        .unwrap();
    }

    fn descriptor(name: &str, dir: &str, origin: Origin) -> ProjectDescriptor {
        ProjectDescriptor::new(name, PathBuf::from(dir), Vec::new(), false, origin)
    }

    #[test]
    fn test_scan_skips_core_and_non_projects() {
        let temp = TempDir::new().unwrap();
        write_project(temp.path(), "Core", &[], CORE_NATURE);
        write_project(temp.path(), "Billing", &["Core"], "other.nature");
        std::fs::create_dir_all(temp.path().join("notes")).unwrap();
        std::fs::write(temp.path().join("README"), "x").unwrap();

        let found = scan_projects_dir(temp.path()).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Billing");
        assert_eq!(found[0].origin, Origin::ProjectsDir);
    }

    #[test]
    fn test_rescan_yields_equal_descriptors() {
        let temp = TempDir::new().unwrap();
        write_project(temp.path(), "A", &["Core"], "x");
        write_project(temp.path(), "B", &["A", "Core"], "x");

        let first = scan_projects_dir(temp.path()).unwrap();
        let second = scan_projects_dir(temp.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_scan_missing_root_is_error() {
        let temp = TempDir::new().unwrap();
        let result = scan_projects_dir(&temp.path().join("nope"));
        assert!(matches!(
            result,
            Err(DarbuildError::Filesystem(FilesystemError::ReadDir { .. }))
        ));
    }

    #[test]
    fn test_merge_prefers_workspace_descriptor() {
        let own = vec![descriptor("A", "/ws/A", Origin::Workspace)];
        let foreign = vec![
            descriptor("A", "/projects/A", Origin::ProjectsDir),
            descriptor("B", "/projects/B", Origin::ProjectsDir),
        ];

        let registry = Registry::merge(own, foreign);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("A").unwrap().origin, Origin::Workspace);
        assert_eq!(registry.get("B").unwrap().origin, Origin::ProjectsDir);
    }

    #[test]
    fn test_workspace_scan_has_core() {
        let scan = WorkspaceScan {
            descriptors: vec![ProjectDescriptor::new(
                "Core",
                "/ws/Core",
                Vec::new(),
                true,
                Origin::Workspace,
            )],
        };
        assert!(scan.has_core());
        assert!(!WorkspaceScan::default().has_core());
    }
}
