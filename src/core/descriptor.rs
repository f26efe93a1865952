//! Project descriptor parsing
//!
//! A descriptor is the identity, dependency set and core classification
//! of one project, read either from its `.project`/`.classpath` files or
//! from the live workspace record.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::config::layout::{CLASSPATH_FILE, CORE_NATURE, PROJECT_FILE};
use crate::core::workspace::LiveProject;
use crate::error::DescriptorError;
use crate::infra::filesystem;

/// Where a descriptor was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Known to the live workspace
    Workspace,
    /// Found by scanning the projects directory
    ProjectsDir,
}

/// Identity and metadata for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    /// Unique project name
    pub name: String,
    /// Location of project content
    pub directory: PathBuf,
    /// Names of referenced projects
    pub referenced_names: BTreeSet<String>,
    /// Whether this is the baseline core project
    pub is_core: bool,
    /// Discovery source
    pub origin: Origin,
}

impl ProjectDescriptor {
    /// Create a descriptor from its parts
    pub fn new(
        name: impl Into<String>,
        directory: impl Into<PathBuf>,
        referenced_names: impl IntoIterator<Item = String>,
        is_core: bool,
        origin: Origin,
    ) -> Self {
        let name = name.into();
        let referenced_names = referenced_names
            .into_iter()
            .filter(|referenced| *referenced != name)
            .collect();
        Self {
            name,
            directory: directory.into(),
            referenced_names,
            is_core,
            origin,
        }
    }

    /// Parse the descriptor files of a project directory
    pub fn from_directory(dir: &Path, origin: Origin) -> Result<Self, DescriptorError> {
        let project_file = dir.join(PROJECT_FILE);
        let content = read_document(&project_file)?;
        let description = ProjectDescription::parse(&project_file, &content)?;

        let referenced = description.references_in(dir)?;

        let name = description
            .name
            .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();

        Ok(Self::new(
            name,
            dir,
            referenced,
            description.natures.iter().any(|n| n == CORE_NATURE),
            origin,
        ))
    }

    /// Build a descriptor from the workspace's own record of a project
    pub fn from_live(project: &LiveProject) -> Self {
        Self::new(
            project.name.clone(),
            project.location.clone(),
            project.references.iter().cloned(),
            project.natures.iter().any(|n| n == CORE_NATURE),
            Origin::Workspace,
        )
    }
}

/// The parts of a `.project` document the builder cares about
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectDescription {
    /// Declared project name
    pub name: Option<String>,
    /// Referenced project names
    pub projects: Vec<String>,
    /// Nature identifiers
    pub natures: Vec<String>,
}

impl ProjectDescription {
    /// Parse a `.project` document
    pub fn parse(path: &Path, content: &str) -> Result<Self, DescriptorError> {
        let doc = parse_document(path, content)?;
        let root = doc.root_element();

        let name = child(root, "name")
            .and_then(trimmed_text)
            .filter(|n| !n.is_empty());

        let projects = child(root, "projects")
            .map(|projects| texts_of(projects, "project"))
            .unwrap_or_default();

        let natures = child(root, "natures")
            .map(|natures| texts_of(natures, "nature"))
            .unwrap_or_default();

        Ok(Self {
            name,
            projects,
            natures,
        })
    }

    /// Read and parse the `.project` file of a directory
    pub fn load(dir: &Path) -> Result<Self, DescriptorError> {
        let path = dir.join(PROJECT_FILE);
        let content = read_document(&path)?;
        Self::parse(&path, &content)
    }

    /// Declared projects together with the `.classpath` source references
    /// of `dir`, if that file exists
    pub fn references_in(&self, dir: &Path) -> Result<BTreeSet<String>, DescriptorError> {
        let mut referenced: BTreeSet<String> = self.projects.iter().cloned().collect();
        let classpath_file = dir.join(CLASSPATH_FILE);
        if classpath_file.exists() {
            let classpath = read_document(&classpath_file)?;
            referenced.extend(source_project_references(&classpath_file, &classpath)?);
        }
        Ok(referenced)
    }
}

/// Project names referenced by source entries of a `.classpath` document
///
/// Only `kind="src"` entries whose path is rooted at `/NAME` count.
pub fn source_project_references(
    path: &Path,
    content: &str,
) -> Result<Vec<String>, DescriptorError> {
    let doc = parse_document(path, content)?;
    Ok(doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("classpathentry"))
        .filter(|n| n.attribute("kind") == Some("src"))
        .filter_map(|n| n.attribute("path"))
        .filter_map(|p| p.strip_prefix('/'))
        .filter_map(|p| p.split('/').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

fn read_document(path: &Path) -> Result<String, DescriptorError> {
    let bytes = filesystem::read_bytes(path).map_err(|e| DescriptorError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn parse_document<'a>(path: &Path, content: &'a str) -> Result<Document<'a>, DescriptorError> {
    Document::parse(content).map_err(|e| DescriptorError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn trimmed_text(node: Node<'_, '_>) -> Option<String> {
    node.text().map(|t| t.trim().to_string())
}

fn texts_of(node: Node<'_, '_>, tag: &str) -> Vec<String> {
    node.children()
        .filter(|n| n.has_tag_name(tag))
        .filter_map(trimmed_text)
        .filter(|t| !t.is_empty())
        .collect()
}
