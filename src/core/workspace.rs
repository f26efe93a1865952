//! Live workspace interface
//!
//! The hosting environment that materializes projects, owns the
//! auto-build toggle and runs the external build engine. The orchestrator
//! only talks to it through [`Workspace`], so tests can substitute a fake.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::descriptor::ProjectDescriptor;
use crate::error::WorkspaceError;

/// A project as the live workspace knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveProject {
    /// Project name
    pub name: String,
    /// Location of the project content
    pub location: PathBuf,
    /// Names of referenced projects, as recorded by the workspace
    #[serde(default)]
    pub references: Vec<String>,
    /// Nature identifiers
    #[serde(default)]
    pub natures: Vec<String>,
}

/// Kind of build requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    /// Discard previous build state
    Clean,
    /// Build everything
    Full,
    /// Build what changed
    Incremental,
}

impl BuildKind {
    /// Lowercase identifier passed to external engines
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Full => "full",
            Self::Incremental => "incremental",
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A finding reported by the build engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Project-relative resource path, empty for the project itself
    #[serde(default)]
    pub resource: String,
    /// Human readable message
    #[serde(default)]
    pub message: String,
}

impl Diagnostic {
    /// Whether this diagnostic fails a build
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// How far below the project resource diagnostics are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticDepth {
    /// The project resource only
    Zero,
    /// The project resource and its immediate children
    One,
    /// Everything in the project
    Infinite,
}

impl DiagnosticDepth {
    /// Whether a diagnostic on `resource` falls within this depth
    pub fn admits(self, resource: &str) -> bool {
        let depth = resource
            .split('/')
            .filter(|segment| !segment.is_empty())
            .count();
        match self {
            Self::Zero => depth == 0,
            Self::One => depth <= 1,
            Self::Infinite => true,
        }
    }
}

/// The live hosting environment
pub trait Workspace {
    /// All projects currently known to the workspace
    fn projects(&self) -> Result<Vec<LiveProject>, WorkspaceError>;

    /// Current auto-build setting
    fn auto_build(&self) -> Result<bool, WorkspaceError>;

    /// Change the auto-build setting
    fn set_auto_build(&mut self, enabled: bool) -> Result<(), WorkspaceError>;

    /// Create the baseline core projects the workspace requires
    fn create_core_projects(&mut self) -> Result<(), WorkspaceError>;

    /// Create and open the project if absent, refresh it from disk otherwise
    fn materialize_or_refresh(&mut self, project: &ProjectDescriptor)
        -> Result<(), WorkspaceError>;

    /// Names of the projects `name` references in the workspace
    fn referenced_projects(&self, name: &str) -> Result<Vec<String>, WorkspaceError>;

    /// Run the build engine on a project
    fn build(&mut self, name: &str, kind: BuildKind) -> Result<(), WorkspaceError>;

    /// Diagnostics from the last build of a project
    fn diagnostics(
        &self,
        name: &str,
        depth: DiagnosticDepth,
    ) -> Result<Vec<Diagnostic>, WorkspaceError>;
}
