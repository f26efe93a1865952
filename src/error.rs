//! Error types for darbuild
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Run configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required parameter not supplied
    #[error("Parameter '{name}' is mandatory")]
    MissingParameter { name: String },

    /// Launcher parameter name without the leading dash
    #[error("Malformed parameter name '{name}'")]
    MalformedParameter { name: String },

    /// Launcher parameter name without a value
    #[error("Parameter '{name}' has no value")]
    MissingValue { name: String },

    /// Projects directory does not exist
    #[error("Projects directory does not exist: {path}")]
    ProjectsDirNotFound { path: PathBuf },

    /// Settings file could not be read or parsed
    #[error("Invalid settings file '{path}': {error}")]
    Settings { path: PathBuf, error: String },
}

/// Project descriptor errors
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// Descriptor file missing or unreadable
    #[error("Failed to read project descriptor '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Descriptor file is not a well-formed document
    #[error("Failed to parse project descriptor '{path}': {error}")]
    Parse { path: PathBuf, error: String },
}

/// Build ordering errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Cycle or dangling reference, nothing left can be scheduled
    #[error("Project dependencies are inconsistent: {}", describe_unresolved(.unresolved))]
    Inconsistent {
        /// Stuck projects with the names they still wait for
        unresolved: Vec<(String, Vec<String>)>,
    },
}

fn describe_unresolved(unresolved: &[(String, Vec<String>)]) -> String {
    unresolved
        .iter()
        .map(|(project, missing)| format!("{project} -> [{}]", missing.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Per-project build errors
#[derive(Error, Debug)]
pub enum BuildError {
    /// Bootstrap did not yield a core project
    #[error("Missing core project: none found in the workspace after bootstrap")]
    MissingCoreProject,

    /// Engine fault or error diagnostics
    #[error("Build failed for project '{project}': {reason}")]
    BuildFailed { project: String, reason: String },

    /// Expected output file absent after the build
    #[error("Artifact missing for project '{project}': {path}")]
    ArtifactMissing { project: String, path: PathBuf },
}

/// Live workspace (hosting environment) errors
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Project unknown to the workspace
    #[error("Project '{name}' is not known to the workspace")]
    UnknownProject { name: String },

    /// Workspace state file could not be read or written
    #[error("Workspace state error for '{path}': {error}")]
    State { path: PathBuf, error: String },

    /// Build engine failed to run or reported a fault
    #[error("Build engine failed for '{project}': {error}")]
    Engine { project: String, error: String },

    /// No build engine command configured
    #[error("No build engine configured. Set [engine] command in the settings file")]
    EngineNotConfigured,

    /// Descriptor error while materializing
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Filesystem error while materializing
    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to list directory
    #[error("Failed to list directory '{path}': {error}")]
    ReadDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to read or set a modification time
    #[error("Failed to access modification time of '{path}': {error}")]
    Timestamp { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },
}

/// Top-level darbuild error type
#[derive(Error, Debug)]
pub enum DarbuildError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Descriptor error
    #[error("Discovery error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Scheduler error
    #[error("Scheduling error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Workspace error
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inconsistent_lists_every_stuck_project() {
        let err = SchedulerError::Inconsistent {
            unresolved: vec![
                ("a".to_string(), vec!["b".to_string()]),
                ("b".to_string(), vec!["a".to_string()]),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("a -> [b]"));
        assert!(message.contains("b -> [a]"));
    }

    #[test]
    fn test_top_level_wraps_build_error() {
        let err: DarbuildError = BuildError::MissingCoreProject.into();
        assert!(err.to_string().starts_with("Build error:"));
    }
}
