//! External build engine invocation
//!
//! Runs the configured engine command once per build request. The command
//! receives the build kind and the project directory as trailing arguments,
//! plus `DARBUILD_PROJECT`, `DARBUILD_PROJECT_DIR` and `DARBUILD_BUILD_KIND`
//! in its environment. Every stdout line that is a JSON [`Diagnostic`] is
//! collected; anything else is passed to the log.

use std::path::Path;
use std::process::Command;

use crate::core::workspace::{BuildKind, Diagnostic};
use crate::error::WorkspaceError;

/// Environment variables passed to the engine
pub const ENV_PROJECT: &str = "DARBUILD_PROJECT";
pub const ENV_PROJECT_DIR: &str = "DARBUILD_PROJECT_DIR";
pub const ENV_BUILD_KIND: &str = "DARBUILD_BUILD_KIND";

/// Build engine driven through an external command
#[derive(Debug, Clone, Default)]
pub struct CommandEngine {
    command: Vec<String>,
}

impl CommandEngine {
    /// Create an engine from a program and its leading arguments
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Whether a command is configured
    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }

    /// Run one build and return the diagnostics it reported
    pub fn run(
        &self,
        project: &str,
        project_dir: &Path,
        kind: BuildKind,
    ) -> Result<Vec<Diagnostic>, WorkspaceError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(WorkspaceError::EngineNotConfigured)?;

        tracing::debug!("Running {kind} build of '{project}' with {program}");
        let output = Command::new(program)
            .args(args)
            .arg(kind.as_str())
            .arg(project_dir)
            .current_dir(project_dir)
            .env(ENV_PROJECT, project)
            .env(ENV_PROJECT_DIR, project_dir)
            .env(ENV_BUILD_KIND, kind.as_str())
            .output()
            .map_err(|e| WorkspaceError::Engine {
                project: project.to_string(),
                error: format!("failed to start '{program}': {e}"),
            })?;

        let diagnostics = parse_diagnostics(&String::from_utf8_lossy(&output.stdout));

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WorkspaceError::Engine {
                project: project.to_string(),
                error: format!("{kind} build exited with {}: {}", output.status, stderr.trim()),
            });
        }

        Ok(diagnostics)
    }
}

/// Extract diagnostics from engine output
pub fn parse_diagnostics(output: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match serde_json::from_str::<Diagnostic>(line) {
            Ok(diagnostic) => diagnostics.push(diagnostic),
            Err(_) => tracing::debug!("engine: {line}"),
        }
    }
    diagnostics
}
