//! Build orchestration logic
//!
//! Coordinates one headless run: discovery, core project bootstrap,
//! ordering, then the sequential build-and-collect loop. The workspace is
//! borrowed mutably for the whole run and its auto-build setting is
//! switched off until the run ends, successfully or not.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Serialize, Serializer};

use crate::config::layout::{artifact_names, BUILD_OUTPUT_DIR};
use crate::core::descriptor::{Origin, ProjectDescriptor};
use crate::core::discovery::{self, Registry};
use crate::core::fingerprint::{ChangeTracker, FingerprintSource};
use crate::core::scheduler::{self, BuildPlan};
use crate::core::workspace::{BuildKind, Diagnostic, DiagnosticDepth, Workspace};
use crate::error::{BuildError, DarbuildError, WorkspaceError};
use crate::infra::filesystem;

/// Inputs of a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory scanned for foreign projects
    pub projects_dir: PathBuf,
    /// Directory receiving the artifacts
    pub output_dir: PathBuf,
    /// Incrementally build referenced projects before each project
    pub prebuild_references: bool,
}

/// Orchestrator run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Preparing,
    Discovering,
    Bootstrapping,
    Ordering,
    Building,
    Restoring,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Progress notifications emitted during a run
#[derive(Debug)]
pub enum BuildEvent<'a> {
    /// Build order computed
    Planned { projects: &'a [ProjectDescriptor] },
    /// A project is about to be built
    Started { project: &'a str, index: usize },
    /// A project was built and its artifacts collected
    Finished { project: &'a BuiltProject },
}

/// One successfully built project
#[derive(Debug, Clone, Serialize)]
pub struct BuiltProject {
    /// Project name
    pub name: String,
    /// Timestamp applied to the artifacts
    #[serde(serialize_with = "unix_seconds")]
    pub fingerprint: SystemTime,
    /// How the timestamp was derived
    pub fingerprint_source: FingerprintSource,
    /// Copied artifacts in the output directory
    pub artifacts: Vec<PathBuf>,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Projects in build order
    pub built: Vec<BuiltProject>,
}

fn unix_seconds<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    let secs = time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
    serializer.serialize_u64(secs)
}

/// Scoped override of the workspace auto-build setting
///
/// Disables auto-build on creation and restores the prior value when
/// released or dropped.
pub struct AutoBuildOverride<'a, W: Workspace + ?Sized> {
    workspace: &'a mut W,
    prior: bool,
    released: bool,
}

impl<'a, W: Workspace + ?Sized> AutoBuildOverride<'a, W> {
    /// Turn auto-build off, remembering the current value
    pub fn disable(workspace: &'a mut W) -> Result<Self, WorkspaceError> {
        let prior = workspace.auto_build()?;
        if prior {
            workspace.set_auto_build(false)?;
        }
        tracing::debug!("Auto-build disabled (was {prior})");
        Ok(Self {
            workspace,
            prior,
            released: false,
        })
    }

    /// Value auto-build had before the override
    pub fn prior(&self) -> bool {
        self.prior
    }

    /// Restore the prior value, reporting failure
    pub fn release(mut self) -> Result<(), WorkspaceError> {
        self.released = true;
        self.restore()
    }

    fn restore(&mut self) -> Result<(), WorkspaceError> {
        if self.workspace.auto_build()? != self.prior {
            self.workspace.set_auto_build(self.prior)?;
        }
        tracing::debug!("Auto-build restored to {}", self.prior);
        Ok(())
    }
}

impl<W: Workspace + ?Sized> Deref for AutoBuildOverride<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        self.workspace
    }
}

impl<W: Workspace + ?Sized> DerefMut for AutoBuildOverride<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        self.workspace
    }
}

impl<W: Workspace + ?Sized> Drop for AutoBuildOverride<'_, W> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.restore() {
                tracing::warn!("Failed to restore auto-build setting: {e}");
            }
        }
    }
}

type Observer<'w> = Box<dyn FnMut(BuildEvent<'_>) + 'w>;

/// Headless build orchestrator
pub struct Orchestrator<'w, W: Workspace + ?Sized> {
    workspace: &'w mut W,
    options: RunOptions,
    state: RunState,
    observer: Option<Observer<'w>>,
}

impl<'w, W: Workspace + ?Sized> Orchestrator<'w, W> {
    /// Create an orchestrator over a workspace
    pub fn new(workspace: &'w mut W, options: RunOptions) -> Self {
        Self {
            workspace,
            options,
            state: RunState::Idle,
            observer: None,
        }
    }

    /// Receive progress notifications
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(BuildEvent<'_>) + 'w) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the run
    ///
    /// The first error aborts the run. Artifacts already copied for
    /// earlier projects are left in place.
    pub fn run(&mut self) -> Result<BuildReport, DarbuildError> {
        let result = self.execute();
        if let Err(e) = &result {
            tracing::error!("Run failed during {}: {e}", self.state);
            enter(&mut self.state, RunState::Failed);
        }
        result
    }

    fn execute(&mut self) -> Result<BuildReport, DarbuildError> {
        enter(&mut self.state, RunState::Preparing);
        filesystem::create_dir_all(&self.options.output_dir)?;
        let mut workspace = AutoBuildOverride::disable(&mut *self.workspace)?;

        enter(&mut self.state, RunState::Discovering);
        let foreign = discovery::scan_projects_dir(&self.options.projects_dir)?;
        let mut own = discovery::scan_workspace(&*workspace)?;
        if !own.has_core() {
            enter(&mut self.state, RunState::Bootstrapping);
            tracing::info!("No core project in workspace, creating one");
            workspace.create_core_projects()?;
            own = discovery::scan_workspace(&*workspace)?;
            if !own.has_core() {
                return Err(BuildError::MissingCoreProject.into());
            }
        }
        let registry = Registry::merge(own.descriptors, foreign);
        tracing::info!("Discovered {} projects", registry.len());

        enter(&mut self.state, RunState::Ordering);
        let plan = scheduler::schedule(&registry)?;
        tracing::info!("Build order: {}", plan.names().join(", "));
        notify(
            &mut self.observer,
            BuildEvent::Planned {
                projects: plan.projects(),
            },
        );

        enter(&mut self.state, RunState::Building);
        let mut report = BuildReport::default();
        let mut built = BTreeSet::new();
        for (index, project) in plan.projects().iter().enumerate() {
            notify(
                &mut self.observer,
                BuildEvent::Started {
                    project: &project.name,
                    index,
                },
            );
            let outcome = build_project(&mut *workspace, &registry, &built, project, &self.options)?;
            notify(
                &mut self.observer,
                BuildEvent::Finished { project: &outcome },
            );
            built.insert(outcome.name.clone());
            report.built.push(outcome);
        }

        enter(&mut self.state, RunState::Restoring);
        workspace.release()?;

        enter(&mut self.state, RunState::Done);
        Ok(report)
    }
}

/// Compute the build order without touching the workspace
///
/// A missing core project is assumed to be created as `core_project`,
/// the way a real run would bootstrap it.
pub fn preview<W: Workspace + ?Sized>(
    workspace: &W,
    projects_dir: &Path,
    core_project: &str,
) -> Result<BuildPlan, DarbuildError> {
    let foreign = discovery::scan_projects_dir(projects_dir)?;
    let mut own = discovery::scan_workspace(workspace)?;
    if !own.has_core() {
        tracing::info!("No core project in workspace; a run would create '{core_project}'");
        own.descriptors.push(ProjectDescriptor::new(
            core_project,
            PathBuf::new(),
            Vec::new(),
            true,
            Origin::Workspace,
        ));
    }
    Ok(scheduler::schedule(&Registry::merge(own.descriptors, foreign))?)
}

fn enter(state: &mut RunState, next: RunState) {
    tracing::debug!("Run state {state} -> {next}");
    *state = next;
}

fn notify(observer: &mut Option<Observer<'_>>, event: BuildEvent<'_>) {
    if let Some(observer) = observer.as_mut() {
        observer(event);
    }
}

/// Materialize, fingerprint, build and collect one project
fn build_project<W: Workspace + ?Sized>(
    workspace: &mut W,
    registry: &Registry,
    built: &BTreeSet<String>,
    project: &ProjectDescriptor,
    options: &RunOptions,
) -> Result<BuiltProject, DarbuildError> {
    tracing::info!("Building project: {}", project.name);

    workspace.materialize_or_refresh(project)?;
    let fingerprint = ChangeTracker::new(&project.directory).fingerprint()?;

    if options.prebuild_references {
        let mut visited = BTreeSet::new();
        prebuild_references(workspace, registry, built, &project.name, &mut visited)?;
    }

    for kind in [BuildKind::Clean, BuildKind::Full] {
        workspace
            .build(&project.name, kind)
            .map_err(|e| build_failed(&project.name, e))?;
    }

    let errors: Vec<Diagnostic> = workspace
        .diagnostics(&project.name, DiagnosticDepth::One)
        .map_err(|e| build_failed(&project.name, e))?
        .into_iter()
        .filter(Diagnostic::is_error)
        .collect();
    if let Some(first) = errors.first() {
        for diagnostic in &errors {
            tracing::error!(
                "{}/{}: {}",
                project.name,
                diagnostic.resource,
                diagnostic.message
            );
        }
        return Err(BuildError::BuildFailed {
            project: project.name.clone(),
            reason: format!(
                "{} error diagnostic(s), first: {}",
                errors.len(),
                first.message
            ),
        }
        .into());
    }

    let artifacts = collect_artifacts(project, &options.output_dir, fingerprint.timestamp)?;
    tracing::info!("Built project: {}", project.name);

    Ok(BuiltProject {
        name: project.name.clone(),
        fingerprint: fingerprint.timestamp,
        fingerprint_source: fingerprint.source,
        artifacts,
    })
}

/// Incrementally build the transitive workspace references of `name`
///
/// The plan already orders projects, so this only catches ordering
/// defects; a reference that has not been built in this run is logged.
fn prebuild_references<W: Workspace + ?Sized>(
    workspace: &mut W,
    registry: &Registry,
    built: &BTreeSet<String>,
    name: &str,
    visited: &mut BTreeSet<String>,
) -> Result<(), DarbuildError> {
    for reference in workspace.referenced_projects(name)? {
        if !visited.insert(reference.clone()) {
            continue;
        }
        prebuild_references(workspace, registry, built, &reference, visited)?;

        match registry.get(&reference) {
            Some(d) if d.is_core || built.contains(&reference) => {}
            _ => tracing::warn!(
                "Project '{reference}' referenced by '{name}' was not built earlier in this run"
            ),
        }
        workspace
            .build(&reference, BuildKind::Incremental)
            .map_err(|e| build_failed(&reference, e))?;
    }
    Ok(())
}

fn build_failed(project: &str, error: WorkspaceError) -> DarbuildError {
    BuildError::BuildFailed {
        project: project.to_string(),
        reason: error.to_string(),
    }
    .into()
}

/// Copy the project's artifacts to the output directory
fn collect_artifacts(
    project: &ProjectDescriptor,
    output_dir: &Path,
    fingerprint: SystemTime,
) -> Result<Vec<PathBuf>, DarbuildError> {
    let build_output = project.directory.join(BUILD_OUTPUT_DIR);
    let mut copied = Vec::new();
    for file_name in artifact_names(&project.name) {
        let source = build_output.join(&file_name);
        if !source.is_file() {
            return Err(BuildError::ArtifactMissing {
                project: project.name.clone(),
                path: source,
            }
            .into());
        }
        let target = output_dir.join(&file_name);
        filesystem::copy_with_mtime(&source, &target, fingerprint)?;
        tracing::debug!("Copied {} -> {}", source.display(), target.display());
        copied.push(target);
    }
    Ok(copied)
}
