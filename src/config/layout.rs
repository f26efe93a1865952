//! Project file layout
//!
//! Relative paths inside a DAR project directory.

/// Project description file
pub const PROJECT_FILE: &str = ".project";

/// Build path configuration file
pub const CLASSPATH_FILE: &str = ".classpath";

/// Nature marking the baseline core project
pub const CORE_NATURE: &str = "com.emc.ide.project.dmCoreProjectNatureId";

/// Tracked build descriptor, excluded from the content tree scan
pub const TRACKED_DESCRIPTOR: &str = "dar/default.dardef";

/// Suffix of the sidecar reference snapshot next to the tracked descriptor
pub const SIDECAR_SUFFIX: &str = ".ref";

/// Relative path prefixes that count as build-relevant content
pub const CONTENT_PREFIXES: &[&str] = &["Artifacts/", "content/", "dar/"];

/// Build output subfolder
pub const BUILD_OUTPUT_DIR: &str = "bin-dar";

/// Extensions of the two artifacts every built project produces
pub const ARTIFACT_EXTENSIONS: &[&str] = &["dar", "installparam"];

/// Workspace state directory and file under the workspace root
pub const WORKSPACE_METADATA_DIR: &str = ".metadata";
pub const WORKSPACE_STATE_FILE: &str = "workspace.toml";

/// Sidecar path for the tracked descriptor
pub fn sidecar_path() -> String {
    format!("{TRACKED_DESCRIPTOR}{SIDECAR_SUFFIX}")
}

/// Artifact file names for a project
pub fn artifact_names(project: &str) -> Vec<String> {
    ARTIFACT_EXTENSIONS
        .iter()
        .map(|ext| format!("{project}.{ext}"))
        .collect()
}
