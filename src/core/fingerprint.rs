//! Change tracking
//!
//! Computes the effective last-modified time of a project's
//! build-relevant content. The result is stamped onto the project's
//! artifacts; it never decides whether a build runs.
//!
//! The tracked descriptor (`dar/default.dardef`) is rewritten by the build
//! engine on every build, so its own mtime is not trusted. A sidecar copy
//! (`dar/default.dardef.ref`) records the last content that counted, and
//! the descriptor's mtime only wins when its content really changed.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use walkdir::WalkDir;

use crate::config::layout::{sidecar_path, CONTENT_PREFIXES, TRACKED_DESCRIPTOR};
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// How a fingerprint was derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintSource {
    /// First run, sidecar created
    Initial,
    /// Latest content tree change
    ContentTree,
    /// Descriptor-only edit detected
    DescriptorEdit,
}

/// Effective last-modified time of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    /// Timestamp stamped onto artifacts
    pub timestamp: SystemTime,
    /// Derivation
    pub source: FingerprintSource,
}

/// Per-project change tracker
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    project_dir: PathBuf,
}

impl ChangeTracker {
    /// Create a tracker for a project directory
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// Path of the tracked descriptor
    pub fn descriptor_path(&self) -> PathBuf {
        self.project_dir.join(TRACKED_DESCRIPTOR)
    }

    /// Path of the sidecar reference snapshot
    pub fn sidecar_path(&self) -> PathBuf {
        self.project_dir.join(sidecar_path())
    }

    /// Latest mtime of build-relevant content, excluding the tracked descriptor
    pub fn tree_time(&self) -> Result<SystemTime, FilesystemError> {
        let mut latest = UNIX_EPOCH;
        for entry in WalkDir::new(&self.project_dir).min_depth(1) {
            let entry = entry.map_err(|e| FilesystemError::ReadDir {
                path: e
                    .path()
                    .map_or_else(|| self.project_dir.clone(), Path::to_path_buf),
                error: e.to_string(),
            })?;
            if !entry.file_type().is_file() || !self.is_content(entry.path()) {
                continue;
            }
            let mtime = entry
                .metadata()
                .map_err(|e| FilesystemError::Timestamp {
                    path: entry.path().to_path_buf(),
                    error: e.to_string(),
                })?
                .modified()
                .map_err(|e| FilesystemError::Timestamp {
                    path: entry.path().to_path_buf(),
                    error: e.to_string(),
                })?;
            latest = latest.max(mtime);
        }
        Ok(latest)
    }

    fn is_content(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.project_dir) else {
            return false;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        relative != TRACKED_DESCRIPTOR
            && CONTENT_PREFIXES
                .iter()
                .any(|prefix| relative.starts_with(prefix))
    }

    /// Compute the fingerprint, creating or refreshing the sidecar as needed
    pub fn fingerprint(&self) -> Result<Fingerprint, FilesystemError> {
        let tree_time = self.tree_time()?;
        let descriptor = self.descriptor_path();
        let sidecar = self.sidecar_path();

        if !descriptor.is_file() {
            tracing::debug!(
                "No tracked descriptor in {}, using content tree time",
                self.project_dir.display()
            );
            return Ok(Fingerprint {
                timestamp: tree_time,
                source: FingerprintSource::ContentTree,
            });
        }

        if !sidecar.exists() {
            let content = filesystem::read_bytes(&descriptor)?;
            filesystem::write_bytes_with_mtime(&sidecar, &content, tree_time)?;
            tracing::debug!("Created reference snapshot {}", sidecar.display());
            return Ok(Fingerprint {
                timestamp: tree_time,
                source: FingerprintSource::Initial,
            });
        }

        let descr_time = filesystem::modified_time(&descriptor)?;
        let snapshot_time = filesystem::modified_time(&sidecar)?;
        if snapshot_time < descr_time && tree_time < descr_time {
            let current = filesystem::read_bytes(&descriptor)?;
            let saved = filesystem::read_bytes(&sidecar)?;
            if current != saved {
                filesystem::write_bytes_with_mtime(&sidecar, &current, descr_time)?;
                tracing::info!(
                    "Descriptor-only change detected in {}",
                    self.project_dir.display()
                );
                return Ok(Fingerprint {
                    timestamp: descr_time,
                    source: FingerprintSource::DescriptorEdit,
                });
            }
        }

        Ok(Fingerprint {
            timestamp: tree_time,
            source: FingerprintSource::ContentTree,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn write_at(root: &Path, relative: &str, content: &str, secs: u64) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        filesystem::set_modified(&path, at(secs)).unwrap();
    }

    fn setup() -> (TempDir, ChangeTracker) {
        let temp = TempDir::new().unwrap();
        write_at(temp.path(), "Artifacts/types/doc.type", "type", 1_000);
        write_at(temp.path(), "content/file.txt", "content", 2_000);
        write_at(temp.path(), "dar/default.dardef", "<dardef v1/>", 5_000);
        write_at(temp.path(), "src/Main.java", "ignored", 9_000);
        let tracker = ChangeTracker::new(temp.path());
        (temp, tracker)
    }

    #[test]
    fn test_tree_time_excludes_descriptor_and_unlisted_paths() {
        let (_temp, tracker) = setup();
        assert_eq!(tracker.tree_time().unwrap(), at(2_000));
    }

    #[test]
    fn test_empty_project_tree_time_is_epoch() {
        let temp = TempDir::new().unwrap();
        assert_eq!(ChangeTracker::new(temp.path()).tree_time().unwrap(), UNIX_EPOCH);
    }

    #[test]
    fn test_first_run_creates_sidecar() {
        let (_temp, tracker) = setup();

        let fingerprint = tracker.fingerprint().unwrap();

        assert_eq!(fingerprint.timestamp, at(2_000));
        assert_eq!(fingerprint.source, FingerprintSource::Initial);
        assert_eq!(
            std::fs::read_to_string(tracker.sidecar_path()).unwrap(),
            "<dardef v1/>"
        );
        assert_eq!(
            filesystem::modified_time(&tracker.sidecar_path()).unwrap(),
            at(2_000)
        );
    }

    #[test]
    fn test_unchanged_second_run_is_stable() {
        let (_temp, tracker) = setup();
        let first = tracker.fingerprint().unwrap();

        let second = tracker.fingerprint().unwrap();

        assert_eq!(second.timestamp, first.timestamp);
        assert_eq!(second.source, FingerprintSource::ContentTree);
        assert_eq!(
            filesystem::modified_time(&tracker.sidecar_path()).unwrap(),
            at(2_000)
        );
        assert_eq!(
            std::fs::read_to_string(tracker.sidecar_path()).unwrap(),
            "<dardef v1/>"
        );
    }

    #[test]
    fn test_descriptor_only_edit_uses_descriptor_time() {
        let (temp, tracker) = setup();
        tracker.fingerprint().unwrap();
        write_at(temp.path(), "dar/default.dardef", "<dardef v2/>", 7_000);

        let fingerprint = tracker.fingerprint().unwrap();

        assert_eq!(fingerprint.timestamp, at(7_000));
        assert_eq!(fingerprint.source, FingerprintSource::DescriptorEdit);
        assert_eq!(
            std::fs::read_to_string(tracker.sidecar_path()).unwrap(),
            "<dardef v2/>"
        );
        assert_eq!(
            filesystem::modified_time(&tracker.sidecar_path()).unwrap(),
            at(7_000)
        );

        // the refreshed sidecar keeps the next unchanged run on the same time
        let again = tracker.fingerprint().unwrap();
        assert_eq!(again.timestamp, at(7_000));
        assert_eq!(again.source, FingerprintSource::ContentTree);
    }

    #[test]
    fn test_rewrite_with_same_content_is_ignored() {
        let (temp, tracker) = setup();
        tracker.fingerprint().unwrap();
        write_at(temp.path(), "dar/default.dardef", "<dardef v1/>", 7_000);

        let fingerprint = tracker.fingerprint().unwrap();

        assert_eq!(fingerprint.timestamp, at(2_000));
        assert_eq!(
            filesystem::modified_time(&tracker.sidecar_path()).unwrap(),
            at(2_000)
        );
    }

    #[test]
    fn test_content_edit_uses_tree_time_and_keeps_sidecar() {
        let (temp, tracker) = setup();
        tracker.fingerprint().unwrap();
        write_at(temp.path(), "content/file.txt", "changed", 8_000);

        let fingerprint = tracker.fingerprint().unwrap();

        assert_eq!(fingerprint.timestamp, at(8_000));
        assert_eq!(fingerprint.source, FingerprintSource::ContentTree);
        assert_eq!(
            filesystem::modified_time(&tracker.sidecar_path()).unwrap(),
            at(2_000)
        );
    }

    #[test]
    fn test_missing_descriptor_creates_no_sidecar() {
        let temp = TempDir::new().unwrap();
        write_at(temp.path(), "content/file.txt", "content", 3_000);
        let tracker = ChangeTracker::new(temp.path());

        let fingerprint = tracker.fingerprint().unwrap();

        assert_eq!(fingerprint.timestamp, at(3_000));
        assert!(!tracker.sidecar_path().exists());
    }
}
