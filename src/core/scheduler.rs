//! Build ordering
//!
//! Computes a build order in which every project comes after the projects
//! it references. Core projects count as satisfied but are not built.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::descriptor::ProjectDescriptor;
use crate::core::discovery::Registry;
use crate::error::SchedulerError;

/// Ordered list of non-core projects to build
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    projects: Vec<ProjectDescriptor>,
}

impl BuildPlan {
    /// Projects in build order
    pub fn projects(&self) -> &[ProjectDescriptor] {
        &self.projects
    }

    /// Project names in build order
    pub fn names(&self) -> Vec<&str> {
        self.projects.iter().map(|p| p.name.as_str()).collect()
    }

    /// Number of projects to build
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether there is nothing to build
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl IntoIterator for BuildPlan {
    type Item = ProjectDescriptor;
    type IntoIter = std::vec::IntoIter<ProjectDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.into_iter()
    }
}

/// Compute the build plan for a registry
///
/// Repeatedly picks the first remaining project (in name order) whose
/// references are all loaded. Fails when a full pass finds none, which
/// covers both cycles and references to unknown projects.
pub fn schedule(registry: &Registry) -> Result<BuildPlan, SchedulerError> {
    let mut remaining: BTreeMap<&str, &ProjectDescriptor> =
        registry.iter().map(|p| (p.name.as_str(), p)).collect();
    let mut loaded: BTreeSet<&str> = BTreeSet::new();
    let mut plan = Vec::new();

    while !remaining.is_empty() {
        let next = remaining
            .values()
            .find(|p| {
                p.referenced_names
                    .iter()
                    .all(|dep| loaded.contains(dep.as_str()))
            })
            .copied();

        let Some(project) = next else {
            return Err(SchedulerError::Inconsistent {
                unresolved: remaining
                    .values()
                    .map(|p| {
                        let missing = p
                            .referenced_names
                            .iter()
                            .filter(|dep| !loaded.contains(dep.as_str()))
                            .cloned()
                            .collect();
                        (p.name.clone(), missing)
                    })
                    .collect(),
            });
        };

        if project.is_core {
            tracing::debug!("Core project '{}' satisfied", project.name);
        } else {
            plan.push(project.clone());
        }
        loaded.insert(project.name.as_str());
        remaining.remove(project.name.as_str());
    }

    Ok(BuildPlan { projects: plan })
}
