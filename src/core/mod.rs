//! Core business logic module
//!
//! This module contains the build logic for darbuild. Low-level file
//! operations go through [`crate::infra::filesystem`]; the live workspace is
//! reached only through the [`workspace::Workspace`] trait.
//!
//! # Submodules
//!
//! - [`descriptor`] - Project descriptor (`.project`, `.classpath`) parsing
//! - [`discovery`] - Workspace and projects directory scans
//! - [`scheduler`] - Dependency ordering
//! - [`fingerprint`] - Change timestamp derivation
//! - [`orchestrator`] - Build run state machine
//! - [`settings`] - Settings file handling
//! - [`workspace`] - Live workspace interface

pub mod descriptor;
pub mod discovery;
pub mod fingerprint;
pub mod orchestrator;
pub mod scheduler;
pub mod settings;
pub mod workspace;
