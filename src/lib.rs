//! darbuild - Headless builder for Documentum DAR projects
//!
//! Builds a set of interdependent DAR projects in dependency order against
//! a live workspace and collects the produced artifacts, stamped with a
//! change timestamp, into one output directory.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Discovery, scheduling, fingerprinting and orchestration
//! - [`infra`] - Infrastructure layer (filesystem, directories, build engine, workspace store)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
