//! Infrastructure layer
//!
//! Handles I/O operations: filesystem, platform directories, and the
//! external build engine process.

pub mod dirs;
pub mod engine;
pub mod filesystem;
pub mod workspace;
