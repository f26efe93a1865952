//! Configuration and constants
//!
//! - [`defaults`] - Default values
//! - [`layout`] - Project file layout

pub mod defaults;
pub mod layout;
