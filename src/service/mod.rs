// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer composing the domain with the ports.
//!
//! This module contains the file-backed configuration, token substitution,
//! plugin discovery, persisted state, the on-disk layout and the
//! [`Environment`] that ties them together.

pub mod applicator;
pub mod config_file;
pub mod environment;
pub mod layout;
pub mod plugin_loader;
pub mod state;

// Re-export commonly used types
pub use applicator::ConfigApplicator;
pub use config_file::{ConfigFile, ConfigFileBuilder};
pub use environment::{Environment, EnvironmentBuilder};
pub use layout::{Directory, File, LayoutNode};
pub use plugin_loader::{LoadReport, PluginLoader};
pub use state::State;
