// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and logic.
//!
//! This module contains the configuration tree, its dotted-path addressing and
//! layering rules, and the plugin registry. It is independent of files, the
//! process environment and any other external concern.

pub mod config_key;
pub mod config_node;
pub mod config_value;
pub mod errors;
pub mod plugin;
pub mod value_tree;

// Re-export commonly used types
pub use config_key::ConfigKey;
pub use config_node::{ConfigNode, ConfigOptions, Entry};
pub use config_value::{ConfigValue, Mapping};
pub use errors::{ConfigError, Result};
pub use plugin::{Plugin, PluginRegistry, PluginType};
pub use value_tree::ValueTree;
