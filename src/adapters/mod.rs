// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing port implementations.
//!
//! This module contains concrete implementations of the traits defined in the
//! ports layer: the YAML parser and file source, the environment overlay, local
//! file storage and the compiled-in plugin module catalog.

#[cfg(feature = "env")]
pub mod env_var;
pub mod local_storage;
pub mod module_catalog;
#[cfg(feature = "yaml")]
pub mod yaml_file;

// Re-export adapters based on feature flags
#[cfg(feature = "env")]
pub use env_var::EnvVarAdapter;
pub use local_storage::LocalStorage;
pub use module_catalog::ModuleCatalog;
#[cfg(feature = "yaml")]
pub use yaml_file::{YamlFileSource, YamlParser};
