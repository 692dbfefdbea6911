// SPDX-License-Identifier: MIT OR Apache-2.0

//! A small application-scaffolding crate.
//!
//! This crate provides a hierarchical configuration model with dotted-path
//! access, layered defaults, environment-variable overrides and
//! `{config:<path>}` string templates, plus plugin discovery into an explicit
//! registry, a small persisted key/value state and a path-template layout of
//! the application's files, all tied together by an `Environment`.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types and logic (`ConfigKey`, `ConfigValue`, `ConfigNode`,
//!   the plugin registry, errors)
//! - **Ports**: Trait definitions at the seams (`ConfigParser`, `ConfigSource`,
//!   `Storage`, `ModuleLoader`)
//! - **Adapters**: Implementations of the ports (YAML, environment variables, the
//!   local filesystem, a compiled-in module catalog)
//! - **Service**: Composition of the above (`ConfigFile`, `ConfigApplicator`,
//!   `PluginLoader`, `State`, the `Directory`/`File` layout, `Environment`)
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML parsing and file support (default)
//! - `env`: Enable the environment-variable overlay (default)
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use appscaffold::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = ConfigNode::new();
//! config.set("server.port", 8080i64)?;
//! config.set("paths.root", "/srv/app")?;
//!
//! // interior levels come back as views, leaves as values
//! let server = config.get("server").unwrap_node();
//! assert_eq!(server.get("port"), 8080i64);
//!
//! let applicator = ConfigApplicator::new(&config);
//! assert_eq!(applicator.apply("{config:paths.root}/logs")?, "/srv/app/logs");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        ConfigError, ConfigKey, ConfigNode, ConfigValue, Entry, Plugin, PluginRegistry,
        PluginType, Result,
    };
    pub use crate::ports::{ConfigParser, ConfigSource, ModuleLoader, Storage};
    pub use crate::service::{
        ConfigApplicator, ConfigFile, Directory, Environment, LayoutNode, PluginLoader, State,
    };

    pub use crate::adapters::{LocalStorage, ModuleCatalog};
    // Re-export adapters based on feature flags
    #[cfg(feature = "env")]
    pub use crate::adapters::EnvVarAdapter;
    #[cfg(feature = "yaml")]
    pub use crate::adapters::{YamlFileSource, YamlParser};
}
