// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin discovery.
//!
//! [`PluginLoader`] walks a plugin directory tree, hands each module file to a
//! [`ModuleLoader`] and registers the plugin types each module defines.
//!
//! Loading is best-effort. A module that fails to load is logged with
//! `tracing::warn!`, recorded in the [`LoadReport`] and skipped; the walk
//! carries on. Only a root directory that cannot be listed is an error.
//! Symbolically linked subdirectories are not followed.

use crate::adapters::LocalStorage;
use crate::domain::{ConfigError, PluginRegistry, Result};
use crate::ports::{ModuleLoader, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The outcome of one [`PluginLoader::load_plugins`] run.
#[derive(Debug, Default)]
pub struct LoadReport {
    loaded: Vec<PathBuf>,
    failures: Vec<(PathBuf, ConfigError)>,
    registered: usize,
}

impl LoadReport {
    /// Module files that loaded, in walk order.
    pub fn loaded(&self) -> &[PathBuf] {
        &self.loaded
    }

    /// Modules and subdirectories that were skipped, with the reason.
    pub fn failures(&self) -> &[(PathBuf, ConfigError)] {
        &self.failures
    }

    /// Number of plugin types newly added to the registry.
    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Whether nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loads plugin modules from a directory tree into a [`PluginRegistry`].
///
/// # Examples
///
/// ```rust
/// use appscaffold::adapters::ModuleCatalog;
/// use appscaffold::domain::{Plugin, PluginRegistry};
/// use appscaffold::service::PluginLoader;
///
/// #[derive(Default)]
/// struct Greeter;
///
/// impl Plugin for Greeter {
///     fn as_any(&self) -> &dyn std::any::Any {
///         self
///     }
/// }
///
/// # fn main() -> appscaffold::domain::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("greetings.plugin"), "").unwrap();
///
/// let loader = PluginLoader::new(ModuleCatalog::new().define::<Greeter>("greetings"));
/// let mut registry = PluginRegistry::new();
///
/// loader.load_plugins(dir.path(), &mut registry)?;
/// loader.load_plugins(dir.path(), &mut registry)?;
///
/// assert_eq!(registry.len(), 1);
/// assert!(registry.contains::<Greeter>());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PluginLoader {
    modules: Arc<dyn ModuleLoader>,
    storage: Arc<dyn Storage>,
}

impl PluginLoader {
    /// Creates a loader reading the local filesystem.
    pub fn new(modules: impl ModuleLoader + 'static) -> Self {
        Self {
            modules: Arc::new(modules),
            storage: Arc::new(LocalStorage::new()),
        }
    }

    /// Sets the storage backend plugin directories are listed through.
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    /// Recursively loads every module under `directory` and registers the
    /// plugin types they define.
    ///
    /// Entries are visited in sorted order, so registration order is stable
    /// across runs. Types already in `registry` are not added again.
    pub fn load_plugins(
        &self,
        directory: impl AsRef<Path>,
        registry: &mut PluginRegistry,
    ) -> Result<LoadReport> {
        let directory = directory.as_ref();
        let entries = self.storage.list_directory(directory)?;

        let mut report = LoadReport::default();
        self.walk(entries, registry, &mut report);

        tracing::debug!(
            "Loaded {} plugin module(s) from {} ({} new type(s), {} skipped)",
            report.loaded.len(),
            directory.display(),
            report.registered,
            report.failures.len()
        );
        Ok(report)
    }

    fn walk(&self, mut entries: Vec<PathBuf>, registry: &mut PluginRegistry, report: &mut LoadReport) {
        entries.sort();

        for entry in entries {
            if self.storage.is_directory(&entry) {
                if self.storage.is_symlink(&entry) {
                    tracing::debug!("Not following linked plugin directory {}", entry.display());
                    continue;
                }
                match self.storage.list_directory(&entry) {
                    Ok(children) => self.walk(children, registry, report),
                    Err(e) => {
                        tracing::warn!("Skipping plugin directory {}: {}", entry.display(), e);
                        report.failures.push((entry, e));
                    }
                }
            } else if self.modules.handles(&entry) {
                match self.modules.load_module(&entry) {
                    Ok(types) => {
                        for plugin in types {
                            if registry.register_type(plugin) {
                                report.registered += 1;
                            }
                        }
                        report.loaded.push(entry);
                    }
                    Err(e) => {
                        tracing::warn!("Skipping plugin module {}: {}", entry.display(), e);
                        report.failures.push((entry, e));
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("extensions", &self.modules.supported_extensions())
            .field("storage", &self.storage)
            .finish()
    }
}
