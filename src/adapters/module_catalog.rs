// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compile-time plugin module catalog.
//!
//! Plugin modules are compiled into the application and listed in a
//! [`ModuleCatalog`] under a module name. A module file dropped into a plugin
//! directory selects the catalog entry matching its file stem, so the files
//! on disk decide which compiled-in plugins an installation enables.

use crate::domain::{ConfigError, Plugin, PluginType, Result};
use crate::ports::ModuleLoader;
use std::collections::HashMap;
use std::path::Path;

/// Extension of module files when none is configured.
pub const DEFAULT_MODULE_EXTENSION: &str = "plugin";

/// A [`ModuleLoader`] backed by a table of compiled-in modules.
///
/// # Examples
///
/// ```rust
/// use appscaffold::adapters::ModuleCatalog;
/// use appscaffold::domain::Plugin;
/// use appscaffold::ports::ModuleLoader;
/// use std::path::Path;
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
/// let catalog = ModuleCatalog::new().define::<Greeter>("greetings");
///
/// let types = catalog.load_module(Path::new("plugins/greetings.plugin")).unwrap();
/// assert!(types[0].is::<Greeter>());
/// assert!(catalog.load_module(Path::new("plugins/unknown.plugin")).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ModuleCatalog {
    modules: HashMap<String, Vec<PluginType>>,
    extensions: &'static [&'static str],
}

impl ModuleCatalog {
    /// Creates an empty catalog recognizing `.plugin` files.
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            extensions: &[DEFAULT_MODULE_EXTENSION],
        }
    }

    /// Sets the file extensions treated as modules.
    pub fn with_extensions(mut self, extensions: &'static [&'static str]) -> Self {
        self.extensions = extensions;
        self
    }

    /// Adds plugin type `T` to the module named `module`, creating the module
    /// if needed.
    pub fn define<T: Plugin + Default>(mut self, module: &str) -> Self {
        self.add(module, [PluginType::of::<T>()]);
        self
    }

    /// Adds a module with the given plugin types. A module may define none.
    pub fn module(mut self, module: &str, types: impl IntoIterator<Item = PluginType>) -> Self {
        self.add(module, types);
        self
    }

    /// Adds plugin types to the module named `module`, creating it if needed.
    pub fn add(&mut self, module: &str, types: impl IntoIterator<Item = PluginType>) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .extend(types);
    }

    /// Whether a module with this name is compiled in.
    pub fn contains_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    /// Returns the number of modules in the catalog.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the catalog has no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for ModuleCatalog {
    fn load_module(&self, path: &Path) -> Result<Vec<PluginType>> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConfigError::PluginLoadError {
                path: path.to_path_buf(),
                message: "module file name is not valid UTF-8".to_string(),
            })?;

        let types = self
            .modules
            .get(stem)
            .ok_or_else(|| ConfigError::PluginLoadError {
                path: path.to_path_buf(),
                message: format!("no module named '{}' is compiled in", stem),
            })?;

        tracing::debug!("Loaded module '{}' defining {} plugin type(s)", stem, types.len());
        Ok(types.clone())
    }

    fn supported_extensions(&self) -> &[&str] {
        self.extensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Default)]
    struct First;

    impl Plugin for First {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Default)]
    struct Second;

    impl Plugin for Second {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_catalog_load_known_module() {
        let catalog = ModuleCatalog::new()
            .define::<First>("both")
            .define::<Second>("both");

        let types = catalog.load_module(Path::new("/plugins/both.plugin")).unwrap();
        assert_eq!(types.len(), 2);
        assert!(types[0].is::<First>());
        assert!(types[1].is::<Second>());
    }

    #[test]
    fn test_catalog_module_without_plugins() {
        let catalog = ModuleCatalog::new().module("helpers", []);

        assert!(catalog.contains_module("helpers"));
        assert!(catalog.load_module(Path::new("helpers.plugin")).unwrap().is_empty());
    }

    #[test]
    fn test_catalog_unknown_module() {
        let catalog = ModuleCatalog::new();
        let err = catalog.load_module(Path::new("/plugins/broken.plugin")).unwrap_err();

        match err {
            ConfigError::PluginLoadError { path, message } => {
                assert_eq!(path, Path::new("/plugins/broken.plugin"));
                assert!(message.contains("broken"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_catalog_extensions() {
        let catalog = ModuleCatalog::new();
        assert!(catalog.handles(Path::new("a.plugin")));
        assert!(!catalog.handles(Path::new("a.txt")));
        assert!(!catalog.handles(Path::new("plugin")));

        let catalog = catalog.with_extensions(&["so", "dll"]);
        assert!(catalog.handles(Path::new("a.so")));
        assert!(!catalog.handles(Path::new("a.plugin")));
    }

    #[test]
    fn test_catalog_len() {
        let mut catalog = ModuleCatalog::default();
        assert!(catalog.is_empty());

        catalog.add("one", [PluginType::of::<First>()]);
        catalog.add("one", [PluginType::of::<Second>()]);
        assert_eq!(catalog.len(), 1);
    }
}
