// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin module loader trait definition.
//!
//! A module is one file in a plugin directory. Loading it yields the plugin
//! types it defines, which may be none at all.

use crate::domain::{PluginType, Result};
use std::path::Path;

/// A trait for turning module files into plugin types.
///
/// # Examples
///
/// ```rust
/// use appscaffold::domain::{Plugin, PluginType, Result};
/// use appscaffold::ports::ModuleLoader;
/// use std::path::Path;
///
/// #[derive(Default)]
/// struct Only;
///
/// impl Plugin for Only {
///     fn as_any(&self) -> &dyn std::any::Any {
///         self
///     }
/// }
///
/// struct SingleLoader;
///
/// impl ModuleLoader for SingleLoader {
///     fn load_module(&self, _path: &Path) -> Result<Vec<PluginType>> {
///         Ok(vec![PluginType::of::<Only>()])
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["plugin"]
///     }
/// }
///
/// let types = SingleLoader.load_module(Path::new("any.plugin")).unwrap();
/// assert!(types[0].is::<Only>());
/// ```
pub trait ModuleLoader: Send + Sync {
    /// Loads the module at `path`, returning the plugin types it defines.
    ///
    /// Fails with [`ConfigError::PluginLoadError`](crate::domain::ConfigError::PluginLoadError)
    /// if the module cannot be loaded.
    fn load_module(&self, path: &Path) -> Result<Vec<PluginType>>;

    /// Returns the file extensions (without the leading dot) treated as modules.
    fn supported_extensions(&self) -> &[&str];

    /// Whether `path` has one of the supported extensions.
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.supported_extensions().contains(&ext))
            .unwrap_or(false)
    }
}
