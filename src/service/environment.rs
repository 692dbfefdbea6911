// SPDX-License-Identifier: MIT OR Apache-2.0

//! The environment an application runs in.
//!
//! An [`Environment`] ties a configuration tree to the application's on-disk
//! layout and its plugins. Building one:
//!
//! 1. finds and loads the configuration: an explicit [`ConfigFile`] or
//!    [`ConfigNode`], else a file child keyed `config` at the top level, else
//!    the first directory child that holds one;
//! 2. fills `{config:<path>}` tokens in every child's path template;
//! 3. loads plugin modules from every [`Directory::plugin_dir`] in the layout
//!    into the environment's [`PluginRegistry`].
//!
//! Files and directories are never created or removed by the environment.

use crate::adapters::{LocalStorage, ModuleCatalog};
use crate::domain::{ConfigNode, PluginRegistry, PluginType, Result};
use crate::ports::Storage;
use crate::service::{
    ConfigApplicator, ConfigFile, Directory, File, LayoutNode, LoadReport, PluginLoader,
};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key of the child that holds the configuration file.
pub const CONFIG_CHILD: &str = "config";

/// Configuration, layout and plugins of a running application.
///
/// # Examples
///
/// ```rust
/// use appscaffold::domain::ConfigNode;
/// use appscaffold::service::{Directory, Environment, File};
/// use std::path::Path;
///
/// # fn main() -> appscaffold::domain::Result<()> {
/// let config = ConfigNode::new();
/// config.set("somedir", "/srv/app")?;
///
/// let env = Environment::builder()
///     .config(config)
///     .child("data", Directory::new("{config:somedir}").with_file("db", "store.db"))
///     .child("log", File::new("{config:somedir}/app.log"))
///     .build()?;
///
/// assert_eq!(env.directory("data").unwrap().path(), Path::new("/srv/app"));
/// assert_eq!(env.file("log").unwrap().path(), Path::new("/srv/app/app.log"));
/// assert!(env.plugins().is_empty());
/// # Ok(())
/// # }
/// ```
pub struct Environment {
    config: ConfigNode,
    config_file: Option<ConfigFile>,
    children: BTreeMap<String, LayoutNode>,
    loader: PluginLoader,
    storage: Arc<dyn Storage>,
    registry: PluginRegistry,
    reports: Vec<(PathBuf, LoadReport)>,
}

impl Environment {
    /// Creates a builder for an environment.
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::new()
    }

    /// Adds `child` at `key`.
    ///
    /// Config tokens in the child's paths are filled in first, then plugins
    /// are loaded from any plugin directory inside it. A plugin directory that
    /// does not exist contributes nothing.
    pub fn add(&mut self, key: impl Into<String>, child: impl Into<LayoutNode>) -> Result<()> {
        let key = key.into();
        let mut child = child.into();
        child.apply_config(&ConfigApplicator::new(&self.config))?;

        if let LayoutNode::Directory(dir) = &child {
            for plugins in dir.plugin_dirs() {
                self.load_plugins(plugins.path())?;
            }
        }

        tracing::debug!("Added '{}' at {}", key, child.path().display());
        self.children.insert(key, child);
        Ok(())
    }

    fn load_plugins(&mut self, path: &Path) -> Result<()> {
        if !self.storage.is_directory(path) {
            tracing::debug!("Plugin directory {} does not exist", path.display());
            return Ok(());
        }
        let report = self.loader.load_plugins(path, &mut self.registry)?;
        self.reports.push((path.to_path_buf(), report));
        Ok(())
    }

    /// Returns the configuration tree. An environment built without one has
    /// an empty tree.
    pub fn config(&self) -> &ConfigNode {
        &self.config
    }

    /// Returns the configuration file, if the configuration came from one.
    pub fn config_file(&self) -> Option<&ConfigFile> {
        self.config_file.as_ref()
    }

    /// Returns the child at `key`.
    pub fn get(&self, key: &str) -> Option<&LayoutNode> {
        self.children.get(key)
    }

    /// Returns the directory child at `key`.
    pub fn directory(&self, key: &str) -> Option<&Directory> {
        self.get(key).and_then(LayoutNode::as_directory)
    }

    /// Returns the file child at `key`.
    pub fn file(&self, key: &str) -> Option<&File> {
        self.get(key).and_then(LayoutNode::as_file)
    }

    /// Returns the discovered plugin types, in first-registered order.
    pub fn plugins(&self) -> &[PluginType] {
        self.registry.plugins()
    }

    /// Returns the plugin registry.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Returns one report per plugin directory loaded, in load order.
    pub fn load_reports(&self) -> &[(PathBuf, LoadReport)] {
        &self.reports
    }

    /// Unregisters every plugin and forgets the load reports.
    ///
    /// The configuration and layout stay as they are, so plugin directories
    /// can be reloaded with [`Environment::reload_plugins`].
    pub fn cleanup(&mut self) {
        tracing::debug!("Cleaning up environment ({} plugin(s))", self.registry.len());
        self.registry.clear();
        self.reports.clear();
    }

    /// Loads every plugin directory in the layout again.
    pub fn reload_plugins(&mut self) -> Result<()> {
        let dirs: Vec<PathBuf> = self
            .children
            .values()
            .filter_map(LayoutNode::as_directory)
            .flat_map(|dir| dir.plugin_dirs())
            .map(|dir| dir.path().to_path_buf())
            .collect();
        for dir in dirs {
            self.load_plugins(&dir)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("config", &self.config)
            .field("children", &self.children)
            .field("plugins", &self.registry)
            .finish()
    }
}

/// Builder for constructing an [`Environment`].
pub struct EnvironmentBuilder {
    config: Option<ConfigNode>,
    config_file: Option<ConfigFile>,
    children: Vec<(String, LayoutNode)>,
    loader: Option<PluginLoader>,
    storage: Arc<dyn Storage>,
}

impl EnvironmentBuilder {
    /// Creates a builder with no configuration and no children.
    pub fn new() -> Self {
        Self {
            config: None,
            config_file: None,
            children: Vec::new(),
            loader: None,
            storage: Arc::new(LocalStorage::new()),
        }
    }

    /// Uses `config` as the configuration tree.
    pub fn config(mut self, config: ConfigNode) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses `file` as the configuration, loading it on build if it is not
    /// loaded yet. Takes precedence over [`EnvironmentBuilder::config`].
    pub fn config_file(mut self, file: ConfigFile) -> Self {
        self.config_file = Some(file);
        self
    }

    /// Adds `child` at `key`. Children are added in the order given.
    pub fn child(mut self, key: impl Into<String>, child: impl Into<LayoutNode>) -> Self {
        self.children.push((key.into(), child.into()));
        self
    }

    /// Sets the loader for plugin directories. Without one, the environment
    /// uses an empty [`ModuleCatalog`], so no plugin module resolves.
    pub fn plugin_loader(mut self, loader: PluginLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Sets the storage the configuration and plugin directories are read
    /// through.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    /// Builds the environment.
    pub fn build(self) -> Result<Environment> {
        let mut config_file = match self.config_file {
            Some(file) => Some(file),
            None if self.config.is_none() => find_config(&self.children, &self.storage)?,
            None => None,
        };
        if let Some(file) = config_file.as_mut() {
            file.load(false)?;
        }

        let config = match (&config_file, self.config) {
            (Some(file), _) => file.node().clone(),
            (None, Some(config)) => config,
            (None, None) => ConfigNode::new(),
        };

        let loader = self.loader.unwrap_or_else(|| {
            PluginLoader::new(ModuleCatalog::new()).with_storage(Arc::clone(&self.storage))
        });

        let mut env = Environment {
            config,
            config_file,
            children: BTreeMap::new(),
            loader,
            storage: self.storage,
            registry: PluginRegistry::new(),
            reports: Vec::new(),
        };
        for (key, child) in self.children {
            env.add(key, child)?;
        }

        tracing::debug!(
            "Built environment with {} child(ren) and {} plugin(s)",
            env.children.len(),
            env.registry.len()
        );
        Ok(env)
    }
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn config_child(children: &[(String, LayoutNode)]) -> Option<PathBuf> {
    let top = children
        .iter()
        .find(|(key, _)| key == CONFIG_CHILD)
        .and_then(|(_, child)| child.as_file());
    let nested = || {
        children
            .iter()
            .filter_map(|(_, child)| child.as_directory())
            .find_map(|dir| dir.file(CONFIG_CHILD))
    };
    top.or_else(nested).map(|file| file.path().to_path_buf())
}

#[cfg(feature = "yaml")]
fn find_config(
    children: &[(String, LayoutNode)],
    storage: &Arc<dyn Storage>,
) -> Result<Option<ConfigFile>> {
    match config_child(children) {
        Some(path) => {
            tracing::debug!("Using configuration file {}", path.display());
            ConfigFile::builder(path)
                .storage(Arc::clone(storage))
                .build()
                .map(Some)
        }
        None => Ok(None),
    }
}

#[cfg(not(feature = "yaml"))]
fn find_config(
    children: &[(String, LayoutNode)],
    _storage: &Arc<dyn Storage>,
) -> Result<Option<ConfigFile>> {
    if let Some(path) = config_child(children) {
        tracing::debug!("No parser for configuration file {}", path.display());
    }
    Ok(None)
}

#[cfg(all(test, feature = "yaml"))]
mod tests {
    use super::*;
    use crate::domain::{ConfigError, Plugin};
    use std::any::Any;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Alpha;

    impl Plugin for Alpha {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn env_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.yml"),
            "setting1: 667\nsomefile: thing.txt\nplugins: plugins\n",
        )
        .unwrap();
        fs::write(dir.path().join("thing.txt"), "thing\n").unwrap();
        fs::create_dir(dir.path().join("plugins")).unwrap();
        fs::write(dir.path().join("plugins").join("alpha.plugin"), "").unwrap();
        dir
    }

    fn root(dir: &TempDir) -> String {
        dir.path().to_string_lossy().into_owned()
    }

    #[test]
    fn test_config_found_in_directory() {
        let dir = env_dir();
        let env = Environment::builder()
            .child("dir", Directory::new(root(&dir)).with_file("config", "config.yml"))
            .build()
            .unwrap();

        assert_eq!(env.config().get("setting1"), 667i64);
        assert!(env.config_file().unwrap().is_loaded());
    }

    #[test]
    fn test_config_tokens_fill_child_paths() {
        let dir = env_dir();
        let env = Environment::builder()
            .child("dir", Directory::new(root(&dir)).with_file("config", "config.yml"))
            .child(
                "data",
                Directory::new(root(&dir)).with_file("somefile", "{config:somefile}"),
            )
            .build()
            .unwrap();

        let file = env.directory("data").unwrap().file("somefile").unwrap();
        assert_eq!(file.path(), dir.path().join("thing.txt"));
        assert_eq!(file.read(&LocalStorage::new()).unwrap().trim(), "thing");
    }

    #[test]
    fn test_plugins_loaded_from_plugin_dirs() {
        let dir = env_dir();
        let loader = PluginLoader::new(ModuleCatalog::new().define::<Alpha>("alpha"));
        let mut env = Environment::builder()
            .child("config", File::new(dir.path().join("config.yml").to_string_lossy()))
            .child(
                "dir",
                Directory::new(root(&dir))
                    .with_directory("plugins", Directory::plugin_dir("{config:plugins}")),
            )
            .plugin_loader(loader)
            .build()
            .unwrap();

        assert_eq!(env.plugins().len(), 1);
        assert!(env.plugins()[0].is::<Alpha>());
        assert_eq!(env.load_reports().len(), 1);
        assert_eq!(env.load_reports()[0].0, dir.path().join("plugins"));

        env.cleanup();
        assert!(env.plugins().is_empty());
        assert!(env.load_reports().is_empty());

        env.reload_plugins().unwrap();
        assert_eq!(env.plugins().len(), 1);
    }

    #[test]
    fn test_missing_plugin_dir_is_empty() {
        let dir = env_dir();
        let env = Environment::builder()
            .child("extra", Directory::plugin_dir(root(&dir) + "/nope"))
            .build()
            .unwrap();

        assert!(env.plugins().is_empty());
        assert!(env.load_reports().is_empty());
    }

    #[test]
    fn test_explicit_config_wins() {
        let dir = env_dir();
        let config = ConfigNode::new();
        config.set("setting1", 1i64).unwrap();

        let env = Environment::builder()
            .config(config)
            .child("dir", Directory::new(root(&dir)).with_file("config", "config.yml"))
            .build()
            .unwrap();

        assert_eq!(env.config().get("setting1"), 1i64);
        assert!(env.config_file().is_none());
    }

    #[test]
    fn test_missing_token_fails_build() {
        let result = Environment::builder()
            .child("data", Directory::new("{config:nowhere}"))
            .build();
        assert!(matches!(result, Err(ConfigError::MissingTokenKey { .. })));
    }

    #[test]
    fn test_add_after_build_sees_config() {
        let config = ConfigNode::new();
        config.set("somedir", "/srv/app").unwrap();
        let mut env = Environment::builder().config(config).build().unwrap();

        env.config().set("somedir", "/srv/other").unwrap();
        env.add("late", Directory::new("{config:somedir}")).unwrap();
        assert_eq!(env.directory("late").unwrap().path(), Path::new("/srv/other"));
        assert!(env.get("missing").is_none());
    }
}
