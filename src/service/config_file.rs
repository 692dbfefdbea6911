// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed configuration.
//!
//! A [`ConfigFile`] is a [`ConfigNode`] that knows where its data lives. Loading
//! layers three things, lowest precedence first: the defaults (inline or from a
//! file of their own), the file's own content, and optionally an environment
//! overlay.

use crate::adapters::LocalStorage;
use crate::domain::{ConfigError, ConfigNode, ConfigValue, Result};
use crate::ports::{ConfigParser, ConfigSource, Storage};
use directories::ProjectDirs;
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "yaml")]
fn default_parser() -> Option<Arc<dyn ConfigParser>> {
    Some(Arc::new(crate::adapters::YamlParser::new()))
}

#[cfg(not(feature = "yaml"))]
fn default_parser() -> Option<Arc<dyn ConfigParser>> {
    None
}

/// A configuration tree loaded from, and saved to, a structured-text file.
///
/// The file moves from unloaded to loaded on the first [`ConfigFile::load`];
/// later loads are no-ops unless `reload` is set. A missing file is treated as
/// empty, while a malformed one is a parse error.
///
/// `ConfigFile` dereferences to its [`ConfigNode`], so all reads and writes go
/// through the usual node operations.
///
/// # Examples
///
/// ```rust
/// use appscaffold::domain::ConfigValue;
/// use appscaffold::service::ConfigFile;
///
/// # fn main() -> appscaffold::domain::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("config.yml");
/// std::fs::write(&path, "setting1: 667\n").unwrap();
///
/// let defaults: ConfigValue = [
///     ("setting1", ConfigValue::from(666i64)),
///     ("setting2", ConfigValue::from(true)),
/// ]
/// .into_iter()
/// .collect();
///
/// let config = ConfigFile::builder(&path).defaults(defaults).load(true).build()?;
///
/// assert_eq!(config.get("setting1"), 667i64);
/// assert_eq!(config.get("setting2"), true);
/// # Ok(())
/// # }
/// ```
pub struct ConfigFile {
    node: ConfigNode,
    path: PathBuf,
    defaults: Option<Box<dyn ConfigSource>>,
    overlay: Option<Box<dyn ConfigSource>>,
    parser: Arc<dyn ConfigParser>,
    storage: Arc<dyn Storage>,
    loaded: bool,
}

impl ConfigFile {
    /// Creates a builder for a configuration file at `path`.
    pub fn builder(path: impl AsRef<Path>) -> ConfigFileBuilder {
        ConfigFileBuilder::new(path)
    }

    /// Creates a builder for `filename` in the OS-appropriate configuration
    /// directory of the application.
    ///
    /// This method uses the `directories` crate to determine the appropriate
    /// configuration directory for the current operating system.
    ///
    /// # Arguments
    ///
    /// * `app_name` - The application name (e.g., "myapp")
    /// * `qualifier` - The organization/qualifier (e.g., "com.example")
    /// * `filename` - The configuration file name (e.g., "config.yml")
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use appscaffold::service::ConfigFile;
    ///
    /// # fn main() -> appscaffold::domain::Result<()> {
    /// let config = ConfigFile::from_default_location("myapp", "com.example", "config.yml")?
    ///     .load(true)
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_default_location(
        app_name: &str,
        qualifier: &str,
        filename: &str,
    ) -> Result<ConfigFileBuilder> {
        let proj_dirs =
            ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| ConfigError::SourceError {
                source_name: "config-file".to_string(),
                message: "Failed to determine project directories".to_string(),
                source: None,
            })?;

        Ok(ConfigFileBuilder::new(proj_dirs.config_dir().join(filename)))
    }

    /// Loads the defaults, the file and the overlay into the tree.
    ///
    /// Does nothing if already loaded, unless `reload` is set. Both files are
    /// parsed before the tree is touched, so a parse error leaves the previous
    /// data in place.
    pub fn load(&mut self, reload: bool) -> Result<()> {
        if self.loaded && !reload {
            return Ok(());
        }

        let defaults = match &self.defaults {
            Some(source) => source.load()?,
            None => ConfigValue::mapping(),
        };

        let data = match self.storage.read_optional(&self.path)? {
            Some(content) => self.parser.parse(&content)?,
            None => {
                tracing::debug!("Config file {} does not exist, using defaults", self.path.display());
                ConfigValue::mapping()
            }
        };

        let overlay = match &self.overlay {
            Some(source) => Some(source.load()?),
            None => None,
        };

        self.node.reset_to(defaults);
        self.node.merge(data)?;
        if let Some(overlay) = overlay {
            self.node.merge(overlay)?;
        }

        self.loaded = true;
        tracing::debug!(
            "Loaded config file {} (defaults={}, overlay={})",
            self.path.display(),
            self.defaults.as_ref().map_or("none", |s| s.name()),
            self.overlay.as_ref().map_or("none", |s| s.name())
        );
        Ok(())
    }

    /// Serializes the current tree and overwrites the file with it.
    pub fn save(&self) -> Result<()> {
        let content = self.parser.serialize(&self.node.to_value())?;
        self.storage.write_text(&self.path, &content)?;
        tracing::debug!("Saved config file {}", self.path.display());
        Ok(())
    }

    /// Whether the file has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the file exists in storage.
    pub fn exists(&self) -> bool {
        self.storage.exists(&self.path)
    }

    /// Returns the path to the configuration file.
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Returns the root view of the tree.
    pub fn node(&self) -> &ConfigNode {
        &self.node
    }
}

impl Deref for ConfigFile {
    type Target = ConfigNode;

    fn deref(&self) -> &ConfigNode {
        &self.node
    }
}

impl fmt::Debug for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigFile")
            .field("path", &self.path)
            .field("loaded", &self.loaded)
            .field("node", &self.node)
            .finish()
    }
}

enum DefaultsLayer {
    Source(Box<dyn ConfigSource>),
    #[cfg(feature = "yaml")]
    File(PathBuf),
}

/// Builder for constructing a [`ConfigFile`].
///
/// # Examples
///
/// ```rust
/// use appscaffold::service::ConfigFile;
///
/// # fn main() -> appscaffold::domain::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let config = ConfigFile::builder(dir.path().join("missing.yml"))
///     .load(true)
///     .build()?;
///
/// assert!(config.is_loaded());
/// assert!(config.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct ConfigFileBuilder {
    path: PathBuf,
    defaults: Option<DefaultsLayer>,
    overlay: Option<Box<dyn ConfigSource>>,
    parser: Option<Arc<dyn ConfigParser>>,
    storage: Arc<dyn Storage>,
    load: bool,
}

impl ConfigFileBuilder {
    /// Creates a builder for a configuration file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            defaults: None,
            overlay: None,
            parser: default_parser(),
            storage: Arc::new(LocalStorage::new()),
            load: false,
        }
    }

    /// Uses `source` as the defaults layer. An inline [`ConfigValue`] is a
    /// source of itself.
    pub fn defaults(mut self, source: impl ConfigSource + 'static) -> Self {
        self.defaults = Some(DefaultsLayer::Source(Box::new(source)));
        self
    }

    /// Reads the defaults layer from a YAML file through the builder's storage.
    ///
    /// Unlike the configuration file itself, the defaults file must exist.
    #[cfg(feature = "yaml")]
    pub fn defaults_file(mut self, path: impl AsRef<Path>) -> Self {
        self.defaults = Some(DefaultsLayer::File(path.as_ref().to_path_buf()));
        self
    }

    /// Merges the environment overlay for `prefix` over the file on load.
    #[cfg(feature = "env")]
    pub fn apply_env(self, prefix: impl Into<String>) -> Self {
        self.overlay(crate::adapters::EnvVarAdapter::with_prefix(prefix))
    }

    /// Merges `source` over the file on load.
    pub fn overlay(mut self, source: impl ConfigSource + 'static) -> Self {
        self.overlay = Some(Box::new(source));
        self
    }

    /// Sets the parser for the file's format.
    pub fn parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Sets the storage backend the files are read from and written to.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    /// Sets whether [`ConfigFileBuilder::build`] loads the file.
    pub fn load(mut self, load: bool) -> Self {
        self.load = load;
        self
    }

    /// Builds the configuration file, loading it if requested.
    pub fn build(self) -> Result<ConfigFile> {
        let parser = self.parser.ok_or_else(|| ConfigError::SourceError {
            source_name: "config-file".to_string(),
            message: format!("No parser configured for {}", self.path.display()),
            source: None,
        })?;

        let defaults = self.defaults.map(|layer| -> Box<dyn ConfigSource> {
            match layer {
                DefaultsLayer::Source(source) => source,
                #[cfg(feature = "yaml")]
                DefaultsLayer::File(path) => Box::new(crate::adapters::YamlFileSource::with_storage(
                    path,
                    Arc::clone(&self.storage),
                )),
            }
        });

        let mut file = ConfigFile {
            node: ConfigNode::new(),
            path: self.path,
            defaults,
            overlay: self.overlay,
            parser,
            storage: self.storage,
            loaded: false,
        };

        if self.load {
            file.load(false)?;
        }

        Ok(file)
    }
}

#[cfg(all(test, feature = "yaml"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn defaults() -> ConfigValue {
        [
            ("setting1", ConfigValue::from(666i64)),
            ("setting2", ConfigValue::from(true)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_builder_does_not_load_by_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "setting1: 667\n").unwrap();

        let mut config = ConfigFile::builder(&path).defaults(defaults()).build().unwrap();
        assert!(!config.is_loaded());
        assert!(!config.get("setting1").is_present());

        config.load(false).unwrap();
        assert!(config.is_loaded());
        assert_eq!(config.get("setting1"), 667i64);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::builder(dir.path().join("missing.yml"))
            .defaults(defaults())
            .load(true)
            .build()
            .unwrap();

        assert!(!config.exists());
        assert_eq!(config.get("setting1"), 666i64);
        assert_eq!(config.get("setting2"), true);
    }

    #[test]
    fn test_load_is_idempotent_without_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "setting1: 667\n").unwrap();

        let mut config = ConfigFile::builder(&path).load(true).build().unwrap();
        std::fs::write(&path, "setting1: 668\n").unwrap();

        config.load(false).unwrap();
        assert_eq!(config.get("setting1"), 667i64);

        config.load(true).unwrap();
        assert_eq!(config.get("setting1"), 668i64);
    }

    #[test]
    fn test_reload_discards_local_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "setting1: 667\n").unwrap();

        let mut config = ConfigFile::builder(&path).load(true).build().unwrap();
        config.set("added", 1i64).unwrap();

        config.load(true).unwrap();
        assert!(!config.get("added").is_present());
    }

    #[test]
    fn test_parse_error_keeps_previous_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "setting1: 667\n").unwrap();

        let mut config = ConfigFile::builder(&path).load(true).build().unwrap();
        std::fs::write(&path, "invalid: yaml: content:").unwrap();

        let result = config.load(true);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
        assert_eq!(config.get("setting1"), 667i64);
    }

    #[test]
    fn test_defaults_file() {
        let dir = TempDir::new().unwrap();
        let defaults_path = dir.path().join("defaults.yml");
        let path = dir.path().join("config.yml");
        std::fs::write(&defaults_path, "setting1: 666\nsetting2: true\n").unwrap();
        std::fs::write(&path, "setting1: 667\n").unwrap();

        let config = ConfigFile::builder(&path)
            .defaults_file(&defaults_path)
            .load(true)
            .build()
            .unwrap();

        assert_eq!(config.get("setting1"), 667i64);
        assert_eq!(config.get("setting2"), true);
        assert_eq!(config.defaults(), defaults());
    }

    #[test]
    fn test_missing_defaults_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = ConfigFile::builder(dir.path().join("config.yml"))
            .defaults_file(dir.path().join("defaults.yml"))
            .load(true)
            .build();

        assert!(matches!(result, Err(ConfigError::SourceError { .. })));
    }

    #[cfg(feature = "env")]
    #[test]
    fn test_overlay_wins_over_file() {
        use crate::adapters::EnvVarAdapter;
        use std::collections::HashMap;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "setting1: 667\nsetting3:\n  key1: value\n").unwrap();

        let mut env = HashMap::new();
        env.insert("MYAPP_SETTING3_KEY2".to_string(), "0x10".to_string());
        env.insert("MYAPP_SETTING1".to_string(), "668".to_string());

        let config = ConfigFile::builder(&path)
            .defaults(defaults())
            .overlay(EnvVarAdapter::with_prefix("MYAPP").values(env))
            .load(true)
            .build()
            .unwrap();

        assert_eq!(config.get("setting1"), 668i64);
        assert_eq!(config.get("setting2"), true);
        assert_eq!(config.get("setting3.key1"), "value");
        assert_eq!(config.get("setting3.key2"), 16i64);
    }

    #[test]
    fn test_save_overwrites_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");

        let config = ConfigFile::builder(&path).load(true).build().unwrap();
        config.set("thing.one", 1i64).unwrap();
        config.save().unwrap();

        let reread = ConfigFile::builder(&path).load(true).build().unwrap();
        assert_eq!(reread.get("thing.one"), 1i64);
        assert_eq!(reread.to_value(), config.to_value());
    }

    #[test]
    fn test_missing_parser() {
        let builder = ConfigFileBuilder {
            parser: None,
            ..ConfigFileBuilder::new("config.yml")
        };
        assert!(matches!(builder.build(), Err(ConfigError::SourceError { .. })));
    }
}
