// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted program state.

use crate::domain::{ConfigError, ConfigValue, Mapping, Result};
use crate::ports::{ConfigParser, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A flat key/value map saved to, and restored from, one file.
///
/// Loading a missing or empty file keeps whatever is already held, so a fresh
/// program starts from an empty state and an existing one picks up where it
/// left off.
///
/// # Examples
///
/// ```rust
/// use appscaffold::service::State;
///
/// # fn main() -> appscaffold::domain::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("state.yml");
///
/// let mut state = State::open(&path)?;
/// assert!(state.get("runs").is_none());
/// state.set("runs", 1i64);
/// state.save()?;
///
/// let state = State::open(&path)?;
/// assert_eq!(state.get("runs").and_then(|v| v.as_i64()), Some(1));
/// # Ok(())
/// # }
/// ```
pub struct State {
    path: PathBuf,
    data: Mapping,
    parser: Arc<dyn ConfigParser>,
    storage: Arc<dyn Storage>,
}

impl State {
    /// Opens the YAML state file at `path` on the local filesystem and loads it.
    #[cfg(feature = "yaml")]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_backend(
            path,
            Arc::new(crate::adapters::YamlParser::new()),
            Arc::new(crate::adapters::LocalStorage::new()),
        )
    }

    /// Opens the state file at `path` with an explicit format and storage, and
    /// loads it.
    pub fn with_backend(
        path: impl AsRef<Path>,
        parser: Arc<dyn ConfigParser>,
        storage: Arc<dyn Storage>,
    ) -> Result<Self> {
        let mut state = Self {
            path: path.as_ref().to_path_buf(),
            data: Mapping::new(),
            parser,
            storage,
        };
        state.load()?;
        Ok(state)
    }

    /// Returns the value stored under `key`, or `None`.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.data.get(key)
    }

    /// Stores `value` under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.data.insert(key.into(), value.into());
    }

    /// Removes and returns the value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.data.remove(key)
    }

    /// Returns everything held.
    pub fn data(&self) -> &Mapping {
        &self.data
    }

    /// Returns the path to the state file.
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Replaces the held data with the file's content.
    ///
    /// A missing file, or one holding nothing, leaves the held data alone.
    pub fn load(&mut self) -> Result<()> {
        let Some(content) = self.storage.read_optional(&self.path)? else {
            return Ok(());
        };

        match self.parser.parse(&content)? {
            ConfigValue::Mapping(data) if data.is_empty() => {}
            ConfigValue::Mapping(data) => {
                tracing::debug!("Loaded {} state entries from {}", data.len(), self.path.display());
                self.data = data;
            }
            ConfigValue::Null => {}
            other => {
                return Err(ConfigError::ParseError {
                    message: format!(
                        "State file {} holds a {}, not a mapping",
                        self.path.display(),
                        other.type_name()
                    ),
                    source: None,
                })
            }
        }
        Ok(())
    }

    /// Writes the held data to the file, replacing its content.
    pub fn save(&self) -> Result<()> {
        let content = self.parser.serialize(&ConfigValue::Mapping(self.data.clone()))?;
        self.storage.write_text(&self.path, &content)
    }

    /// Deletes the state file. The held data is kept.
    pub fn cleanup(&self) -> Result<()> {
        self.storage.remove(&self.path)
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("path", &self.path)
            .field("data", &self.data)
            .finish()
    }
}
