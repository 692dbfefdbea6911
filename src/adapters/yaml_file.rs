// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML parsing and YAML file source adapters.
//!
//! This module provides the YAML implementation of [`ConfigParser`] and a
//! [`ConfigSource`] that reads one YAML file through a [`Storage`] backend,
//! which is how a configuration file's defaults can live in a file of their own.

use crate::adapters::LocalStorage;
use crate::domain::{ConfigError, ConfigValue, Result};
use crate::ports::{ConfigParser, ConfigSource, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Number of spaces a literal tab expands to before parsing.
const TAB_WIDTH: usize = 4;

/// YAML parser implementation.
///
/// Literal tab characters are expanded to four spaces before parsing, so
/// hand-edited files with tab indentation still load. Empty documents parse
/// to an empty mapping.
///
/// # Examples
///
/// ```rust
/// use appscaffold::adapters::YamlParser;
/// use appscaffold::ports::ConfigParser;
///
/// let parser = YamlParser::new();
/// let yaml_content = "database:\n  host: localhost\n  port: 5432";
/// let result = parser.parse(yaml_content).unwrap();
/// let database = result.as_mapping().unwrap()["database"].as_mapping().unwrap();
/// assert_eq!(database["host"], "localhost");
/// assert_eq!(database["port"], 5432i64);
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlParser
    }

    fn expand_tabs(content: &str) -> std::borrow::Cow<'_, str> {
        if content.contains('\t') {
            std::borrow::Cow::Owned(content.replace('\t', &" ".repeat(TAB_WIDTH)))
        } else {
            std::borrow::Cow::Borrowed(content)
        }
    }
}

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> Result<ConfigValue> {
        let content = Self::expand_tabs(content);
        if content.trim().is_empty() {
            return Ok(ConfigValue::mapping());
        }

        let value: ConfigValue =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(match value {
            ConfigValue::Null => ConfigValue::mapping(),
            other => other,
        })
    }

    fn serialize(&self, value: &ConfigValue) -> Result<String> {
        serde_yaml::to_string(value).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to serialize YAML: {}", e),
            source: Some(Box::new(e)),
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

/// Configuration source that reads one YAML file.
///
/// The file is read afresh on every [`ConfigSource::load`]. A missing file is
/// an error here; tolerance of a missing local file is the configuration
/// file's concern, not this source's.
///
/// # Examples
///
/// ```rust
/// use appscaffold::adapters::YamlFileSource;
/// use appscaffold::ports::ConfigSource;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("defaults.yml");
/// std::fs::write(&path, "setting1: 666\nsetting2: true\n").unwrap();
///
/// let source = YamlFileSource::new(&path);
/// let defaults = source.load().unwrap();
/// assert_eq!(defaults.as_mapping().unwrap()["setting1"], 666i64);
/// ```
#[derive(Debug, Clone)]
pub struct YamlFileSource {
    path: PathBuf,
    storage: Arc<dyn Storage>,
    parser: YamlParser,
}

impl YamlFileSource {
    /// Creates a source for `path` on the local filesystem.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_storage(path, Arc::new(LocalStorage::new()))
    }

    /// Creates a source for `path` read through `storage`.
    pub fn with_storage(path: impl AsRef<Path>, storage: Arc<dyn Storage>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            storage,
            parser: YamlParser::new(),
        }
    }

    /// Returns the path to the YAML file.
    pub fn file_path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for YamlFileSource {
    fn name(&self) -> &str {
        "yaml-file"
    }

    fn load(&self) -> Result<ConfigValue> {
        if !self.storage.exists(&self.path) {
            return Err(ConfigError::SourceError {
                source_name: self.name().to_string(),
                message: format!("Configuration file not found: {}", self.path.display()),
                source: None,
            });
        }

        let content = self
            .storage
            .read_text(&self.path)
            .map_err(|e| ConfigError::SourceError {
                source_name: self.name().to_string(),
                message: format!(
                    "Failed to read configuration file: {}",
                    self.path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("<unknown>")
                ),
                source: Some(Box::new(e)),
            })?;

        tracing::debug!("Loaded YAML source {}", self.path.display());
        self.parser.parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn mapping(value: &ConfigValue) -> &crate::domain::Mapping {
        value.as_mapping().unwrap()
    }

    #[test]
    fn test_yaml_parser_simple() {
        let result = YamlParser::new().parse("key: value").unwrap();
        assert_eq!(mapping(&result)["key"], "value");
    }

    #[test]
    fn test_yaml_parser_nested() {
        let yaml = r#"
database:
  host: localhost
  port: 5432
"#;
        let result = YamlParser::new().parse(yaml).unwrap();
        let database = mapping(&mapping(&result)["database"]);

        assert_eq!(database["host"], "localhost");
        assert_eq!(database["port"], 5432i64);
    }

    #[test]
    fn test_yaml_parser_sequence_of_mappings() {
        let yaml = r#"
derp:
  - a: 1
  - b: 2
"#;
        let result = YamlParser::new().parse(yaml).unwrap();
        let derp = mapping(&result)["derp"].as_sequence().unwrap();

        assert_eq!(derp.len(), 2);
        assert_eq!(mapping(&derp[1])["b"], 2i64);
    }

    #[test]
    fn test_yaml_parser_mixed_types() {
        let yaml = r#"
string_value: hello
number_value: 42
float_value: 1.5
bool_value: true
null_value: null
"#;
        let result = YamlParser::new().parse(yaml).unwrap();
        let map = mapping(&result);

        assert_eq!(map["string_value"], "hello");
        assert_eq!(map["number_value"], 42i64);
        assert_eq!(map["float_value"], 1.5);
        assert_eq!(map["bool_value"], true);
        assert!(map["null_value"].is_null());
    }

    #[test]
    fn test_yaml_parser_expands_tabs() {
        let yaml = "thang:\n\ta: 1\n\tb: 2\n";
        let result = YamlParser::new().parse(yaml).unwrap();
        let thang = mapping(&mapping(&result)["thang"]);

        assert_eq!(thang["a"], 1i64);
        assert_eq!(thang["b"], 2i64);
    }

    #[test]
    fn test_yaml_parser_empty_is_empty_mapping() {
        assert_eq!(YamlParser::new().parse("").unwrap(), ConfigValue::mapping());
        assert_eq!(YamlParser::new().parse("~\n").unwrap(), ConfigValue::mapping());
    }

    #[test]
    fn test_yaml_parser_invalid() {
        let result = YamlParser::new().parse("invalid: yaml: content:");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_yaml_parser_round_trip() {
        let parser = YamlParser::new();
        let yaml = r#"
setting1: 667
setting3:
  key1: value
derp:
  - 1
  - two
  - 3.5
"#;
        let parsed = parser.parse(yaml).unwrap();
        let text = parser.serialize(&parsed).unwrap();
        assert_eq!(parser.parse(&text).unwrap(), parsed);
    }

    #[test]
    fn test_yaml_parser_supported_extensions() {
        let parser = YamlParser::new();
        let extensions = parser.supported_extensions();

        assert_eq!(extensions.len(), 2);
        assert!(extensions.contains(&"yaml"));
        assert!(extensions.contains(&"yml"));
    }

    #[test]
    fn test_yaml_source_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "database:\n  host: localhost\n  port: 5432").unwrap();

        let source = YamlFileSource::new(temp_file.path());
        assert_eq!(source.name(), "yaml-file");
        assert_eq!(source.file_path(), temp_file.path());

        let value = source.load().unwrap();
        assert_eq!(mapping(&mapping(&value)["database"])["host"], "localhost");
    }

    #[test]
    fn test_yaml_source_rereads_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        std::fs::write(&path, "key: initial_value\n").unwrap();

        let source = YamlFileSource::new(&path);
        assert_eq!(mapping(&source.load().unwrap())["key"], "initial_value");

        std::fs::write(&path, "key: updated_value\n").unwrap();
        assert_eq!(mapping(&source.load().unwrap())["key"], "updated_value");
    }

    #[test]
    fn test_yaml_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = YamlFileSource::new(dir.path().join("missing.yml"));
        assert!(matches!(source.load(), Err(ConfigError::SourceError { .. })));
    }
}
