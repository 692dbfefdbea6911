// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! This module defines the `ConfigParser` trait, which provides an interface for
//! turning structured configuration text (YAML, JSON, ...) into a configuration
//! tree and back again.

use crate::domain::{ConfigValue, Result};

/// A trait for parsing and serializing configuration text.
///
/// Implementations must round-trip: parsing the output of [`ConfigParser::serialize`]
/// yields a tree equal to the one serialized.
///
/// # Examples
///
/// ```rust
/// use appscaffold::ports::ConfigParser;
/// use appscaffold::domain::{ConfigValue, Result};
///
/// struct LineParser;
///
/// impl ConfigParser for LineParser {
///     fn parse(&self, content: &str) -> Result<ConfigValue> {
///         Ok(content
///             .lines()
///             .filter_map(|line| line.split_once('='))
///             .map(|(k, v)| (k.trim(), ConfigValue::from_literal(v)))
///             .collect())
///     }
///
///     fn serialize(&self, value: &ConfigValue) -> Result<String> {
///         let mut out = String::new();
///         for (k, v) in value.as_mapping().into_iter().flatten() {
///             out.push_str(&format!("{}={}\n", k, v));
///         }
///         Ok(out)
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["ini"]
///     }
/// }
///
/// let parsed = LineParser.parse("port=8080\n").unwrap();
/// assert_eq!(parsed.as_mapping().unwrap()["port"], ConfigValue::Integer(8080));
/// ```
pub trait ConfigParser: Send + Sync {
    /// Parses configuration content into a tree.
    ///
    /// Empty content parses to an empty mapping. Malformed content is a
    /// [`ConfigError::ParseError`](crate::domain::ConfigError::ParseError).
    fn parse(&self, content: &str) -> Result<ConfigValue>;

    /// Serializes a tree back into configuration text.
    fn serialize(&self, value: &ConfigValue) -> Result<String>;

    /// Returns the file extensions (without the leading dot) this parser handles.
    fn supported_extensions(&self) -> &[&str];
}
