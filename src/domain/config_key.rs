// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dotted configuration path newtype.
//!
//! This module provides the `ConfigKey` type, a newtype wrapper around `String`
//! that addresses a location in a configuration tree, such as `server.port` or
//! `derp.0.a`. The empty key addresses the root of the tree.

use std::fmt;
use std::hash::{Hash, Hasher};

/// The separator between path segments.
pub const SEPARATOR: char = '.';

/// One step of a dotted path.
///
/// Segments that look like non-negative integers may index a sequence. Whether
/// they do depends on the container they are applied to: against a mapping the
/// same segment is an ordinary string key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment<'a>(&'a str);

impl<'a> Segment<'a> {
    /// Returns the raw segment text.
    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Returns the sequence index this segment denotes, if any.
    pub fn index(&self) -> Option<usize> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl fmt::Display for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A type-safe dotted path into a configuration tree.
///
/// # Examples
///
/// ```
/// use appscaffold::domain::config_key::ConfigKey;
///
/// let key = ConfigKey::from("thang.d");
/// let child = key.join("b");
///
/// assert_eq!(child.as_str(), "thang.d.b");
/// assert_eq!(child.segments().count(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Returns the key addressing the root of a tree.
    pub fn root() -> Self {
        ConfigKey(String::new())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether this key addresses the root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the segments of the path. The root key has none.
    ///
    /// # Examples
    ///
    /// ```
    /// use appscaffold::domain::config_key::ConfigKey;
    ///
    /// let key = ConfigKey::from("derp.0.a");
    /// let segments: Vec<_> = key.segments().map(|s| s.as_str()).collect();
    /// assert_eq!(segments, vec!["derp", "0", "a"]);
    /// ```
    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        let path = if self.0.is_empty() { None } else { Some(self.0.as_str()) };
        path.into_iter()
            .flat_map(|p| p.split(SEPARATOR))
            .map(Segment)
    }

    /// Returns a new key with `child` appended to this one.
    ///
    /// `child` may itself be a dotted path.
    pub fn join(&self, child: impl AsRef<str>) -> ConfigKey {
        let child = child.as_ref();
        if self.0.is_empty() {
            ConfigKey(child.to_string())
        } else if child.is_empty() {
            self.clone()
        } else {
            ConfigKey(format!("{}{}{}", self.0, SEPARATOR, child))
        }
    }
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<&ConfigKey> for ConfigKey {
    fn from(key: &ConfigKey) -> Self {
        key.clone()
    }
}

impl From<usize> for ConfigKey {
    fn from(index: usize) -> Self {
        ConfigKey(index.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Hash for ConfigKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
