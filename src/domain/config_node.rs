// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration nodes.
//!
//! A [`ConfigNode`] is a lightweight view into a shared configuration tree: a
//! handle on the tree plus a dotted path. The view holds no data of its own and
//! resolves its path every time it is read, so views may be created freely and
//! stay valid as the tree changes underneath them.
//!
//! The tree behind a node is layered: a `defaults` value is copied in when the
//! node is built (and again on [`ConfigNode::reset`]), then explicit data is
//! deep-merged over it.
//!
//! # Concurrency
//!
//! Views share their tree behind a lock so they can be handed across threads,
//! but each operation locks independently. Sequences of reads and writes that
//! must be atomic have to be serialized by the caller.

use crate::domain::config_key::ConfigKey;
use crate::domain::config_value::ConfigValue;
use crate::domain::errors::{ConfigError, Result};
use crate::domain::value_tree::ValueTree;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Path/value pairs applied one `set` at a time by [`ConfigNode::update`].
pub type ConfigOptions = BTreeMap<String, ConfigValue>;

#[derive(Debug)]
struct Layers {
    tree: ValueTree,
    defaults: ConfigValue,
}

/// The result of reading one path through a [`ConfigNode`].
///
/// Leaves come back as plain values; mappings, sequences and paths that do not
/// resolve come back as navigable views, so lookups can be chained through
/// interior levels while callers still get scalars at the leaves.
#[derive(Clone, Debug)]
pub enum Entry {
    /// A scalar leaf.
    Value(ConfigValue),
    /// A mapping, a sequence, a null, or nothing at all.
    Node(ConfigNode),
}

impl Entry {
    /// Returns the resolved value, or `None` if the path resolves to nothing.
    pub fn value(&self) -> Option<ConfigValue> {
        match self {
            Entry::Value(v) => Some(v.clone()),
            Entry::Node(node) => node.value(),
        }
    }

    /// Whether the entry holds something other than null.
    pub fn is_present(&self) -> bool {
        match self {
            Entry::Value(_) => true,
            Entry::Node(node) => node.is_present(),
        }
    }

    /// Returns the scalar if this entry is a leaf.
    pub fn as_scalar(&self) -> Option<&ConfigValue> {
        match self {
            Entry::Value(v) => Some(v),
            Entry::Node(_) => None,
        }
    }

    /// Returns the view if this entry is an interior node.
    pub fn as_node(&self) -> Option<&ConfigNode> {
        match self {
            Entry::Value(_) => None,
            Entry::Node(node) => Some(node),
        }
    }

    /// Converts into the view if this entry is an interior node.
    pub fn into_node(self) -> Option<ConfigNode> {
        match self {
            Entry::Value(_) => None,
            Entry::Node(node) => Some(node),
        }
    }

    /// Returns the view, panicking on a scalar leaf.
    ///
    /// # Panics
    ///
    /// Panics if the entry is [`Entry::Value`].
    pub fn unwrap_node(self) -> ConfigNode {
        self.expect_node("called `Entry::unwrap_node()` on a scalar value")
    }

    /// Returns the view, panicking with `msg` on a scalar leaf.
    ///
    /// # Panics
    ///
    /// Panics if the entry is [`Entry::Value`].
    pub fn expect_node(self, msg: &str) -> ConfigNode {
        match self {
            Entry::Node(node) => node,
            Entry::Value(v) => panic!("{}: {}", msg, v),
        }
    }

    /// Returns the scalar, panicking on an interior node.
    ///
    /// # Panics
    ///
    /// Panics if the entry is [`Entry::Node`].
    pub fn unwrap_value(self) -> ConfigValue {
        match self {
            Entry::Value(v) => v,
            Entry::Node(node) => panic!(
                "called `Entry::unwrap_value()` on the node at '{}'",
                node.path()
            ),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Value(v) => write!(f, "{}", v),
            Entry::Node(node) => write!(f, "{}", node),
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

/// A view into a layered, dotted-path configuration tree.
///
/// Cloning a node clones the view, not the data: both handles address the same
/// tree.
///
/// # Examples
///
/// ```
/// use appscaffold::domain::{ConfigNode, ConfigValue};
///
/// let config = ConfigNode::new();
/// config.set("derp2.a.b.c", 123i64).unwrap();
///
/// assert_eq!(config.get("derp2.a.b.c"), 123i64);
/// assert_eq!(config.child("derp2").child("a").get("b.c"), 123i64);
/// assert!(!config.get("xxx").is_present());
/// ```
#[derive(Clone)]
pub struct ConfigNode {
    layers: Arc<RwLock<Layers>>,
    path: ConfigKey,
}

impl ConfigNode {
    /// Creates an empty root node with empty defaults.
    pub fn new() -> Self {
        Self::layered(ConfigValue::mapping(), ConfigValue::mapping())
    }

    /// Creates a root node over `data` with empty defaults.
    pub fn from_value(data: impl Into<ConfigValue>) -> Self {
        Self::layered(data, ConfigValue::mapping())
    }

    /// Creates a root node from `defaults` with `data` deep-merged over them.
    ///
    /// A null `data` leaves the defaults as they are, as with
    /// [`ConfigNode::merge`].
    ///
    /// # Examples
    ///
    /// ```
    /// use appscaffold::domain::{ConfigNode, ConfigValue};
    ///
    /// let defaults: ConfigValue = [("setting1", 666i64), ("setting2", 1)].into_iter().collect();
    /// let data: ConfigValue = [("setting1", 667i64)].into_iter().collect();
    /// let config = ConfigNode::layered(data, defaults);
    ///
    /// assert_eq!(config.get("setting1"), 667i64);
    /// assert_eq!(config.get("setting2"), 1i64);
    /// ```
    pub fn layered(data: impl Into<ConfigValue>, defaults: impl Into<ConfigValue>) -> Self {
        let defaults = defaults.into();
        let data = data.into();
        let mut tree = ValueTree::new(defaults.clone());
        if !data.is_null() {
            tree.merge_root(data);
        }
        Self {
            layers: Arc::new(RwLock::new(Layers { tree, defaults })),
            path: ConfigKey::root(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Layers> {
        self.layers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Layers> {
        self.layers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the path this view addresses. The root view has an empty path.
    pub fn path(&self) -> &ConfigKey {
        &self.path
    }

    /// Returns a view of `key` relative to this one.
    ///
    /// This never touches the tree; the child may or may not exist.
    pub fn child(&self, key: impl Into<ConfigKey>) -> ConfigNode {
        let key = key.into();
        ConfigNode {
            layers: Arc::clone(&self.layers),
            path: self.path.join(key.as_str()),
        }
    }

    /// Returns a copy of the value at this view's path, or `None` if it does not
    /// resolve.
    pub fn value(&self) -> Option<ConfigValue> {
        self.read().tree.get(&self.path).cloned()
    }

    /// Returns the value at this view's path, with null standing in for nothing.
    pub fn to_value(&self) -> ConfigValue {
        self.value().unwrap_or_default()
    }

    /// Reads `key` relative to this view.
    ///
    /// Scalars are returned directly as [`Entry::Value`]. Mappings, sequences,
    /// nulls and missing paths are returned as [`Entry::Node`] views so the
    /// lookup can continue.
    pub fn get(&self, key: impl Into<ConfigKey>) -> Entry {
        let child = self.child(key);
        match child.value() {
            Some(ConfigValue::Mapping(_)) | Some(ConfigValue::Sequence(_)) | Some(ConfigValue::Null) | None => {
                Entry::Node(child)
            }
            Some(scalar) => Entry::Value(scalar),
        }
    }

    /// Assigns `value` at `key` relative to this view, creating missing
    /// intermediate mappings.
    ///
    /// Fails with [`ConfigError::PathConflict`] if the path runs through a
    /// scalar, and with [`ConfigError::EmptyKey`] if the resulting path is the
    /// root.
    pub fn set(&self, key: impl Into<ConfigKey>, value: impl Into<ConfigValue>) -> Result<()> {
        let path = self.path.join(key.into().as_str());
        let value = value.into();
        tracing::trace!("Setting configuration path '{}'", path);
        self.write().tree.set(&path, value)
    }

    /// Deep-merges `data` into the subtree at this view's path.
    ///
    /// A null `data` is a no-op. Passing another node merges its resolved value.
    pub fn merge(&self, data: impl Into<ConfigValue>) -> Result<()> {
        let data = data.into();
        if data.is_null() {
            return Ok(());
        }
        self.write().tree.merge(&self.path, data)
    }

    /// Applies each path/value pair in `options` with [`ConfigNode::set`].
    ///
    /// Pairs that share a prefix build up one subtree; unrelated pairs do not
    /// interfere.
    pub fn apply_options<I, K, V>(&self, options: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ConfigKey>,
        V: Into<ConfigValue>,
    {
        for (key, value) in options {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Updates the tree with `options` first, then deep-merges `data`.
    ///
    /// # Examples
    ///
    /// ```
    /// use appscaffold::domain::{ConfigNode, ConfigOptions, ConfigValue};
    ///
    /// let config = ConfigNode::new();
    /// let mut options = ConfigOptions::new();
    /// options.insert("server.port".to_string(), ConfigValue::from(8080i64));
    /// let data: ConfigValue = [("admin", "admin@lol")].into_iter().collect();
    ///
    /// config.update(data, options).unwrap();
    /// assert_eq!(config.get("server.port"), 8080i64);
    /// assert_eq!(config.get("admin"), "admin@lol");
    /// ```
    pub fn update(&self, data: impl Into<ConfigValue>, options: ConfigOptions) -> Result<()> {
        self.apply_options(options)?;
        self.merge(data)
    }

    /// Discards all data and recomputes the tree from the defaults.
    pub fn reset(&self) {
        let mut layers = self.write();
        let defaults = layers.defaults.clone();
        layers.tree.replace_root(defaults);
    }

    /// Returns a copy of the defaults layer.
    pub fn defaults(&self) -> ConfigValue {
        self.read().defaults.clone()
    }

    /// Replaces the defaults layer and resets the tree to it.
    pub fn reset_to(&self, defaults: impl Into<ConfigValue>) {
        let defaults = defaults.into();
        let mut layers = self.write();
        layers.tree.replace_root(defaults.clone());
        layers.defaults = defaults;
    }

    /// Whether this view resolves to something other than null.
    pub fn is_present(&self) -> bool {
        matches!(self.value(), Some(v) if !v.is_null())
    }

    /// Returns the keys of the mapping at this view, or nothing if it is not a
    /// mapping.
    pub fn keys(&self) -> Vec<String> {
        self.value()
            .and_then(|v| v.as_mapping().map(|m| m.keys().cloned().collect()))
            .unwrap_or_default()
    }

    /// Returns `(key, entry)` pairs for the mapping at this view.
    pub fn items(&self) -> Vec<(String, Entry)> {
        self.keys()
            .into_iter()
            .map(|key| {
                let entry = self.get(key.as_str());
                (key, entry)
            })
            .collect()
    }

    /// Returns the number of entries in the mapping or sequence at this view.
    pub fn len(&self) -> usize {
        match self.value() {
            Some(ConfigValue::Mapping(m)) => m.len(),
            Some(ConfigValue::Sequence(s)) => s.len(),
            _ => 0,
        }
    }

    /// Whether [`ConfigNode::len`] is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the mapping at this view has `key`, or the sequence at this view
    /// has an element equal to `key`.
    pub fn contains(&self, key: &str) -> bool {
        match self.value() {
            Some(ConfigValue::Mapping(m)) => m.contains_key(key),
            Some(ConfigValue::Sequence(s)) => s.iter().any(|item| item == key),
            Some(ConfigValue::String(s)) => s.contains(key),
            _ => false,
        }
    }

    /// Reads `key` as a string. Missing or null paths yield `Ok(None)`.
    pub fn get_str(&self, key: impl Into<ConfigKey>) -> Result<Option<String>> {
        let child = self.child(key);
        match child.value() {
            None | Some(ConfigValue::Null) => Ok(None),
            Some(ConfigValue::String(s)) => Ok(Some(s)),
            Some(other) if !other.is_container() => Ok(Some(other.to_string())),
            Some(other) => Err(ConfigError::type_mismatch(
                child.path().as_str(),
                "string",
                other.type_name(),
            )),
        }
    }

    /// Reads `key` as an integer, parsing strings. Missing or null paths yield
    /// `Ok(None)`.
    pub fn get_i64(&self, key: impl Into<ConfigKey>) -> Result<Option<i64>> {
        let child = self.child(key);
        match child.value() {
            None | Some(ConfigValue::Null) => Ok(None),
            Some(ConfigValue::Integer(i)) => Ok(Some(i)),
            Some(ConfigValue::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::from_parse_int_error(child.path().to_string(), e)),
            Some(other) => Err(ConfigError::type_mismatch(
                child.path().as_str(),
                "integer",
                other.type_name(),
            )),
        }
    }

    /// Reads `key` as a float, widening integers and parsing strings. Missing
    /// or null paths yield `Ok(None)`.
    pub fn get_f64(&self, key: impl Into<ConfigKey>) -> Result<Option<f64>> {
        let child = self.child(key);
        match child.value() {
            None | Some(ConfigValue::Null) => Ok(None),
            Some(ConfigValue::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::from_parse_float_error(child.path().to_string(), e)),
            Some(other) => other.as_f64().map(Some).ok_or_else(|| {
                ConfigError::type_mismatch(child.path().as_str(), "float", other.type_name())
            }),
        }
    }

    /// Reads `key` as a boolean. Missing or null paths yield `Ok(None)`.
    ///
    /// Strings are recognized case-insensitively: `true`, `yes`, `1`, `on` and
    /// `false`, `no`, `0`, `off`.
    pub fn get_bool(&self, key: impl Into<ConfigKey>) -> Result<Option<bool>> {
        let child = self.child(key);
        match child.value() {
            None | Some(ConfigValue::Null) => Ok(None),
            Some(ConfigValue::Bool(b)) => Ok(Some(b)),
            Some(ConfigValue::String(s)) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(Some(true)),
                "false" | "no" | "0" | "off" => Ok(Some(false)),
                _ => Err(ConfigError::type_mismatch(
                    child.path().as_str(),
                    "boolean",
                    "unrecognized string",
                )),
            },
            Some(other) => Err(ConfigError::type_mismatch(
                child.path().as_str(),
                "boolean",
                other.type_name(),
            )),
        }
    }
}

impl Default for ConfigNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode")
            .field("path", &self.path.as_str())
            .field("value", &self.value())
            .finish()
    }
}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // missing and explicit null render alike
        write!(f, "{}", self.to_value())
    }
}

impl From<&ConfigNode> for ConfigValue {
    fn from(node: &ConfigNode) -> Self {
        node.to_value()
    }
}

impl From<ConfigNode> for ConfigValue {
    fn from(node: ConfigNode) -> Self {
        node.to_value()
    }
}

impl PartialEq for ConfigNode {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl PartialEq<ConfigValue> for ConfigNode {
    fn eq(&self, other: &ConfigValue) -> bool {
        self.value().as_ref() == Some(other)
    }
}

impl PartialEq<ConfigValue> for Entry {
    fn eq(&self, other: &ConfigValue) -> bool {
        self.value().as_ref() == Some(other)
    }
}

macro_rules! delegate_scalar_cmp {
    ($($ty:ty),*) => {
        $(
            impl PartialEq<$ty> for ConfigNode {
                fn eq(&self, other: &$ty) -> bool {
                    matches!(self.value(), Some(v) if v == *other)
                }
            }

            impl PartialEq<$ty> for Entry {
                fn eq(&self, other: &$ty) -> bool {
                    matches!(self.value(), Some(v) if v == *other)
                }
            }
        )*
    };
}

delegate_scalar_cmp!(i64, i32, f64, bool, &str);

macro_rules! delegate_numeric_ord {
    ($($ty:ty),*) => {
        $(
            impl PartialOrd<$ty> for ConfigNode {
                fn partial_cmp(&self, other: &$ty) -> Option<Ordering> {
                    PartialOrd::<$ty>::partial_cmp(&self.value()?, other)
                }
            }

            impl PartialOrd<$ty> for Entry {
                fn partial_cmp(&self, other: &$ty) -> Option<Ordering> {
                    PartialOrd::<$ty>::partial_cmp(&self.value()?, other)
                }
            }
        )*
    };
}

delegate_numeric_ord!(i64, f64);
