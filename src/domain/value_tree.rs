// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dotted-path access over a configuration value tree.
//!
//! A `ValueTree` owns one root [`ConfigValue`] and resolves [`ConfigKey`] paths
//! against it. Reads never fail: a path that does not resolve yields `None`.
//! Writes create missing intermediate mappings on the way down and pad
//! sequences with nulls, but refuse to index through a scalar. Null counts as
//! a scalar here: an explicit null is a value, not an empty slot.

use crate::domain::config_key::{ConfigKey, Segment};
use crate::domain::config_value::ConfigValue;
use crate::domain::errors::{ConfigError, Result};

/// How far past the end of a sequence a write may reach. Larger gaps are
/// rejected instead of padded.
pub const MAX_SEQUENCE_PADDING: usize = 1024;

/// A root value addressed by dotted paths.
///
/// # Examples
///
/// ```
/// use appscaffold::domain::{ConfigKey, ConfigValue, ValueTree};
///
/// let mut tree = ValueTree::default();
/// tree.set(&ConfigKey::from("x.y.z"), ConfigValue::from(5i64)).unwrap();
///
/// assert_eq!(tree.get(&ConfigKey::from("x.y.z")), Some(&ConfigValue::Integer(5)));
/// assert!(tree.get(&ConfigKey::from("x.y")).unwrap().is_mapping());
/// assert_eq!(tree.get(&ConfigKey::from("x.q")), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ValueTree {
    root: ConfigValue,
}

impl ValueTree {
    /// Creates a tree over the given root value.
    pub fn new(root: ConfigValue) -> Self {
        Self { root }
    }

    /// Returns the root value.
    pub fn root(&self) -> &ConfigValue {
        &self.root
    }

    /// Replaces the root value wholesale.
    pub fn replace_root(&mut self, root: ConfigValue) {
        self.root = root;
    }

    /// Consumes the tree, returning its root value.
    pub fn into_root(self) -> ConfigValue {
        self.root
    }

    /// Resolves `key` against the tree.
    ///
    /// Each segment is a mapping key, or a sequence index when the current node
    /// is a sequence and the segment is a non-negative integer. Returns `None`
    /// as soon as a segment is absent, out of range, or would index a scalar.
    /// The root key returns the whole tree.
    pub fn get(&self, key: &ConfigKey) -> Option<&ConfigValue> {
        key.segments().try_fold(&self.root, |node, segment| match node {
            ConfigValue::Mapping(map) => map.get(segment.as_str()),
            ConfigValue::Sequence(items) => segment.index().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Assigns `value` at `key`, creating missing intermediate containers.
    ///
    /// Fails with [`ConfigError::PathConflict`] when the path runs through a
    /// scalar or null, or reaches more than [`MAX_SEQUENCE_PADDING`] slots past
    /// the end of a sequence.
    ///
    /// Assigning to the root key fails with [`ConfigError::EmptyKey`]; replace
    /// the root with [`ValueTree::replace_root`] or [`ValueTree::merge`] instead.
    pub fn set(&mut self, key: &ConfigKey, value: ConfigValue) -> Result<()> {
        if key.is_root() {
            return Err(ConfigError::EmptyKey);
        }
        *self.vivify(key)? = value;
        Ok(())
    }

    /// Deep-merges `source` into the subtree at `key`, creating it if needed.
    ///
    /// See [`deep_merge`] for the precedence rules.
    pub fn merge(&mut self, key: &ConfigKey, source: ConfigValue) -> Result<()> {
        if key.is_root() {
            self.merge_root(source);
        } else {
            deep_merge(self.vivify(key)?, source);
        }
        Ok(())
    }

    /// Deep-merges `source` into the root. Unlike a keyed merge this cannot
    /// fail, since nothing has to be created on the way.
    pub fn merge_root(&mut self, source: ConfigValue) {
        deep_merge(&mut self.root, source);
    }

    /// Walks to `key` with auto-vivification and returns the slot found there.
    fn vivify(&mut self, key: &ConfigKey) -> Result<&mut ConfigValue> {
        let mut node = &mut self.root;
        let mut segments = key.segments().peekable();
        while let Some(segment) = segments.next() {
            let last = segments.peek().is_none();
            node = descend_mut(node, segment, last, key)?;
        }
        Ok(node)
    }
}

impl Default for ValueTree {
    fn default() -> Self {
        Self::new(ConfigValue::mapping())
    }
}

fn descend_mut<'a>(
    node: &'a mut ConfigValue,
    segment: Segment<'_>,
    last: bool,
    key: &ConfigKey,
) -> Result<&'a mut ConfigValue> {
    let vacant = || {
        if last {
            ConfigValue::Null
        } else {
            ConfigValue::mapping()
        }
    };

    match node {
        ConfigValue::Mapping(map) => Ok(map
            .entry(segment.as_str().to_string())
            .or_insert_with(vacant)),
        ConfigValue::Sequence(items) => {
            let index = segment.index().ok_or_else(|| conflict(key, segment))?;
            if index > items.len().saturating_add(MAX_SEQUENCE_PADDING) {
                return Err(conflict(key, segment));
            }
            if index >= items.len() {
                items.resize(index, ConfigValue::Null);
                items.push(vacant());
            }
            Ok(&mut items[index])
        }
        _ => Err(conflict(key, segment)),
    }
}

fn conflict(key: &ConfigKey, segment: Segment<'_>) -> ConfigError {
    ConfigError::PathConflict {
        key: key.to_string(),
        segment: segment.to_string(),
    }
}

/// Recursively merges `source` into `target`.
///
/// For every key in a source mapping: if both sides hold mappings the merge
/// recurses, otherwise the source value overwrites the target wholesale,
/// including changes of type. A non-mapping source replaces the target.
///
/// # Examples
///
/// ```
/// use appscaffold::domain::value_tree::deep_merge;
/// use appscaffold::domain::ConfigValue;
///
/// let mut target: ConfigValue = [("a", 1i64), ("b", 2)].into_iter().collect();
/// let source: ConfigValue = [("a", 666i64), ("c", 777)].into_iter().collect();
/// deep_merge(&mut target, source);
///
/// let expected: ConfigValue = [("a", 666i64), ("b", 2), ("c", 777)].into_iter().collect();
/// assert_eq!(target, expected);
/// ```
pub fn deep_merge(target: &mut ConfigValue, source: ConfigValue) {
    match (target, source) {
        (ConfigValue::Mapping(target), ConfigValue::Mapping(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(path: &str) -> ConfigKey {
        ConfigKey::from(path)
    }

    fn sample() -> ValueTree {
        let derp = ConfigValue::from(vec![
            [("a", 1i64)].into_iter().collect::<ConfigValue>(),
            [("a", 2i64)].into_iter().collect::<ConfigValue>(),
        ]);
        let thang: ConfigValue = [("a", 1i64), ("b", 2)].into_iter().collect();
        let root: ConfigValue = [
            ("thing", ConfigValue::Integer(123)),
            ("thang", thang),
            ("derp", derp),
        ]
        .into_iter()
        .collect();
        ValueTree::new(root)
    }

    #[test]
    fn test_get_nested() {
        let tree = sample();
        assert_eq!(tree.get(&key("thang.b")), Some(&ConfigValue::Integer(2)));
        assert_eq!(tree.get(&key("derp.1.a")), Some(&ConfigValue::Integer(2)));
    }

    #[test]
    fn test_get_root() {
        let tree = sample();
        assert_eq!(tree.get(&ConfigKey::root()), Some(tree.root()));
    }

    #[test]
    fn test_get_missing_is_none() {
        let tree = sample();
        assert_eq!(tree.get(&key("nope")), None);
        assert_eq!(tree.get(&key("derp.5.a")), None);
        assert_eq!(tree.get(&key("derp.x")), None);
        // indexing through a scalar
        assert_eq!(tree.get(&key("thing.a")), None);
    }

    #[test]
    fn test_set_auto_vivifies() {
        let mut tree = ValueTree::default();
        tree.set(&key("x.y.z"), ConfigValue::Integer(5)).unwrap();
        assert_eq!(tree.get(&key("x.y.z")), Some(&ConfigValue::Integer(5)));
        assert!(tree.get(&key("x")).unwrap().is_mapping());
        assert!(tree.get(&key("x.y")).unwrap().is_mapping());
    }

    #[test]
    fn test_set_extends_sequence_with_padding() {
        let mut tree = sample();
        tree.set(&key("derp.4.a"), ConfigValue::Integer(9)).unwrap();
        let derp = tree.get(&key("derp")).unwrap().as_sequence().unwrap();
        assert_eq!(derp.len(), 5);
        assert_eq!(derp[2], ConfigValue::Null);
        assert_eq!(derp[3], ConfigValue::Null);
        assert_eq!(tree.get(&key("derp.4.a")), Some(&ConfigValue::Integer(9)));
    }

    #[test]
    fn test_set_appends_to_sequence() {
        let mut tree = sample();
        tree.set(&key("derp.2"), ConfigValue::from("tail")).unwrap();
        assert_eq!(tree.get(&key("derp.2")), Some(&ConfigValue::from("tail")));
    }

    #[test]
    fn test_set_through_scalar_fails() {
        let mut tree = sample();
        let err = tree.set(&key("thing.a"), ConfigValue::Integer(1)).unwrap_err();
        assert!(matches!(err, ConfigError::PathConflict { ref segment, .. } if segment == "a"));
        assert_eq!(tree.get(&key("thing")), Some(&ConfigValue::Integer(123)));
    }

    #[test]
    fn test_set_non_index_on_sequence_fails() {
        let mut tree = sample();
        let err = tree.set(&key("derp.x"), ConfigValue::Integer(1)).unwrap_err();
        assert!(matches!(err, ConfigError::PathConflict { .. }));
    }

    #[test]
    fn test_set_root_fails() {
        let mut tree = sample();
        assert!(matches!(
            tree.set(&ConfigKey::root(), ConfigValue::Null),
            Err(ConfigError::EmptyKey)
        ));
    }

    #[test]
    fn test_set_through_null_fails() {
        let mut tree = ValueTree::new([("logging", ConfigValue::Null)].into_iter().collect());
        let err = tree.set(&key("logging.level"), ConfigValue::from("info")).unwrap_err();
        assert!(matches!(err, ConfigError::PathConflict { ref segment, .. } if segment == "level"));
        assert_eq!(tree.get(&key("logging")), Some(&ConfigValue::Null));
    }

    #[test]
    fn test_set_replaces_null_leaf() {
        let mut tree = ValueTree::new([("logging", ConfigValue::Null)].into_iter().collect());
        tree.set(&key("logging"), ConfigValue::from("info")).unwrap();
        assert_eq!(tree.get(&key("logging")), Some(&ConfigValue::from("info")));
    }

    #[test]
    fn test_set_far_past_sequence_end_fails() {
        let mut tree = sample();
        let err = tree.set(&key("derp.99999999999"), ConfigValue::Integer(1)).unwrap_err();
        assert!(matches!(err, ConfigError::PathConflict { .. }));
        assert_eq!(tree.get(&key("derp")).unwrap().as_sequence().unwrap().len(), 2);

        let edge = format!("derp.{}", 2 + MAX_SEQUENCE_PADDING);
        tree.set(&key(&edge), ConfigValue::Integer(1)).unwrap();
    }

    #[test]
    fn test_deep_merge_precedence() {
        let mut target: ConfigValue = [
            ("thing", ConfigValue::Integer(123)),
            ("thang", [("a", 1i64), ("b", 2)].into_iter().collect()),
        ]
        .into_iter()
        .collect();
        let source: ConfigValue = [("thang", [("a", 666i64), ("c", 777)].into_iter().collect::<ConfigValue>())]
            .into_iter()
            .collect();
        deep_merge(&mut target, source);

        let expected: ConfigValue = [
            ("thing", ConfigValue::Integer(123)),
            ("thang", [("a", 666i64), ("b", 2), ("c", 777)].into_iter().collect()),
        ]
        .into_iter()
        .collect();
        assert_eq!(target, expected);
    }

    #[test]
    fn test_deep_merge_type_change_overwrites() {
        let mut target: ConfigValue = [("a", [("b", 1i64)].into_iter().collect::<ConfigValue>())]
            .into_iter()
            .collect();
        deep_merge(&mut target, [("a", 5i64)].into_iter().collect());
        assert_eq!(target, [("a", 5i64)].into_iter().collect::<ConfigValue>());
    }

    #[test]
    fn test_merge_at_missing_path_creates_it() {
        let mut tree = ValueTree::default();
        tree.merge(&key("server"), [("port", 8080i64)].into_iter().collect())
            .unwrap();
        assert_eq!(tree.get(&key("server.port")), Some(&ConfigValue::Integer(8080)));
    }
}
