// SPDX-License-Identifier: MIT OR Apache-2.0

//! `{config:<path>}` token substitution.

use crate::domain::{ConfigError, ConfigNode, ConfigValue, Result};

const TOKEN_OPEN: &str = "{config:";
const TOKEN_CLOSE: char = '}';

/// Rewrites strings by replacing `{config:<dotted.path>}` tokens with values
/// from a live configuration tree.
///
/// A token whose path resolves to nothing (missing or null) is a
/// [`ConfigError::MissingTokenKey`]. Malformed input, an unterminated token or
/// a brace inside a token, is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use appscaffold::domain::ConfigNode;
/// use appscaffold::service::ConfigApplicator;
///
/// let config = ConfigNode::new();
/// config.set("setting1", 666i64).unwrap();
/// config.set("setting3.key1", "value").unwrap();
///
/// let applicator = ConfigApplicator::new(&config);
/// let path = applicator
///     .apply("/p/{config:setting1}/{config:setting3.key1}.txt")
///     .unwrap();
/// assert_eq!(path, "/p/666/value.txt");
/// ```
#[derive(Debug, Clone)]
pub struct ConfigApplicator {
    config: ConfigNode,
}

impl ConfigApplicator {
    /// Creates an applicator bound to `config`.
    ///
    /// The applicator shares the tree, so later changes to `config` are seen
    /// by later substitutions.
    pub fn new(config: &ConfigNode) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Substitutes every token in `text`.
    pub fn apply(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(TOKEN_OPEN) {
            out.push_str(&rest[..start]);
            let after = &rest[start + TOKEN_OPEN.len()..];

            let Some(end) = after.find(TOKEN_CLOSE) else {
                return Ok(text.to_string());
            };
            let path = &after[..end];
            if path.contains('{') {
                return Ok(text.to_string());
            }

            out.push_str(&self.resolve(path)?);
            rest = &after[end + TOKEN_CLOSE.len_utf8()..];
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Substitutes tokens in a string value. Any other value is returned as is.
    pub fn apply_value(&self, value: ConfigValue) -> Result<ConfigValue> {
        match value {
            ConfigValue::String(text) => self.apply(&text).map(ConfigValue::String),
            other => Ok(other),
        }
    }

    fn resolve(&self, path: &str) -> Result<String> {
        let missing = || ConfigError::MissingTokenKey {
            key: path.to_string(),
        };
        if path.is_empty() {
            return Err(missing());
        }

        match self.config.get(path).value() {
            Some(value) if !value.is_null() => Ok(value.to_string()),
            _ => Err(missing()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ConfigNode {
        let config = ConfigNode::new();
        config.set("setting1", 666i64).unwrap();
        config.set("setting2", true).unwrap();
        config.set("setting3.key1", "value").unwrap();
        config.set("ratio", 0.5).unwrap();
        config.set("nothing", ConfigValue::Null).unwrap();
        config
    }

    #[test]
    fn test_apply_tokens() {
        let applicator = ConfigApplicator::new(&config());
        assert_eq!(
            applicator
                .apply("/p/{config:setting1}/{config:setting3.key1}.txt")
                .unwrap(),
            "/p/666/value.txt"
        );
    }

    #[test]
    fn test_apply_scalar_forms() {
        let applicator = ConfigApplicator::new(&config());
        assert_eq!(
            applicator.apply("{config:setting2}-{config:ratio}").unwrap(),
            "true-0.5"
        );
    }

    #[test]
    fn test_apply_without_tokens() {
        let applicator = ConfigApplicator::new(&config());
        assert_eq!(applicator.apply("/plain/path").unwrap(), "/plain/path");
        assert_eq!(applicator.apply("").unwrap(), "");
        assert_eq!(applicator.apply("a}b{c").unwrap(), "a}b{c");
    }

    #[test]
    fn test_apply_unterminated_is_unchanged() {
        let applicator = ConfigApplicator::new(&config());
        assert_eq!(applicator.apply("{config:missing").unwrap(), "{config:missing");
        assert_eq!(
            applicator.apply("{config:setting1}/{config:setting2").unwrap(),
            "{config:setting1}/{config:setting2"
        );
    }

    #[test]
    fn test_apply_nested_is_unchanged() {
        let applicator = ConfigApplicator::new(&config());
        let text = "{config:{config:setting1}}";
        assert_eq!(applicator.apply(text).unwrap(), text);
    }

    #[test]
    fn test_apply_missing_key() {
        let applicator = ConfigApplicator::new(&config());
        match applicator.apply("{config:xxx}") {
            Err(ConfigError::MissingTokenKey { key }) => assert_eq!(key, "xxx"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_apply_null_and_empty_are_missing() {
        let applicator = ConfigApplicator::new(&config());
        assert!(matches!(
            applicator.apply("{config:nothing}"),
            Err(ConfigError::MissingTokenKey { .. })
        ));
        assert!(matches!(
            applicator.apply("{config:}"),
            Err(ConfigError::MissingTokenKey { .. })
        ));
    }

    #[test]
    fn test_apply_sees_live_changes() {
        let config = config();
        let applicator = ConfigApplicator::new(&config);
        config.set("setting1", 667i64).unwrap();
        assert_eq!(applicator.apply("{config:setting1}").unwrap(), "667");
    }

    #[test]
    fn test_apply_value() {
        let applicator = ConfigApplicator::new(&config());
        assert_eq!(
            applicator
                .apply_value(ConfigValue::from("{config:setting1}"))
                .unwrap(),
            ConfigValue::from("666")
        );
        assert_eq!(
            applicator.apply_value(ConfigValue::Integer(5)).unwrap(),
            ConfigValue::Integer(5)
        );
    }
}
