// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable configuration overlay.
//!
//! This module provides an adapter that turns prefixed environment variables
//! into path/value options and a configuration layer built from them.

use crate::domain::{ConfigNode, ConfigOptions, ConfigValue, Result};
use crate::ports::ConfigSource;
use std::collections::HashMap;
use std::env;

/// Maximum length for environment variable keys (prevents DoS)
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (prevents DoS)
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Prefix used when none is given.
pub const DEFAULT_ENV_PREFIX: &str = "APP";

/// Prefix honoured by every overlay regardless of its configured prefix.
///
/// Test suites use it to inject values without knowing the application prefix.
pub const TEST_ENV_PREFIX: &str = "__SC_";

/// Configuration overlay read from environment variables.
///
/// A variable named `<PREFIX>_<PATH>` (prefix matched case-insensitively) or
/// `__SC_<PATH>` becomes the option `<path>`: the remainder is lower-cased and,
/// unless disabled, each `_` becomes a path separator. Values are coerced with
/// [`ConfigValue::from_literal`], so `8080` is an integer, `0x1234` is 4660 and
/// `AAAA` stays a string.
///
/// # Examples
///
/// ```rust
/// use appscaffold::adapters::EnvVarAdapter;
/// use appscaffold::domain::ConfigValue;
/// use std::collections::HashMap;
///
/// let mut values = HashMap::new();
/// values.insert("MYAPP_SERVER_PORT".to_string(), "8080".to_string());
/// values.insert("OTHER_VAR".to_string(), "ignored".to_string());
///
/// let adapter = EnvVarAdapter::with_prefix("MYAPP").values(values);
/// let options = adapter.options();
///
/// assert_eq!(options.len(), 1);
/// assert_eq!(options["server.port"], ConfigValue::Integer(8080));
/// ```
#[derive(Debug, Clone)]
pub struct EnvVarAdapter {
    /// Prefix to filter environment variables, without the trailing `_`
    prefix: String,
    /// Whether to convert keys to lowercase
    lowercase_keys: bool,
    /// Whether to replace underscores with path separators
    replace_underscores: bool,
    /// Fixed variables used instead of the process environment
    values: Option<HashMap<String, String>>,
}

impl EnvVarAdapter {
    /// Creates an overlay using [`DEFAULT_ENV_PREFIX`].
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Creates an overlay reading variables that start with `<prefix>_`.
    ///
    /// A trailing `_` on `prefix` is ignored, so `"MYAPP"` and `"MYAPP_"` are
    /// the same prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        while prefix.ends_with('_') {
            prefix.pop();
        }
        Self {
            prefix,
            lowercase_keys: true,
            replace_underscores: true,
            values: None,
        }
    }

    /// Creates an overlay over fixed values with the default prefix.
    ///
    /// This is intended for tests that must not touch the process environment.
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self::new().values(values)
    }

    /// Reads `values` instead of the process environment.
    pub fn values(mut self, values: HashMap<String, String>) -> Self {
        self.values = Some(values);
        self
    }

    /// Sets whether to convert keys to lowercase (default: enabled).
    pub fn lowercase_keys(mut self, enabled: bool) -> Self {
        self.lowercase_keys = enabled;
        self
    }

    /// Sets whether to replace underscores with path separators (default: enabled).
    ///
    /// Enabled, `APP_SERVER_PORT` addresses `server.port`, so keys that contain
    /// an underscore themselves cannot be reached. Disable it to keep each name
    /// literal (`APP_MY_VAR` addresses `my_var`); then only dots in variable
    /// names separate path segments.
    pub fn replace_underscores(mut self, enabled: bool) -> Self {
        self.replace_underscores = enabled;
        self
    }

    /// Returns the configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn variables(&self) -> Vec<(String, String)> {
        match &self.values {
            Some(values) => values.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            None => env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Returns the part of `key` after a matching prefix.
    fn strip_prefix<'a>(&self, key: &'a str) -> Option<&'a str> {
        if let Some(rest) = key.strip_prefix(TEST_ENV_PREFIX) {
            return Some(rest);
        }

        let head = key.get(..self.prefix.len())?;
        if !head.eq_ignore_ascii_case(&self.prefix) {
            return None;
        }
        key[self.prefix.len()..].strip_prefix('_')
    }

    fn to_path(&self, remainder: &str) -> String {
        let remainder = if self.lowercase_keys {
            remainder.to_lowercase()
        } else {
            remainder.to_string()
        };
        let separators: &[char] = if self.replace_underscores { &['_', '.'] } else { &['.'] };

        remainder
            .split(separators)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Scans the environment and returns the matching path/value options.
    pub fn options(&self) -> ConfigOptions {
        let mut options = ConfigOptions::new();

        for (key, value) in self.variables() {
            // Validate input sizes to prevent DoS
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::warn!(
                    "Skipping oversized environment variable: key_len={}, value_len={} (max key={}, max value={})",
                    key.len(),
                    value.len(),
                    MAX_ENV_KEY_LEN,
                    MAX_ENV_VALUE_LEN
                );
                continue;
            }

            let Some(remainder) = self.strip_prefix(&key) else {
                continue;
            };
            let path = self.to_path(remainder);
            if path.is_empty() {
                continue;
            }

            options.insert(path, ConfigValue::from_literal(&value));
        }

        tracing::debug!(
            "Loaded {} environment options (prefix={}, lowercase={}, replace_underscores={})",
            options.len(),
            self.prefix,
            self.lowercase_keys,
            self.replace_underscores
        );

        options
    }

    /// Builds a fresh configuration node holding only the environment options.
    ///
    /// Fails with a path conflict if two variables disagree on whether a path
    /// is a scalar or a mapping, e.g. `APP_A=1` alongside `APP_A_B=2`.
    pub fn to_node(&self) -> Result<ConfigNode> {
        let node = ConfigNode::new();
        node.update(ConfigValue::Null, self.options())?;
        Ok(node)
    }
}

impl Default for EnvVarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for EnvVarAdapter {
    fn name(&self) -> &str {
        "env"
    }

    fn load(&self) -> Result<ConfigValue> {
        Ok(self.to_node()?.to_value())
    }
}
