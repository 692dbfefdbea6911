// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration source trait definition.
//!
//! This module defines the `ConfigSource` trait: anything that can produce one
//! layer of configuration data to be merged into a tree, such as an inline
//! defaults mapping, a defaults file or the process environment.

use crate::domain::{ConfigValue, Result};

/// A trait for configuration layers.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so they can be held by long-lived
/// configuration files.
///
/// # Examples
///
/// ```rust
/// use appscaffold::ports::ConfigSource;
/// use appscaffold::domain::{ConfigValue, Result};
///
/// struct Fixed;
///
/// impl ConfigSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn load(&self) -> Result<ConfigValue> {
///         Ok([("setting1", 666i64)].into_iter().collect())
///     }
/// }
///
/// let layer = Fixed.load().unwrap();
/// assert!(layer.is_mapping());
/// ```
pub trait ConfigSource: Send + Sync {
    /// Returns the name of this source.
    ///
    /// This name is used for logging and error messages. It should be a short,
    /// descriptive identifier like "env", "yaml-file" or "inline".
    fn name(&self) -> &str;

    /// Produces this source's layer.
    ///
    /// Sources are read afresh on every call, so a configuration file that is
    /// reloaded sees the current state of its sources.
    fn load(&self) -> Result<ConfigValue>;
}

/// An inline tree is a source of itself.
impl ConfigSource for ConfigValue {
    fn name(&self) -> &str {
        "inline"
    }

    fn load(&self) -> Result<ConfigValue> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl ConfigSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn load(&self) -> Result<ConfigValue> {
            Err(crate::domain::ConfigError::SourceError {
                source_name: self.name().to_string(),
                message: "unavailable".to_string(),
                source: None,
            })
        }
    }

    #[test]
    fn test_inline_source_yields_itself() {
        let value: ConfigValue = [("a", 1i64)].into_iter().collect();
        assert_eq!(value.name(), "inline");
        assert_eq!(value.load().unwrap(), value);
    }

    #[test]
    fn test_failing_source() {
        assert!(FailingSource.load().is_err());
    }

    #[test]
    fn test_config_source_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn ConfigSource>>();
    }
}
