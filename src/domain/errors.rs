// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the scaffolding crate.
//!
//! This module defines the errors that can occur when navigating a configuration
//! tree, loading files, substituting tokens or discovering plugins. All errors use
//! `thiserror` for proper error handling and conversion.
//!
//! A read through a path that does not exist is never an error; it is reported
//! as `None`, or as an [`Entry::Node`](crate::domain::Entry::Node) view that is not present.

use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for scaffolding operations.
///
/// It is marked as `#[non_exhaustive]` to allow for future additions without
/// breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use appscaffold::domain::errors::ConfigError;
///
/// fn substitute() -> Result<String, ConfigError> {
///     Err(ConfigError::MissingTokenKey {
///         key: "logging.log_dir".to_string(),
///     })
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A path segment tried to index through a scalar value.
    #[error("Cannot resolve '{key}': segment '{segment}' indexes into a scalar or mismatched container")]
    PathConflict {
        /// The full dotted path being resolved
        key: String,
        /// The segment at which resolution failed
        segment: String,
    },

    /// A value was assigned to the root path.
    #[error("Cannot assign to an empty configuration path")]
    EmptyKey,

    /// A `{config:...}` token referenced a path that resolves to nothing.
    #[error("No such config variable '{key}'")]
    MissingTokenKey {
        /// The path named by the token
        key: String,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An error occurred in a configuration source.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse or serialize structured configuration text.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A plugin module could not be loaded.
    #[error("Failed to load plugin module '{}': {message}", path.display())]
    PluginLoadError {
        /// The module file that failed
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// An I/O error occurred while reading or writing a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a TypeConversionError from a ParseIntError.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseFloatError.
    pub fn from_parse_float_error(key: String, err: ParseFloatError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "float".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError for a value whose variant does not match.
    pub fn type_mismatch(key: impl Into<String>, target_type: &str, found: &str) -> Self {
        ConfigError::TypeConversionError {
            key: key.into(),
            target_type: target_type.to_string(),
            source: format!("found {}", found).into(),
        }
    }
}

/// A specialized Result type for scaffolding operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
