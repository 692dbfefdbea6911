// SPDX-License-Identifier: MIT OR Apache-2.0

//! File storage trait definition.
//!
//! This module defines the `Storage` trait, the narrow file-layer interface the
//! configuration and plugin code depends on: read and write whole text files,
//! and list directories.

use crate::domain::Result;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// A trait for the file layer.
///
/// # Examples
///
/// ```rust
/// use appscaffold::adapters::LocalStorage;
/// use appscaffold::ports::Storage;
///
/// let storage = LocalStorage::new();
/// assert!(!storage.exists(std::path::Path::new("/definitely/not/here")));
/// ```
pub trait Storage: Debug + Send + Sync {
    /// Reads a whole file as text.
    fn read_text(&self, path: &Path) -> Result<String>;

    /// Writes `content` to a file, replacing anything already there.
    fn write_text(&self, path: &Path, content: &str) -> Result<()>;

    /// Lists the entries of a directory as full paths.
    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Whether `path` is a directory.
    fn is_directory(&self, path: &Path) -> bool;

    /// Whether `path` is itself a symbolic link. Storage without links
    /// never reports one.
    fn is_symlink(&self, _path: &Path) -> bool {
        false
    }

    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Removes a file. Removing a file that does not exist is not an error.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Reads a file as text, or `None` if it does not exist.
    fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        if self.exists(path) {
            self.read_text(path).map(Some)
        } else {
            Ok(None)
        }
    }
}
