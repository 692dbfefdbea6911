// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local filesystem storage adapter.

use crate::domain::{ConfigError, Result};
use crate::ports::Storage;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum allowed size for a text file read through storage (10MB)
/// This prevents denial of service attacks via extremely large files
const MAX_TEXT_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// [`Storage`] backed by `std::fs`.
///
/// # Examples
///
/// ```rust
/// use appscaffold::adapters::LocalStorage;
/// use appscaffold::ports::Storage;
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("state.yml");
///
/// let storage = LocalStorage::new();
/// storage.write_text(&path, "hello: world\n").unwrap();
/// assert_eq!(storage.read_text(&path).unwrap(), "hello: world\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    /// Creates a new local storage adapter.
    pub fn new() -> Self {
        LocalStorage
    }
}

fn display_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
}

impl Storage for LocalStorage {
    fn read_text(&self, path: &Path) -> Result<String> {
        // Check file size before reading to prevent DoS via large files
        let metadata = fs::metadata(path)?;
        if metadata.len() > MAX_TEXT_FILE_SIZE {
            return Err(ConfigError::SourceError {
                source_name: "storage".to_string(),
                message: format!(
                    "File too large: {} is {} bytes (max {} bytes)",
                    display_name(path),
                    metadata.len(),
                    MAX_TEXT_FILE_SIZE
                ),
                source: None,
            });
        }

        tracing::trace!("Reading {}", path.display());
        Ok(fs::read_to_string(path)?)
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        tracing::trace!("Writing {} bytes to {}", content.len(), path.display());
        fs::write(path, content)?;
        Ok(())
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn is_directory(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
