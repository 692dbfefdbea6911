// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk layout of an application.
//!
//! A [`Directory`] is a tree of named [`File`] and [`Directory`] children. Each
//! node's path is a template: `{config:<path>}` tokens are filled in from a
//! configuration tree by `apply_config`, and a leading `~` is expanded to the
//! home directory. A child's path is relative to its parent unless it is
//! absolute.
//!
//! The layout resolves paths and reads or writes files through a [`Storage`].
//! It never creates or removes anything on disk.

use crate::domain::Result;
use crate::ports::Storage;
use crate::service::ConfigApplicator;
use directories::BaseDirs;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

fn expand_home(template: &str) -> PathBuf {
    let rest = match template.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', MAIN_SEPARATOR]) => rest,
        _ => return PathBuf::from(template),
    };
    match BaseDirs::new() {
        Some(dirs) => dirs
            .home_dir()
            .join(rest.trim_start_matches(['/', MAIN_SEPARATOR])),
        None => PathBuf::from(template),
    }
}

fn resolve(template: &str, parent: Option<&Path>) -> PathBuf {
    let own = expand_home(template);
    match parent {
        Some(parent) => parent.join(own),
        None => own,
    }
}

/// A file that may or may not exist.
///
/// # Examples
///
/// ```rust
/// use appscaffold::domain::ConfigNode;
/// use appscaffold::service::{ConfigApplicator, File};
///
/// let config = ConfigNode::new();
/// config.set("logfile", "/var/log/app.log").unwrap();
///
/// let mut file = File::new("{config:logfile}");
/// file.apply_config(&ConfigApplicator::new(&config)).unwrap();
///
/// assert_eq!(file.path(), std::path::Path::new("/var/log/app.log"));
/// assert_eq!(file.name(), Some("app.log"));
/// assert_eq!(file.extension(), Some("log"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    template: String,
    parent: Option<PathBuf>,
    path: PathBuf,
}

impl File {
    /// Creates a file from a path template.
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let path = resolve(&template, None);
        Self {
            template,
            parent: None,
            path,
        }
    }

    /// Returns the path template, with any tokens already applied.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the resolved path, joined onto the parent directory if any.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file name.
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Returns the extension, without the dot.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// Replaces config tokens in the path template.
    pub fn apply_config(&mut self, applicator: &ConfigApplicator) -> Result<()> {
        self.template = applicator.apply(&self.template)?;
        self.path = resolve(&self.template, self.parent.as_deref());
        Ok(())
    }

    fn rebase(&mut self, parent: &Path) {
        self.parent = Some(parent.to_path_buf());
        self.path = resolve(&self.template, Some(parent));
    }

    /// Whether the file exists in `storage`.
    pub fn exists(&self, storage: &dyn Storage) -> bool {
        storage.exists(&self.path)
    }

    /// Reads the whole file.
    pub fn read(&self, storage: &dyn Storage) -> Result<String> {
        storage.read_text(&self.path)
    }

    /// Replaces the file's content.
    pub fn write(&self, storage: &dyn Storage, content: &str) -> Result<()> {
        storage.write_text(&self.path, content)
    }
}

/// A child of a [`Directory`] or an [`Environment`](crate::service::Environment).
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    /// A single file.
    File(File),
    /// A directory with children of its own.
    Directory(Directory),
}

impl LayoutNode {
    /// Returns the resolved path.
    pub fn path(&self) -> &Path {
        match self {
            LayoutNode::File(file) => file.path(),
            LayoutNode::Directory(dir) => dir.path(),
        }
    }

    /// Replaces config tokens in this node's path and everything below it.
    pub fn apply_config(&mut self, applicator: &ConfigApplicator) -> Result<()> {
        match self {
            LayoutNode::File(file) => file.apply_config(applicator),
            LayoutNode::Directory(dir) => dir.apply_config(applicator),
        }
    }

    /// Returns the file, if this is one.
    pub fn as_file(&self) -> Option<&File> {
        match self {
            LayoutNode::File(file) => Some(file),
            LayoutNode::Directory(_) => None,
        }
    }

    /// Returns the directory, if this is one.
    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            LayoutNode::Directory(dir) => Some(dir),
            LayoutNode::File(_) => None,
        }
    }

    fn rebase(&mut self, parent: &Path) {
        match self {
            LayoutNode::File(file) => file.rebase(parent),
            LayoutNode::Directory(dir) => dir.rebase(parent),
        }
    }
}

impl From<File> for LayoutNode {
    fn from(file: File) -> Self {
        LayoutNode::File(file)
    }
}

impl From<Directory> for LayoutNode {
    fn from(dir: Directory) -> Self {
        LayoutNode::Directory(dir)
    }
}

/// A directory and its named children.
///
/// A directory made with [`Directory::plugin_dir`] is also a plugin
/// directory: an [`Environment`](crate::service::Environment) loads the
/// plugin modules under it.
///
/// # Examples
///
/// ```rust
/// use appscaffold::domain::ConfigNode;
/// use appscaffold::service::{ConfigApplicator, Directory};
/// use std::path::Path;
///
/// let config = ConfigNode::new();
/// config.set("data_dir", "/srv/app").unwrap();
///
/// let mut dir = Directory::new("{config:data_dir}")
///     .with_file("db", "store.db")
///     .with_directory("cache", Directory::new("cache"));
/// dir.apply_config(&ConfigApplicator::new(&config)).unwrap();
///
/// assert_eq!(dir.path(), Path::new("/srv/app"));
/// assert_eq!(dir.file("db").unwrap().path(), Path::new("/srv/app/store.db"));
/// assert_eq!(dir.directory("cache").unwrap().path(), Path::new("/srv/app/cache"));
/// assert_eq!(dir.path_to("other.txt"), Path::new("/srv/app/other.txt"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    template: String,
    parent: Option<PathBuf>,
    path: PathBuf,
    plugins: bool,
    children: BTreeMap<String, LayoutNode>,
}

impl Directory {
    /// Creates a directory from a path template.
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let path = resolve(&template, None);
        Self {
            template,
            parent: None,
            path,
            plugins: false,
            children: BTreeMap::new(),
        }
    }

    /// Creates a directory whose plugin modules are loaded by an environment.
    pub fn plugin_dir(template: impl Into<String>) -> Self {
        Self {
            plugins: true,
            ..Self::new(template)
        }
    }

    /// Adds a file child at `key` with the given path template.
    pub fn with_file(self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.with_child(key, File::new(template))
    }

    /// Adds a directory child at `key`.
    pub fn with_directory(self, key: impl Into<String>, dir: Directory) -> Self {
        self.with_child(key, dir)
    }

    /// Adds any child at `key`.
    pub fn with_child(mut self, key: impl Into<String>, child: impl Into<LayoutNode>) -> Self {
        self.add(key, child);
        self
    }

    /// Adds `child` at `key`, replacing any child already there.
    pub fn add(&mut self, key: impl Into<String>, child: impl Into<LayoutNode>) {
        let mut child = child.into();
        child.rebase(&self.path);
        self.children.insert(key.into(), child);
    }

    /// Returns the path template, with any tokens already applied.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the resolved path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether plugins are loaded from this directory.
    pub fn is_plugin_dir(&self) -> bool {
        self.plugins
    }

    /// Returns the path to `relative` inside this directory.
    pub fn path_to(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.path.join(relative)
    }

    /// Returns the child at `key`.
    pub fn child(&self, key: &str) -> Option<&LayoutNode> {
        self.children.get(key)
    }

    /// Returns the file child at `key`.
    pub fn file(&self, key: &str) -> Option<&File> {
        self.child(key).and_then(LayoutNode::as_file)
    }

    /// Returns the directory child at `key`.
    pub fn directory(&self, key: &str) -> Option<&Directory> {
        self.child(key).and_then(LayoutNode::as_directory)
    }

    /// Iterates over the children in key order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &LayoutNode)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns this directory and every nested directory marked as a plugin
    /// directory, parents first.
    pub fn plugin_dirs(&self) -> Vec<&Directory> {
        let mut found = Vec::new();
        self.collect_plugin_dirs(&mut found);
        found
    }

    fn collect_plugin_dirs<'a>(&'a self, found: &mut Vec<&'a Directory>) {
        if self.plugins {
            found.push(self);
        }
        for child in self.children.values() {
            if let LayoutNode::Directory(dir) = child {
                dir.collect_plugin_dirs(found);
            }
        }
    }

    /// Replaces config tokens in this directory's path and in every child's.
    pub fn apply_config(&mut self, applicator: &ConfigApplicator) -> Result<()> {
        self.template = applicator.apply(&self.template)?;
        self.path = resolve(&self.template, self.parent.as_deref());
        for child in self.children.values_mut() {
            child.apply_config(applicator)?;
            child.rebase(&self.path);
        }
        Ok(())
    }

    fn rebase(&mut self, parent: &Path) {
        self.parent = Some(parent.to_path_buf());
        self.path = resolve(&self.template, Some(parent));
        for child in self.children.values_mut() {
            child.rebase(&self.path);
        }
    }

    /// Whether the directory exists in `storage`.
    pub fn exists(&self, storage: &dyn Storage) -> bool {
        storage.is_directory(&self.path)
    }

    /// Lists the directory's entries as full paths.
    pub fn list(&self, storage: &dyn Storage) -> Result<Vec<PathBuf>> {
        storage.list_directory(&self.path)
    }

    /// Reads `filename` inside this directory.
    pub fn read(&self, storage: &dyn Storage, filename: impl AsRef<Path>) -> Result<String> {
        storage.read_text(&self.path_to(filename))
    }

    /// Writes `content` to `filename` inside this directory.
    pub fn write(
        &self,
        storage: &dyn Storage,
        filename: impl AsRef<Path>,
        content: &str,
    ) -> Result<()> {
        storage.write_text(&self.path_to(filename), content)
    }
}
