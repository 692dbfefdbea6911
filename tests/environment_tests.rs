// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the application environment.
//!
//! An application layout is set up in an in-memory storage, then loaded with
//! its configuration file and plugin directories.


use appscaffold::adapters::ModuleCatalog;
use appscaffold::domain::{ConfigError, Plugin};
use appscaffold::service::{ConfigFile, Directory, Environment, File, PluginLoader};
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use test_helpers::{init_tracing, MemoryStorage};

#[derive(Default)]
struct Backup;

impl Plugin for Backup {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
struct Restore;

impl Plugin for Restore {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

const APP_CONFIG: &str = r#"
setting1: 667
somedir: /srv/data
somefile: notes.txt
plugin_dir: /app/plugins
"#;

fn app_storage() -> Arc<MemoryStorage> {
    MemoryStorage::new()
        .with_file("/app/config.yml", APP_CONFIG)
        .with_file("/app/defaults.yml", "setting1: 1\nsetting2: 2\n")
        .with_file("/srv/data/notes.txt", "remember\n")
        .with_file("/app/plugins/backup.plugin", "")
        .with_file("/app/plugins/more/restore.plugin", "")
        .shared()
}

fn loader(storage: &Arc<MemoryStorage>) -> PluginLoader {
    let catalog = ModuleCatalog::new()
        .define::<Backup>("backup")
        .define::<Restore>("restore");
    PluginLoader::new(catalog).with_storage(storage.clone())
}

fn app_dir() -> Directory {
    Directory::new("/app").with_file("config", "config.yml")
}

#[test]
fn test_config_read_from_directory_child() {
    let storage = app_storage();
    let env = Environment::builder()
        .storage(storage.clone())
        .child("app", app_dir())
        .build()
        .unwrap();

    assert_eq!(env.config().get("setting1"), 667i64);
    assert_eq!(
        env.config_file().unwrap().file_path(),
        Path::new("/app/config.yml")
    );
}

#[test]
fn test_config_file_with_defaults() {
    let storage = app_storage();
    let file = ConfigFile::builder("/app/config.yml")
        .defaults_file("/app/defaults.yml")
        .storage(storage.clone())
        .load(false)
        .build()
        .unwrap();

    let env = Environment::builder()
        .storage(storage.clone())
        .config_file(file)
        .build()
        .unwrap();

    assert!(env.config_file().unwrap().is_loaded());
    assert_eq!(env.config().get("setting1"), 667i64);
    assert_eq!(env.config().get("setting2"), 2i64);
}

#[test]
fn test_layout_paths_from_config() {
    let storage = app_storage();
    let env = Environment::builder()
        .storage(storage.clone())
        .child("app", app_dir())
        .child(
            "data",
            Directory::new("{config:somedir}").with_file("notes", "{config:somefile}"),
        )
        .child("log", File::new("{config:somedir}/app.log"))
        .build()
        .unwrap();

    let data = env.directory("data").unwrap();
    assert_eq!(data.path(), Path::new("/srv/data"));
    assert!(data.exists(storage.as_ref()));
    assert_eq!(data.path_to("other.txt"), Path::new("/srv/data/other.txt"));

    let notes = data.file("notes").unwrap();
    assert_eq!(notes.path(), Path::new("/srv/data/notes.txt"));
    assert_eq!(notes.read(storage.as_ref()).unwrap(), "remember\n");

    let log = env.file("log").unwrap();
    assert_eq!(log.path(), Path::new("/srv/data/app.log"));
    assert!(!log.exists(storage.as_ref()));
}

#[test]
fn test_plugins_loaded_from_layout() {
    init_tracing();
    let storage = app_storage();
    let env = Environment::builder()
        .storage(storage.clone())
        .plugin_loader(loader(&storage))
        .child(
            "app",
            app_dir().with_directory("plugins", Directory::plugin_dir("{config:plugin_dir}")),
        )
        .build()
        .unwrap();

    let plugins = env.plugins();
    assert_eq!(plugins.len(), 2);
    assert!(plugins[0].is::<Backup>());
    assert!(plugins[1].is::<Restore>());
    assert!(env.registry().contains::<Restore>());

    let (dir, report) = &env.load_reports()[0];
    assert_eq!(dir, Path::new("/app/plugins"));
    assert!(report.is_clean());
}

#[test]
fn test_cleanup_leaves_files_in_place() {
    let storage = app_storage();
    let mut env = Environment::builder()
        .storage(storage.clone())
        .plugin_loader(loader(&storage))
        .child("app", app_dir())
        .child("plugins", Directory::plugin_dir("{config:plugin_dir}"))
        .build()
        .unwrap();
    assert_eq!(env.plugins().len(), 2);

    env.cleanup();
    assert!(env.plugins().is_empty());
    assert!(storage.content("/app/plugins/backup.plugin").is_some());
    assert!(storage.content("/app/config.yml").is_some());
    assert_eq!(env.config().get("setting1"), 667i64);
}

#[test]
fn test_unknown_token_in_layout_fails() {
    let storage = app_storage();
    let result = Environment::builder()
        .storage(storage.clone())
        .child("app", app_dir())
        .child("data", Directory::new("{config:nonexistent}"))
        .build();

    match result {
        Err(ConfigError::MissingTokenKey { key }) => assert_eq!(key, "nonexistent"),
        other => panic!("expected MissingTokenKey, got {:?}", other),
    }
}

#[test]
fn test_missing_config_file_gives_empty_config() {
    let storage = MemoryStorage::new().shared();
    let env = Environment::builder()
        .storage(storage.clone())
        .child("app", app_dir())
        .build()
        .unwrap();

    assert!(env.config().to_value().as_mapping().unwrap().is_empty());
    assert!(env.config_file().unwrap().is_loaded());
}
