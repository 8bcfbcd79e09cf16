//! Integration tests for the cached tag configuration store.
//!
//! Verifies lazy loading, staleness until an explicit reload, and that a
//! reload is visible to every later reader.

use aitag_settings::settings::{DEFAULT_PLUGIN_NAME, SettingsSource, StaticSettings, TAG_SUFFIX_KEY};
use aitag_settings::tags::{TagConfigPaths, TagConfigStore};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn setup_store(initial: &str) -> (TempDir, TagConfigPaths, TagConfigStore) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let paths = TagConfigPaths::new(temp.path(), None);
    fs::write(paths.config_path(), initial).unwrap();
    let store = TagConfigStore::from_paths(paths.clone(), None);
    (temp, paths, store)
}

#[test]
fn first_access_loads_from_disk() {
    let (_temp, _paths, store) = setup_store("TagName,ImageEnabled\nCat,true\n");
    assert!(store.cached().is_none());

    let config = store.get_tag_configuration(false);
    assert!(config.resolve("Cat").image_enabled);
    assert!(store.cached().is_some());
}

#[test]
fn edits_are_invisible_until_reload() {
    let (_temp, paths, store) = setup_store("TagName,ImageEnabled\nCat,true\n");
    let before = store.get_tag_configuration(false);

    fs::write(paths.config_path(), "TagName,ImageEnabled\nCat,false\n").unwrap();

    let stale = store.get_tag_configuration(false);
    assert!(Arc::ptr_eq(&before, &stale));
    assert!(stale.resolve("Cat").image_enabled);

    let reloaded = store.get_tag_configuration(true);
    assert!(!reloaded.resolve("Cat").image_enabled);

    let after = store.get_tag_configuration(false);
    assert!(Arc::ptr_eq(&reloaded, &after));
    assert!(!after.resolve("Cat").image_enabled);

    // Snapshots held by callers are never mutated by a reload.
    assert!(before.resolve("Cat").image_enabled);
}

#[test]
fn reload_after_file_removed_falls_back_to_defaults() {
    let (_temp, paths, store) = setup_store("TagName,MarkersEnabled\n*,false\n");
    assert!(!store.get().global_settings().markers_enabled);

    fs::remove_file(paths.config_path()).unwrap();

    let reloaded = store.reload();
    assert!(reloaded.global_settings().markers_enabled);
    assert!(reloaded.is_empty());
}

#[test]
fn store_passes_settings_source_to_loader() {
    let temp = TempDir::new().unwrap();
    let paths = TagConfigPaths::new(temp.path(), None);
    let settings: Arc<dyn SettingsSource> =
        Arc::new(StaticSettings::new().with(DEFAULT_PLUGIN_NAME, TAG_SUFFIX_KEY, "-x"));
    let store = TagConfigStore::from_paths(paths, Some(settings));

    assert_eq!(store.get().resolve("Cat").stash_name.as_deref(), Some("Cat-x"));
}

#[test]
fn concurrent_readers_and_reloads_see_whole_snapshots() {
    let (_temp, _paths, store) = setup_store(
        "TagName,ImageEnabled,MaxGap,MinMarkerDuration\nCat,true,4,2\n",
    );
    let store = Arc::new(store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let config = store.get_tag_configuration(i % 4 == 0);
                    let settings = config.resolve("Cat");
                    assert!(settings.image_enabled);
                    assert_eq!(settings.max_gap, Some(4.0));
                    assert_eq!(settings.min_marker_duration, Some(2.0));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("reader thread panicked");
    }
}
