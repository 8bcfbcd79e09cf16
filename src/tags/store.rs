//! Cached tag configuration store.
//!
//! Holds the current [`TagConfiguration`] snapshot behind an `ArcSwapOption`.
//! Readers that find a snapshot never take the lock. Initial loads and
//! reloads are serialized by one mutex, and a reload swaps the reference
//! before releasing it, so a reader sees either the old or the new snapshot.

use super::loader::{TagConfigPaths, TagConfiguration};
use crate::settings::SettingsSource;
use arc_swap::ArcSwapOption;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::info;

type LoadFn = dyn Fn() -> TagConfiguration + Send + Sync;

/// Process-wide cache of the tag configuration with explicit reload.
pub struct TagConfigStore {
    current: ArcSwapOption<TagConfiguration>,
    load_lock: Mutex<()>,
    loader: Box<LoadFn>,
}

impl TagConfigStore {
    /// Create a store that uses `loader` for every load and reload.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> TagConfiguration + Send + Sync + 'static,
    {
        Self {
            current: ArcSwapOption::empty(),
            load_lock: Mutex::new(()),
            loader: Box::new(loader),
        }
    }

    /// Create a store that loads from `paths`, looking the suffix up in `settings`.
    pub fn from_paths(paths: TagConfigPaths, settings: Option<Arc<dyn SettingsSource>>) -> Self {
        Self::new(move || TagConfiguration::load_with_paths(&paths, settings.as_deref()))
    }

    /// Get the cached snapshot, loading it on first access.
    pub fn get(&self) -> Arc<TagConfiguration> {
        if let Some(config) = self.current.load_full() {
            return config;
        }
        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());
        // Another thread may have finished loading while we waited.
        if let Some(config) = self.current.load_full() {
            return config;
        }
        self.load_locked("load")
    }

    /// Re-run the loader and replace the cached snapshot.
    pub fn reload(&self) -> Arc<TagConfiguration> {
        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load_locked("reload")
    }

    /// Get the snapshot, forcing a reload first when `reload` is true.
    pub fn get_tag_configuration(&self, reload: bool) -> Arc<TagConfiguration> {
        if reload { self.reload() } else { self.get() }
    }

    /// The cached snapshot, if one has been loaded.
    pub fn cached(&self) -> Option<Arc<TagConfiguration>> {
        self.current.load_full()
    }

    fn load_locked(&self, reason: &str) -> Arc<TagConfiguration> {
        let config = Arc::new((self.loader)());
        info!(
            reason,
            path = %config.source_path().display(),
            overrides = config.len(),
            suffix = config.tag_suffix(),
            "Tag configuration loaded"
        );
        self.current.store(Some(Arc::clone(&config)));
        config
    }
}

impl std::fmt::Debug for TagConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagConfigStore")
            .field("loaded", &self.current.load().is_some())
            .finish()
    }
}

static GLOBAL_STORE: OnceLock<TagConfigStore> = OnceLock::new();

/// Install the process-wide store. Returns the store back if one is already set.
pub fn install_global_store(store: TagConfigStore) -> Result<(), TagConfigStore> {
    GLOBAL_STORE.set(store)
}

/// The process-wide store, created from discovered paths on first use.
pub fn global_store() -> &'static TagConfigStore {
    GLOBAL_STORE.get_or_init(|| TagConfigStore::from_paths(TagConfigPaths::discover(), None))
}

/// Get the process-wide tag configuration, optionally forcing a reload.
pub fn get_tag_configuration(reload: bool) -> Arc<TagConfiguration> {
    global_store().get_tag_configuration(reload)
}
