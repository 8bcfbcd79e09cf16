//! Host plugin settings lookup.
//!
//! The tag-name suffix lives in the host server's `plugin_settings` table.
//! Lookups here are best-effort: any failure falls back to
//! [`DEFAULT_TAG_SUFFIX`].

use anyhow::{Result, anyhow};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Plugin identifier the tagging settings are stored under.
pub const DEFAULT_PLUGIN_NAME: &str = "skier_aitagging_plugin";

/// Setting key for the derived tag-name suffix.
pub const TAG_SUFFIX_KEY: &str = "tag_suffix";

/// Suffix used when no setting is available.
pub const DEFAULT_TAG_SUFFIX: &str = "_AI";

/// Key-value lookup of plugin settings.
pub trait SettingsSource: Send + Sync {
    /// Look up a setting. `Ok(None)` means the setting has no usable value.
    fn plugin_setting(&self, plugin: &str, key: &str) -> Result<Option<String>>;
}

/// Resolve the tag suffix, swallowing every failure.
pub fn resolve_tag_suffix(source: Option<&dyn SettingsSource>, plugin: &str) -> String {
    let Some(source) = source else {
        return DEFAULT_TAG_SUFFIX.to_string();
    };
    match source.plugin_setting(plugin, TAG_SUFFIX_KEY) {
        Ok(Some(suffix)) => suffix,
        Ok(None) => {
            debug!(plugin, "No tag_suffix setting; using default");
            DEFAULT_TAG_SUFFIX.to_string()
        }
        Err(e) => {
            warn!(plugin, error = %e, "Failed to load tag_suffix from plugin settings");
            DEFAULT_TAG_SUFFIX.to_string()
        }
    }
}

/// Settings read from the host's SQLite database.
pub struct SqliteSettings {
    conn: Mutex<Connection>,
}

impl SqliteSettings {
    /// Open an existing host database read-only.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch("PRAGMA busy_timeout=5000;")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database with an empty `plugin_settings` table (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE plugin_settings (
                id INTEGER PRIMARY KEY,
                plugin_name TEXT NOT NULL,
                key TEXT NOT NULL,
                value,
                default_value,
                UNIQUE (plugin_name, key)
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("settings connection lock poisoned"))?;
        f(&conn)
    }
}

impl SettingsSource for SqliteSettings {
    fn plugin_setting(&self, plugin: &str, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT value, default_value FROM plugin_settings
                     WHERE plugin_name = ?1 AND key = ?2",
                    params![plugin, key],
                    |row| Ok((row.get::<_, SqlValue>(0)?, row.get::<_, SqlValue>(1)?)),
                )
                .optional()?;
            let Some((value, default_value)) = row else {
                return Ok(None);
            };
            // `value` wins when set; only text counts as a usable setting.
            let effective = match value {
                SqlValue::Null => default_value,
                set => set,
            };
            Ok(match effective {
                SqlValue::Text(text) => Some(text),
                _ => None,
            })
        })
    }
}

/// Settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    values: HashMap<(String, String), String>,
}

impl StaticSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a setting, returning self for chaining.
    pub fn with(
        mut self,
        plugin: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.values.insert((plugin.into(), key.into()), value.into());
        self
    }
}

impl SettingsSource for StaticSettings {
    fn plugin_setting(&self, plugin: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .get(&(plugin.to_string(), key.to_string()))
            .cloned())
    }
}
