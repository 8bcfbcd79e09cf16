//! Runtime configuration types.

use crate::settings::{DEFAULT_PLUGIN_NAME, SettingsSource, SqliteSettings};
use crate::tags::TagConfigPaths;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Top-level configuration for the tag settings tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tags: TagsConfig,

    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Location of the tag settings table and its template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Directory holding the bundled template (default: executable's directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    /// Directory holding `tag_settings.csv` (default: `install_dir`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<PathBuf>,
}

/// Host plugin settings access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Host SQLite database with the `plugin_settings` table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Plugin identifier the suffix is stored under.
    #[serde(default = "default_plugin_name")]
    pub plugin_name: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            plugin_name: default_plugin_name(),
        }
    }
}

fn default_plugin_name() -> String {
    DEFAULT_PLUGIN_NAME.to_string()
}

impl AppConfig {
    /// Load configuration from a single YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Tag table paths described by this configuration.
    pub fn tag_paths(&self) -> TagConfigPaths {
        let discovered = TagConfigPaths::discover();
        let install_dir = self
            .tags
            .install_dir
            .clone()
            .unwrap_or(discovered.install_dir);
        TagConfigPaths::new(install_dir, self.tags.config_dir.clone())
            .with_plugin_name(self.settings.plugin_name.clone())
    }

    /// Open the host settings database, if one is configured.
    ///
    /// An unopenable database is logged and treated as absent, which leaves
    /// the default tag suffix in effect.
    pub fn settings_source(&self) -> Option<Arc<dyn SettingsSource>> {
        let db_path = self.settings.db_path.as_ref()?;
        match SqliteSettings::open_read_only(db_path) {
            Ok(settings) => Some(Arc::new(settings)),
            Err(e) => {
                warn!(
                    path = %db_path.display(),
                    error = %e,
                    "Unable to open plugin settings database"
                );
                None
            }
        }
    }
}
