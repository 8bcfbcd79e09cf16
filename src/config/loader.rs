//! Configuration loader with tier-based merging.
//!
//! Loads `config.yaml` from the project and user tiers, merges them
//! field-by-field over the defaults and applies environment overrides.

use super::merge::deep_merge_all;
use super::types::AppConfig;
use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the YAML file looked up in each tier directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/aitag/)
    Project = 1,
    /// User-level config (~/.aitag/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: AITAG_USER_DIR or ~/.aitag
        let user_dir = std::env::var("AITAG_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".aitag")));

        // Project dir: AITAG_PROJECT_DIR or $CWD/aitag
        let project_dir = std::env::var("AITAG_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("aitag")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn tier_files(&self) -> Vec<(ConfigTier, PathBuf)> {
        let mut files = Vec::new();
        if let Some(ref dir) = self.project_dir {
            files.push((ConfigTier::Project, dir.join(CONFIG_FILE_NAME)));
        }
        if let Some(ref dir) = self.user_dir {
            files.push((ConfigTier::User, dir.join(CONFIG_FILE_NAME)));
        }
        files
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: AppConfig,
    /// Highest-priority config file that was used (if any)
    config_path: Option<PathBuf>,
    /// Tiers that contributed values, lowest priority first
    tiers: Vec<ConfigTier>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths.
    ///
    /// `AITAG_CONFIG_PATH` names a single file that replaces the file tiers;
    /// an error reading it is returned. Tier files that cannot be read or
    /// parsed are skipped with a warning.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        if let Ok(explicit_path) = std::env::var("AITAG_CONFIG_PATH") {
            let path = PathBuf::from(&explicit_path);
            let mut config = AppConfig::load(&path)?;
            let mut tiers = vec![ConfigTier::Defaults];
            if Self::apply_env_overrides(&mut config) {
                tiers.push(ConfigTier::Environment);
            }
            return Ok(Self {
                paths,
                config,
                config_path: Some(path),
                tiers,
            });
        }

        let mut configs: Vec<Value> = Vec::new();
        configs.push(serde_json::to_value(AppConfig::default())?);

        let mut tiers = vec![ConfigTier::Defaults];

        let mut config_path = None;
        for (tier, file) in paths.tier_files() {
            if let Some(value) = read_tier_file(tier, &file) {
                configs.push(value);
                tiers.push(tier);
                config_path = Some(file);
            }
        }

        let merged = deep_merge_all(configs);
        let mut config: AppConfig = serde_json::from_value(merged)?;
        if Self::apply_env_overrides(&mut config) {
            tiers.push(ConfigTier::Environment);
        }
        debug!(
            tiers = %tiers.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
            "Merged config tiers"
        );

        Ok(Self {
            paths,
            config,
            config_path,
            tiers,
        })
    }

    /// Apply environment variable overrides to config.
    ///
    /// Returns true if any variable was set.
    fn apply_env_overrides(config: &mut AppConfig) -> bool {
        let mut applied = false;

        if let Ok(dir) = std::env::var("AITAG_CONFIG_DIR") {
            config.tags.config_dir = Some(PathBuf::from(dir));
            applied = true;
        }

        if let Ok(dir) = std::env::var("AITAG_INSTALL_DIR") {
            config.tags.install_dir = Some(PathBuf::from(dir));
            applied = true;
        }

        if let Ok(db_path) = std::env::var("AITAG_SETTINGS_DB") {
            config.settings.db_path = Some(PathBuf::from(db_path));
            applied = true;
        }

        if let Ok(plugin_name) = std::env::var("AITAG_PLUGIN_NAME") {
            config.settings.plugin_name = plugin_name;
            applied = true;
        }

        applied
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Get the config file path that was used.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Tiers that contributed to the loaded config, lowest priority first.
    pub fn tiers(&self) -> &[ConfigTier] {
        &self.tiers
    }
}

fn read_tier_file(tier: ConfigTier, file: &Path) -> Option<Value> {
    if !file.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            warn!(%tier, path = %file.display(), error = %e, "Skipping unreadable config file");
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(%tier, path = %file.display(), "Loaded config tier");
            Some(value)
        }
        Err(e) => {
            warn!(%tier, path = %file.display(), error = %e, "Skipping invalid config file");
            None
        }
    }
}
