//! Runtime configuration for the tag settings tool.
//!
//! Consolidates configuration from tiers with field-by-field YAML merging:
//! 1. **Defaults** - Built in
//! 2. **Project** - `$CWD/aitag/config.yaml`
//! 3. **User** - `~/.aitag/config.yaml` and environment variables
//!
//! ## Environment Variables
//! - `AITAG_CONFIG_PATH` - Explicit config file (replaces the file tiers)
//! - `AITAG_CONFIG_DIR` - Directory holding `tag_settings.csv`
//! - `AITAG_INSTALL_DIR` - Directory holding the bundled template
//! - `AITAG_SETTINGS_DB` - Host SQLite database with plugin settings
//! - `AITAG_PLUGIN_NAME` - Plugin identifier for the suffix lookup
//! - `AITAG_USER_DIR` - User config dir (default: `~/.aitag`)
//! - `AITAG_PROJECT_DIR` - Project config dir (default: `./aitag`)

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
