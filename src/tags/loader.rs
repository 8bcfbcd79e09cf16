//! Tag configuration loading and resolution.
//!
//! Reads `tag_settings.csv`, folds default rows into the global baseline and
//! collects per-tag overrides into an immutable [`TagConfiguration`].

use super::merge::{apply_override, merged};
use super::row::{ParseMode, RowTarget, parse_row_with_mode, validate_headers};
use super::types::{DEFAULT_MERGE_STRATEGY, TagSettings, TagSettingsOverride};
use crate::error::{Result, TagConfigError};
use crate::settings::{DEFAULT_PLUGIN_NAME, SettingsSource, resolve_tag_suffix};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// File name of the user-editable tag settings table.
pub const CONFIG_FILENAME: &str = "tag_settings.csv";

/// File name of the bundled template copied into place on first load.
pub const TEMPLATE_FILENAME: &str = "tag_settings.template.csv";

/// Where the tag settings file and its template live.
#[derive(Debug, Clone)]
pub struct TagConfigPaths {
    /// Install directory holding the bundled template.
    pub install_dir: PathBuf,
    /// Directory holding `tag_settings.csv` (defaults to `install_dir`).
    pub config_dir: Option<PathBuf>,
    /// Plugin identifier used for the suffix lookup.
    pub plugin_name: String,
}

impl TagConfigPaths {
    /// Discover paths: `AITAG_INSTALL_DIR` or the executable's directory, and
    /// `AITAG_CONFIG_DIR` when set.
    pub fn discover() -> Self {
        let install_dir = std::env::var("AITAG_INSTALL_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(default_install_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let config_dir = std::env::var("AITAG_CONFIG_DIR").ok().map(PathBuf::from);
        Self::new(install_dir, config_dir)
    }

    /// Create paths with explicit directories.
    pub fn new(install_dir: impl Into<PathBuf>, config_dir: Option<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            config_dir,
            plugin_name: DEFAULT_PLUGIN_NAME.to_string(),
        }
    }

    /// Set the plugin identifier used for the suffix lookup.
    pub fn with_plugin_name(mut self, plugin_name: impl Into<String>) -> Self {
        self.plugin_name = plugin_name.into();
        self
    }

    /// Path of `tag_settings.csv`.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir
            .as_deref()
            .unwrap_or(&self.install_dir)
            .join(CONFIG_FILENAME)
    }

    /// Path of the bundled template.
    pub fn template_path(&self) -> PathBuf {
        self.install_dir.join(TEMPLATE_FILENAME)
    }
}

fn default_install_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Global baseline and per-tag overrides parsed from one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub global_settings: TagSettings,
    pub overrides: BTreeMap<String, TagSettingsOverride>,
}

impl Default for ParsedTable {
    fn default() -> Self {
        Self {
            global_settings: TagSettings::builtin(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Parse a whole tag settings table.
///
/// Default rows fold into the baseline in file order (later rows win per
/// field). A repeated tag key replaces the earlier override entirely.
pub fn parse_tag_table<R: Read>(reader: R, mode: ParseMode) -> Result<ParsedTable> {
    let mut table_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = table_reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        if mode == ParseMode::Strict {
            return Err(TagConfigError::MissingHeader);
        }
        warn!("Tag settings table is missing a header row");
    } else if mode == ParseMode::Strict {
        validate_headers(&headers)?;
    }

    let mut table = ParsedTable::default();
    for (idx, record) in table_reader.records().enumerate() {
        let record = record?;
        let row_number = idx + 2;
        let raw: Vec<(&str, Value)> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.as_str(), Value::String(cell.to_string())))
            .collect();

        let Some(fragment) = parse_row_with_mode(row_number, &raw, mode)? else {
            continue;
        };
        match fragment.target {
            RowTarget::Global => {
                table.global_settings = merged(table.global_settings, &fragment.overrides);
            }
            RowTarget::Tag(key) => {
                if table.overrides.insert(key.clone(), fragment.overrides).is_some() {
                    debug!(tag = %key, row = row_number, "Replacing earlier override for tag");
                }
            }
        }
    }
    Ok(table)
}

/// Parse a tag settings file from disk.
pub fn parse_tag_file(path: &Path, mode: ParseMode) -> Result<ParsedTable> {
    let file = File::open(path).map_err(|e| TagConfigError::io(path, e))?;
    parse_tag_table(file, mode)
}

/// Immutable snapshot of the tag configuration.
#[derive(Debug, Clone, Serialize)]
pub struct TagConfiguration {
    source_path: PathBuf,
    global_settings: TagSettings,
    overrides: BTreeMap<String, TagSettingsOverride>,
    tag_suffix: String,
    loaded_at: DateTime<Utc>,
}

impl TagConfiguration {
    pub fn new(
        source_path: PathBuf,
        global_settings: TagSettings,
        overrides: BTreeMap<String, TagSettingsOverride>,
        tag_suffix: impl Into<String>,
    ) -> Self {
        Self {
            source_path,
            global_settings,
            overrides,
            tag_suffix: tag_suffix.into(),
            loaded_at: Utc::now(),
        }
    }

    /// Snapshot with built-in defaults and no overrides.
    pub fn builtin(source_path: PathBuf, tag_suffix: impl Into<String>) -> Self {
        let table = ParsedTable::default();
        Self::new(source_path, table.global_settings, table.overrides, tag_suffix)
    }

    /// Load leniently. Never fails: problems are logged and defaults used.
    ///
    /// `base_path` overrides the directory holding `tag_settings.csv`.
    pub fn load(base_path: Option<&Path>, settings: Option<&dyn SettingsSource>) -> Self {
        let mut paths = TagConfigPaths::discover();
        if let Some(base) = base_path {
            paths.config_dir = Some(base.to_path_buf());
        }
        Self::load_with_paths(&paths, settings)
    }

    /// Load leniently from explicit paths.
    pub fn load_with_paths(paths: &TagConfigPaths, settings: Option<&dyn SettingsSource>) -> Self {
        let config_path = paths.config_path();
        let tag_suffix = resolve_tag_suffix(settings, &paths.plugin_name);

        if !config_path.exists() {
            provision_from_template(&paths.template_path(), &config_path);
        }

        let table = if config_path.exists() {
            match parse_tag_file(&config_path, ParseMode::Lenient) {
                Ok(table) => table,
                Err(e) => {
                    error!(
                        path = %config_path.display(),
                        error = %e,
                        "Failed to read tag settings file; using defaults"
                    );
                    ParsedTable::default()
                }
            }
        } else {
            ParsedTable::default()
        };

        debug!(
            path = %config_path.display(),
            overrides = table.overrides.len(),
            "Loaded tag configuration"
        );
        Self::new(config_path, table.global_settings, table.overrides, tag_suffix)
    }

    /// Load in strict mode: no template provisioning, no fallback.
    pub fn load_strict(paths: &TagConfigPaths, settings: Option<&dyn SettingsSource>) -> Result<Self> {
        let config_path = paths.config_path();
        let table = parse_tag_file(&config_path, ParseMode::Strict)?;
        let tag_suffix = resolve_tag_suffix(settings, &paths.plugin_name);
        Ok(Self::new(config_path, table.global_settings, table.overrides, tag_suffix))
    }

    /// Resolve the effective settings for `tag_name`.
    ///
    /// The snapshot is not modified. An empty name yields the baseline with
    /// no derived stash name.
    pub fn resolve(&self, tag_name: &str) -> TagSettings {
        let normalized = tag_name.trim();
        let mut effective = self.global_settings.clone();
        if !normalized.is_empty() {
            effective.tag_name = normalized.to_string();
            if let Some(overlay) = self.override_for(normalized) {
                apply_override(&mut effective, overlay);
            }
        }
        if effective.stash_name.as_deref().is_none_or(str::is_empty) {
            effective.stash_name =
                (!normalized.is_empty()).then(|| format!("{}{}", normalized, self.tag_suffix));
        }
        if effective.merge_strategy.is_empty() {
            effective.merge_strategy = DEFAULT_MERGE_STRATEGY.to_string();
        }
        effective
    }

    /// Per-tag override for `tag_name`, matched case-insensitively.
    pub fn override_for(&self, tag_name: &str) -> Option<&TagSettingsOverride> {
        self.overrides.get(&tag_name.trim().to_lowercase())
    }

    /// Per-tag overrides in key order.
    pub fn iter_overrides(&self) -> impl Iterator<Item = (&str, &TagSettingsOverride)> {
        self.overrides.iter().map(|(key, ov)| (key.as_str(), ov))
    }

    /// Number of per-tag overrides.
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn global_settings(&self) -> &TagSettings {
        &self.global_settings
    }

    pub fn tag_suffix(&self) -> &str {
        &self.tag_suffix
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Copy the bundled template into place. Failures are logged, never fatal.
fn provision_from_template(template_path: &Path, config_path: &Path) {
    if !template_path.exists() {
        info!(
            path = %config_path.display(),
            "Tag settings file not found and no template available; using built-in defaults"
        );
        return;
    }
    match std::fs::copy(template_path, config_path) {
        Ok(_) => info!(
            template = %template_path.display(),
            path = %config_path.display(),
            "Copied tag settings template"
        ),
        Err(e) => warn!(
            template = %template_path.display(),
            path = %config_path.display(),
            error = %e,
            "Failed to copy tag settings template"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn parse(text: &str) -> ParsedTable {
        parse_tag_table(text.as_bytes(), ParseMode::Lenient).unwrap()
    }

    fn snapshot(text: &str) -> TagConfiguration {
        let table = parse(text);
        TagConfiguration::new(
            PathBuf::from("tag_settings.csv"),
            table.global_settings,
            table.overrides,
            "_AI",
        )
    }

    #[test]
    fn test_default_row_then_tag_row() {
        let config = snapshot(
            "TagName,MarkersEnabled,ImageEnabled\n\
             *,false,\n\
             Blonde,,true\n",
        );
        let settings = config.resolve("Blonde");
        assert!(!settings.markers_enabled);
        assert!(settings.image_enabled);
        assert_eq!(settings.stash_name.as_deref(), Some("Blonde_AI"));
        assert_eq!(settings.merge_strategy, "default");
        assert_eq!(settings.tag_name, "Blonde");
    }

    #[test]
    fn test_multiple_default_rows_fold() {
        let table = parse(
            "TagName,MarkersEnabled,MaxGap,MergeStrategy\n\
             default,false,3,\n\
             __default__,,7,gap_fill\n",
        );
        assert!(!table.global_settings.markers_enabled);
        assert_eq!(table.global_settings.max_gap, Some(7.0));
        assert_eq!(table.global_settings.merge_strategy, "gap_fill");
        assert!(table.overrides.is_empty());
    }

    #[test]
    fn test_repeated_tag_replaces_entirely() {
        let table = parse(
            "TagName,MarkersEnabled,ImageEnabled\n\
             Cat,false,\n\
             CAT,,true\n",
        );
        assert_eq!(table.overrides.len(), 1);
        let ov = &table.overrides["cat"];
        assert_eq!(ov.markers_enabled, None);
        assert_eq!(ov.image_enabled, Some(true));
    }

    #[test]
    fn test_blank_rows_do_not_change_state() {
        let table = parse("TagName,MarkersEnabled\n , \n,\n");
        assert_eq!(table, ParsedTable::default());
    }

    #[test]
    fn test_short_rows_tolerated() {
        let table = parse("TagName,MarkersEnabled,ImageEnabled\nDog\nFox,no\n");
        assert!(table.overrides["dog"].is_empty());
        assert_eq!(table.overrides["fox"].markers_enabled, Some(false));
    }

    #[test]
    fn test_empty_input_yields_defaults() {
        assert_eq!(parse(""), ParsedTable::default());
    }

    #[test]
    fn test_strict_rejects_missing_header() {
        let err = parse_tag_table("".as_bytes(), ParseMode::Strict).unwrap_err();
        assert!(matches!(err, TagConfigError::MissingHeader));
    }

    #[test]
    fn test_strict_rejects_unknown_column() {
        let err = parse_tag_table("TagName,Colour\nx,red\n".as_bytes(), ParseMode::Strict)
            .unwrap_err();
        assert!(matches!(err, TagConfigError::UnknownColumn(_)));
    }

    #[test]
    fn test_strict_reports_row_number() {
        let err = parse_tag_table(
            "TagName,MaxGap\nok,1\nbad,soon\n".as_bytes(),
            ParseMode::Strict,
        )
        .unwrap_err();
        assert_eq!(err.row(), Some(3));
    }

    #[test]
    fn test_invalid_utf8_aborts_parse() {
        let bytes: &[u8] = b"TagName,StashName\nCat,\xff\xfe\n";
        assert!(parse_tag_table(bytes, ParseMode::Lenient).is_err());
    }

    #[test]
    fn test_resolve_unknown_tag_uses_baseline() {
        let config = snapshot("TagName,MinMarkerDuration\n*,2.5\n");
        let settings = config.resolve("  Redhead ");
        assert_eq!(settings.tag_name, "Redhead");
        assert_eq!(settings.min_marker_duration, Some(2.5));
        assert_eq!(settings.stash_name.as_deref(), Some("Redhead_AI"));
    }

    #[test]
    fn test_resolve_empty_name() {
        let config = snapshot("TagName,MarkersEnabled\n");
        let settings = config.resolve("   ");
        assert_eq!(settings.tag_name, "__global__");
        assert_eq!(settings.stash_name, None);
        assert_eq!(settings.merge_strategy, "default");
    }

    #[test]
    fn test_resolve_override_stash_name() {
        let config = snapshot("TagName,StashName\nBlonde,Blonde Hair\n");
        assert_eq!(
            config.resolve("blonde").stash_name.as_deref(),
            Some("Blonde Hair")
        );
    }

    #[test]
    fn test_resolve_does_not_mutate_snapshot() {
        let config = snapshot("TagName,ImageEnabled\nBlonde,true\n");
        let before = config.global_settings().clone();
        let first = config.resolve("Blonde");
        let second = config.resolve("Blonde");
        assert_eq!(first, second);
        assert_eq!(config.global_settings(), &before);
    }

    #[test]
    fn test_resolve_restores_empty_strategy() {
        let mut global = TagSettings::builtin();
        global.merge_strategy = String::new();
        let config = TagConfiguration::new(PathBuf::new(), global, BTreeMap::new(), "_AI");
        assert_eq!(config.resolve("x").merge_strategy, "default");
    }

    #[test]
    fn test_iter_overrides_sorted() {
        let config = snapshot("TagName,ImageEnabled\nZebra,true\napple,false\n");
        let keys: Vec<&str> = config.iter_overrides().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["apple", "zebra"]);
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_paths_config_dir_defaults_to_install_dir() {
        let paths = TagConfigPaths::new("/opt/aitag", None);
        assert_eq!(paths.config_path(), PathBuf::from("/opt/aitag/tag_settings.csv"));
        assert_eq!(
            paths.template_path(),
            PathBuf::from("/opt/aitag/tag_settings.template.csv")
        );

        let paths = TagConfigPaths::new("/opt/aitag", Some(PathBuf::from("/etc/aitag")));
        assert_eq!(paths.config_path(), PathBuf::from("/etc/aitag/tag_settings.csv"));
    }
}
