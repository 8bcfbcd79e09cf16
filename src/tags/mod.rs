//! Tag settings resolution.
//!
//! Layers a global baseline with per-tag overrides read from a user-edited
//! CSV table (`tag_settings.csv`):
//! 1. **Built-in defaults** - markers and scene tags on, image tags off
//! 2. **Default rows** - rows whose `TagName` is blank, `*`, `default` or
//!    `__default__`, folded into the baseline field by field
//! 3. **Tag rows** - sparse overrides keyed by lower-cased tag name, applied
//!    on top of the baseline at resolution time
//!
//! ## Table format
//! Headers are matched ignoring case, spaces, hyphens and underscores:
//! `TagName`, `StashName`, `MarkersEnabled`, `SceneTagEnabled`, `ImageEnabled`,
//! `RequiredSceneTagDuration`, `MinMarkerDuration`, `MaxGap`, `MergeStrategy`,
//! `MarkerMergeParam1..5`. Booleans accept `1/true/yes/y` and `0/false/no/n`.

mod loader;
mod merge;
mod row;
mod store;
mod types;
pub mod values;

pub use loader::{
    CONFIG_FILENAME, ParsedTable, TEMPLATE_FILENAME, TagConfigPaths, TagConfiguration,
    parse_tag_file, parse_tag_table,
};
pub use merge::{apply_override, merge_params, merged};
pub use row::{
    DEFAULT_ROW_MARKERS, KNOWN_COLUMNS, ParseMode, RowFragment, RowTarget, parse_row,
    parse_row_with_mode, validate_headers,
};
pub use store::{TagConfigStore, get_tag_configuration, global_store, install_global_store};
pub use types::*;

pub use crate::error::{Result, TagConfigError, ValueKind};
