//! Row parser for the tag settings table.
//!
//! Turns one raw row (header text → cell value) into a [`RowFragment`] that
//! targets either the global baseline or one specific tag.

use super::types::{MERGE_PARAM_COUNT, TagSettingsOverride};
use super::values::{
    normalize_header_key, normalize_string, parse_bool, parse_float, try_parse_bool,
    try_parse_float,
};
use crate::error::{Result, TagConfigError, ValueKind};
use serde_json::Value;
use std::collections::HashMap;

/// `TagName` cell values that target the global baseline. Matched exactly
/// (case-sensitive), unlike tag keys which are lower-cased.
pub const DEFAULT_ROW_MARKERS: [&str; 3] = ["*", "default", "__default__"];

/// Canonical forms of every header the parser understands.
pub const KNOWN_COLUMNS: [&str; 15] = [
    "tagname",
    "tag",
    "stashname",
    "markersenabled",
    "scenetagenabled",
    "imageenabled",
    "requiredscenetagduration",
    "minmarkerduration",
    "maxgap",
    "mergestrategy",
    "markermergeparam1",
    "markermergeparam2",
    "markermergeparam3",
    "markermergeparam4",
    "markermergeparam5",
];

/// How unparsable cells are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Unparsable cells become "no opinion".
    #[default]
    Lenient,
    /// Unparsable cells and unknown headers are errors.
    Strict,
}

/// What a parsed row applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowTarget {
    /// The global baseline (blank, `*`, `default` or `__default__` tag cell).
    Global,
    /// One tag, keyed by its lower-cased name.
    Tag(String),
}

/// The result of parsing one non-blank row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFragment {
    pub target: RowTarget,
    pub overrides: TagSettingsOverride,
}

impl RowFragment {
    /// Tag key for per-tag rows, `None` for global rows.
    pub fn tag_key(&self) -> Option<&str> {
        match &self.target {
            RowTarget::Global => None,
            RowTarget::Tag(key) => Some(key),
        }
    }
}

/// Parse one row leniently. Returns `None` for blank rows.
///
/// `row_number` is 1-based with the header on row 1, so data starts at 2.
pub fn parse_row<K: AsRef<str>>(row_number: usize, raw: &[(K, Value)]) -> Option<RowFragment> {
    parse_row_with_mode(row_number, raw, ParseMode::Lenient).unwrap_or_default()
}

/// Parse one row in the given mode. Lenient mode never returns `Err`.
pub fn parse_row_with_mode<K: AsRef<str>>(
    row_number: usize,
    raw: &[(K, Value)],
    mode: ParseMode,
) -> Result<Option<RowFragment>> {
    let cells = Cells::normalize(raw);
    if cells.is_blank() {
        return Ok(None);
    }

    let tag_value = cells
        .text("tagname")
        .filter(|s| !s.is_empty())
        .or_else(|| cells.text("tag"))
        .unwrap_or_default()
        .trim()
        .to_string();

    let reader = CellReader {
        cells: &cells,
        row: row_number,
        mode,
    };
    let mut merge_params = [None; MERGE_PARAM_COUNT];
    for (idx, slot) in merge_params.iter_mut().enumerate() {
        *slot = reader.float(&format!("markermergeparam{}", idx + 1))?;
    }
    let overrides = TagSettingsOverride {
        stash_name: cells.string("stashname"),
        markers_enabled: reader.bool("markersenabled")?,
        scene_tag_enabled: reader.bool("scenetagenabled")?,
        image_enabled: reader.bool("imageenabled")?,
        required_scene_tag_duration: reader.float("requiredscenetagduration")?,
        min_marker_duration: reader.float("minmarkerduration")?,
        max_gap: reader.float("maxgap")?,
        merge_strategy: cells.string("mergestrategy"),
        merge_params,
    };

    let target = if tag_value.is_empty() || DEFAULT_ROW_MARKERS.contains(&tag_value.as_str()) {
        RowTarget::Global
    } else {
        RowTarget::Tag(tag_value.to_lowercase())
    };
    Ok(Some(RowFragment { target, overrides }))
}

/// Reject headers that do not normalize to a known column.
pub fn validate_headers<K: AsRef<str>>(headers: &[K]) -> Result<()> {
    for header in headers {
        let header = header.as_ref();
        let canonical = normalize_header_key(header);
        if !canonical.is_empty() && !KNOWN_COLUMNS.contains(&canonical.as_str()) {
            return Err(TagConfigError::UnknownColumn(header.to_string()));
        }
    }
    Ok(())
}

/// Row cells keyed by canonical header, keeping the original header for errors.
struct Cells {
    by_key: HashMap<String, (String, Value)>,
}

impl Cells {
    fn normalize<K: AsRef<str>>(raw: &[(K, Value)]) -> Self {
        let by_key = raw
            .iter()
            .map(|(header, value)| {
                let value = match value {
                    Value::String(s) => Value::String(s.trim().to_string()),
                    other => other.clone(),
                };
                let header = header.as_ref();
                (normalize_header_key(header), (header.to_string(), value))
            })
            .collect();
        Self { by_key }
    }

    fn is_blank(&self) -> bool {
        self.by_key.values().all(|(_, value)| match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        })
    }

    fn get(&self, key: &str) -> Option<&(String, Value)> {
        self.by_key.get(key)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|(_, value)| value.as_str())
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|(_, value)| normalize_string(value))
    }
}

struct CellReader<'a> {
    cells: &'a Cells,
    row: usize,
    mode: ParseMode,
}

impl CellReader<'_> {
    fn bool(&self, key: &str) -> Result<Option<bool>> {
        let Some((header, value)) = self.cells.get(key) else {
            return Ok(None);
        };
        match self.mode {
            ParseMode::Lenient => Ok(parse_bool(value)),
            ParseMode::Strict => try_parse_bool(value)
                .map_err(|raw| self.invalid(header, ValueKind::Bool, raw)),
        }
    }

    fn float(&self, key: &str) -> Result<Option<f64>> {
        let Some((header, value)) = self.cells.get(key) else {
            return Ok(None);
        };
        match self.mode {
            ParseMode::Lenient => Ok(parse_float(value)),
            ParseMode::Strict => try_parse_float(value)
                .map_err(|raw| self.invalid(header, ValueKind::Number, raw)),
        }
    }

    fn invalid(&self, header: &str, kind: ValueKind, value: String) -> TagConfigError {
        TagConfigError::InvalidValue {
            row: self.row,
            column: header.to_string(),
            kind,
            value,
        }
    }
}
