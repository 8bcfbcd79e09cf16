//! Output formatting utilities for markdown and JSON.

use crate::tags::{MergeParams, TagConfiguration, TagSettings, TagSettingsOverride};
use anyhow::Result;
use serde_json::{Value, json};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Markdown,
}

fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Table cell for an optional value; unset shows as blank.
fn cell<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

fn params(values: &MergeParams) -> String {
    values.iter().map(opt).collect::<Vec<_>>().join(", ")
}

/// Format resolved settings for one tag as markdown.
pub fn format_settings_markdown(settings: &TagSettings) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Tag: {}\n", settings.tag_name));
    md.push_str(&format!("- **stash_name**: {}\n", opt(&settings.stash_name)));
    md.push_str(&format!("- **markers_enabled**: {}\n", settings.markers_enabled));
    md.push_str(&format!(
        "- **scene_tag_enabled**: {}\n",
        settings.scene_tag_enabled
    ));
    md.push_str(&format!("- **image_enabled**: {}\n", settings.image_enabled));
    md.push_str(&format!(
        "- **required_scene_tag_duration**: {}\n",
        opt(&settings.required_scene_tag_duration)
    ));
    md.push_str(&format!(
        "- **min_marker_duration**: {}\n",
        opt(&settings.min_marker_duration)
    ));
    md.push_str(&format!("- **max_gap**: {}\n", opt(&settings.max_gap)));
    md.push_str(&format!("- **merge_strategy**: {}\n", settings.merge_strategy));
    md.push_str(&format!(
        "- **merge_params**: [{}]\n",
        params(&settings.merge_params)
    ));

    md
}

/// Format per-tag overrides as a markdown table. Unset fields show as blank.
pub fn format_overrides_markdown<'a>(
    overrides: impl IntoIterator<Item = (&'a str, &'a TagSettingsOverride)>,
) -> String {
    let mut md = String::new();
    let rows: Vec<_> = overrides.into_iter().collect();

    md.push_str(&format!("# Tag overrides ({})\n\n", rows.len()));
    if rows.is_empty() {
        return md;
    }

    md.push_str("| tag | stash_name | markers | scene_tag | image | required | min_marker | max_gap | strategy | params |\n");
    md.push_str("|---|---|---|---|---|---|---|---|---|---|\n");
    for (key, ov) in rows {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |\n",
            key,
            cell(&ov.stash_name),
            cell(&ov.markers_enabled),
            cell(&ov.scene_tag_enabled),
            cell(&ov.image_enabled),
            cell(&ov.required_scene_tag_duration),
            cell(&ov.min_marker_duration),
            cell(&ov.max_gap),
            cell(&ov.merge_strategy),
            if ov.merge_params.iter().all(Option::is_none) {
                String::new()
            } else {
                format!("[{}]", params(&ov.merge_params))
            },
        ));
    }

    md
}

/// Format a snapshot summary (source, suffix, baseline) as markdown.
pub fn format_configuration_markdown(config: &TagConfiguration) -> String {
    let mut md = String::new();

    md.push_str("# Tag configuration\n");
    md.push_str(&format!("- **source**: `{}`\n", config.source_path().display()));
    md.push_str(&format!("- **tag_suffix**: `{}`\n", config.tag_suffix()));
    md.push_str(&format!("- **overrides**: {}\n", config.len()));
    md.push_str(&format!("- **loaded_at**: {}\n\n", config.loaded_at().to_rfc3339()));
    md.push_str(&format_settings_markdown(config.global_settings()));

    md
}

/// JSON view of a snapshot summary.
pub fn configuration_json(config: &TagConfiguration) -> Result<Value> {
    Ok(json!({
        "source_path": config.source_path(),
        "tag_suffix": config.tag_suffix(),
        "override_count": config.len(),
        "loaded_at": config.loaded_at(),
        "global_settings": serde_json::to_value(config.global_settings())?,
    }))
}
