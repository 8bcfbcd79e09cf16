//! Field-by-field merging of YAML config tiers.
//!
//! Tiers are converted to JSON values and overlaid in priority order. Objects
//! merge recursively; everything else in a higher tier replaces the lower one.

use serde_json::Value;

/// Overlay `overlay` onto `base`.
///
/// A `null` in the overlay means "not specified" and keeps the base value,
/// so a user tier that only sets `settings.db_path` leaves `tags` untouched.
///
/// # Example
/// ```
/// use serde_json::json;
/// use aitag_settings::config::deep_merge;
///
/// let project = json!({ "tags": { "config_dir": "/srv/tags" }, "settings": { "plugin_name": "a" } });
/// let user = json!({ "settings": { "plugin_name": "b", "db_path": null } });
/// assert_eq!(
///     deep_merge(project, user),
///     json!({ "tags": { "config_dir": "/srv/tags" }, "settings": { "plugin_name": "b" } })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None if overlay_value.is_null() => continue,
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers lowest-priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
