//! Field-granular override merging.
//!
//! Every scalar field is replaced when the override carries a value and left
//! alone otherwise. `false` and `0.0` are real values and do replace.
//! `merge_params` merges position by position.

use super::types::{MergeParams, TagSettings, TagSettingsOverride};

/// Apply `overlay` onto `base` in place.
pub fn apply_override(base: &mut TagSettings, overlay: &TagSettingsOverride) {
    if let Some(ref stash_name) = overlay.stash_name {
        // An explicit empty stash name clears the inherited one.
        base.stash_name = (!stash_name.is_empty()).then(|| stash_name.clone());
    }
    if let Some(enabled) = overlay.markers_enabled {
        base.markers_enabled = enabled;
    }
    if let Some(enabled) = overlay.scene_tag_enabled {
        base.scene_tag_enabled = enabled;
    }
    if let Some(enabled) = overlay.image_enabled {
        base.image_enabled = enabled;
    }
    if let Some(duration) = overlay.required_scene_tag_duration {
        base.required_scene_tag_duration = Some(duration);
    }
    if let Some(duration) = overlay.min_marker_duration {
        base.min_marker_duration = Some(duration);
    }
    if let Some(gap) = overlay.max_gap {
        base.max_gap = Some(gap);
    }
    if let Some(ref strategy) = overlay.merge_strategy {
        base.merge_strategy = strategy.clone();
    }
    base.merge_params = merge_params(base.merge_params, &overlay.merge_params);
}

/// Return `base` with `overlay` applied.
///
/// Used to fold successive default rows into the baseline.
pub fn merged(mut base: TagSettings, overlay: &TagSettingsOverride) -> TagSettings {
    apply_override(&mut base, overlay);
    base
}

/// Merge positional parameters; a `None` overlay slot keeps the base value.
pub fn merge_params(base: MergeParams, overlay: &MergeParams) -> MergeParams {
    let mut result = base;
    for (slot, value) in result.iter_mut().zip(overlay) {
        if value.is_some() {
            *slot = *value;
        }
    }
    result
}
