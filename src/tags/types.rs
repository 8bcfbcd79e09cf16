//! Tag settings types.
//!
//! [`TagSettings`] is the fully populated view of one tag. [`TagSettingsOverride`]
//! is a sparse patch where `None` means "inherit".

use serde::{Deserialize, Serialize};

/// Number of positional merge parameters (`MarkerMergeParam1..5`).
pub const MERGE_PARAM_COUNT: usize = 5;

/// Positional, strategy-specific merge parameters.
pub type MergeParams = [Option<f64>; MERGE_PARAM_COUNT];

/// Merge strategy used when nothing else is configured.
pub const DEFAULT_MERGE_STRATEGY: &str = "default";

/// Name carried by the global baseline before any tag is resolved against it.
pub const GLOBAL_TAG_NAME: &str = "__global__";

/// Resolved settings for a single tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSettings {
    /// Normalized subject tag.
    pub tag_name: String,
    /// Name of the derived tag written to the host; filled in by resolution.
    pub stash_name: Option<String>,
    pub markers_enabled: bool,
    pub scene_tag_enabled: bool,
    pub image_enabled: bool,
    /// Seconds of coverage required before the scene itself is tagged.
    pub required_scene_tag_duration: Option<f64>,
    /// Markers shorter than this many seconds are dropped.
    pub min_marker_duration: Option<f64>,
    /// Largest gap in seconds bridged when merging adjacent detections.
    pub max_gap: Option<f64>,
    pub merge_strategy: String,
    pub merge_params: MergeParams,
}

impl TagSettings {
    /// Built-in defaults, used as the seed baseline and the final fallback.
    pub fn builtin() -> Self {
        Self {
            tag_name: GLOBAL_TAG_NAME.to_string(),
            stash_name: None,
            markers_enabled: true,
            scene_tag_enabled: true,
            image_enabled: false,
            required_scene_tag_duration: None,
            min_marker_duration: None,
            max_gap: None,
            merge_strategy: DEFAULT_MERGE_STRATEGY.to_string(),
            merge_params: [None; MERGE_PARAM_COUNT],
        }
    }

    /// Get a merge parameter by zero-based position.
    pub fn merge_param(&self, index: usize) -> Option<f64> {
        self.merge_params.get(index).copied().flatten()
    }
}

impl Default for TagSettings {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Sparse set of field replacements for one tag or for the global baseline.
///
/// `stash_name: Some("")` is meaningful: it clears an inherited stash name
/// rather than leaving it alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagSettingsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stash_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_tag_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_scene_tag_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_marker_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_gap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<String>,
    #[serde(default)]
    pub merge_params: MergeParams,
}

impl TagSettingsOverride {
    /// True when applying this override would change nothing.
    pub fn is_empty(&self) -> bool {
        self.stash_name.is_none()
            && self.markers_enabled.is_none()
            && self.scene_tag_enabled.is_none()
            && self.image_enabled.is_none()
            && self.required_scene_tag_duration.is_none()
            && self.min_marker_duration.is_none()
            && self.max_gap.is_none()
            && self.merge_strategy.is_none()
            && self.merge_params.iter().all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults() {
        let settings = TagSettings::builtin();
        assert_eq!(settings.tag_name, GLOBAL_TAG_NAME);
        assert!(settings.markers_enabled);
        assert!(settings.scene_tag_enabled);
        assert!(!settings.image_enabled);
        assert_eq!(settings.merge_strategy, "default");
        assert!(settings.stash_name.is_none());
        assert!(settings.max_gap.is_none());
        assert!(settings.merge_params.iter().all(Option::is_none));
    }

    #[test]
    fn test_merge_param_out_of_range() {
        let mut settings = TagSettings::builtin();
        settings.merge_params[4] = Some(0.5);
        assert_eq!(settings.merge_param(4), Some(0.5));
        assert_eq!(settings.merge_param(5), None);
    }

    #[test]
    fn test_override_is_empty() {
        let mut ov = TagSettingsOverride::default();
        assert!(ov.is_empty());
        ov.merge_params[3] = Some(1.0);
        assert!(!ov.is_empty());
    }
}
