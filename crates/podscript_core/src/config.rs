//! Editor-wide configuration.

use std::time::Duration;

/// Storage key for the editor auto-save snapshot.
pub const AUTOSAVE_KEY: &str = "podcastScriptData";
/// Storage key for the read-only viewer handoff snapshot.
pub const VIEWER_KEY: &str = "podcastScriptViewerData";

/// Editor settings
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Period between automatic snapshot saves.
    pub autosave_interval: Duration,
    pub autosave_key: String,
    pub viewer_key: String,
    /// Rate used for imported speakers that carry no `wordsPerMinute`.
    pub default_words_per_minute: u32,
    /// Length used for imported sound effects that carry no `duration`.
    pub default_sound_duration_secs: f64,
    /// File stem used when an export name sanitizes to nothing.
    pub default_export_stem: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(30),
            autosave_key: AUTOSAVE_KEY.to_string(),
            viewer_key: VIEWER_KEY.to_string(),
            default_words_per_minute: 150,
            default_sound_duration_secs: 1.0,
            default_export_stem: "podcast-script".to_string(),
        }
    }
}
