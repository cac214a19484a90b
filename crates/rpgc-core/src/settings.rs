//! Persisted extension settings.

use serde::{Deserialize, Serialize};

use crate::dice::DiceRoll;
use crate::quests::Quests;
use crate::snapshot::TrackerSection;
use crate::stats::{ClassicStats, UserStats};

/// How tracker data is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Trackers are emitted inline with the narrative in one model call.
    #[default]
    Together,
    /// Trackers come from a dedicated call after the narrative.
    Separate,
}

impl GenerationMode {
    /// Parse a mode name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "together" => Some(Self::Together),
            "separate" => Some(Self::Separate),
            _ => None,
        }
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Together => write!(f, "together"),
            Self::Separate => write!(f, "separate"),
        }
    }
}

/// Everything the extension persists in the host's settings object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtensionSettings {
    /// Master switch.
    pub enabled: bool,
    /// Run the dedicated tracker call automatically after each reply
    /// (separate mode only).
    pub auto_update: bool,
    /// How tracker data is produced.
    pub generation_mode: GenerationMode,
    /// Include the Stats section.
    pub show_user_stats: bool,
    /// Include the Info Box section.
    pub show_info_box: bool,
    /// Include the Present Characters section.
    pub show_character_thoughts: bool,
    /// Include inventory lines in the Stats section.
    pub show_inventory: bool,
    /// Include quest lines in the Stats section.
    pub show_quests: bool,
    /// Ask the model for inline rich-media formatting.
    pub enable_html_prompt: bool,
    /// Number of recent chat messages sent with a separate-mode tracker call.
    pub update_depth: usize,
    /// Character level, recapped alongside dice rolls.
    pub level: u32,
    /// Meters, mood, and inventory.
    pub user_stats: UserStats,
    /// Classic attributes.
    pub classic_stats: ClassicStats,
    /// Active quests.
    pub quests: Quests,
    /// The last saved dice roll, consumed by the next generation.
    pub last_dice_roll: Option<DiceRoll>,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_update: true,
            generation_mode: GenerationMode::Together,
            show_user_stats: true,
            show_info_box: true,
            show_character_thoughts: true,
            show_inventory: true,
            show_quests: true,
            enable_html_prompt: false,
            update_depth: 4,
            level: 1,
            user_stats: UserStats::default(),
            classic_stats: ClassicStats::default(),
            quests: Quests::default(),
            last_dice_roll: None,
        }
    }
}

impl ExtensionSettings {
    /// Whether a section is enabled.
    pub fn shows(&self, section: TrackerSection) -> bool {
        match section {
            TrackerSection::Stats => self.show_user_stats,
            TrackerSection::InfoBox => self.show_info_box,
            TrackerSection::PresentCharacters => self.show_character_thoughts,
        }
    }

    /// Enabled sections in output order.
    pub fn enabled_sections(&self) -> Vec<TrackerSection> {
        TrackerSection::ALL
            .into_iter()
            .filter(|s| self.shows(*s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = ExtensionSettings::default();
        assert!(s.enabled);
        assert_eq!(s.generation_mode, GenerationMode::Together);
        assert_eq!(s.update_depth, 4);
        assert_eq!(s.enabled_sections().len(), 3);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: ExtensionSettings =
            serde_json::from_str(r#"{"generationMode": "separate", "showInfoBox": false}"#)
                .unwrap();
        assert_eq!(s.generation_mode, GenerationMode::Separate);
        assert!(!s.shows(TrackerSection::InfoBox));
        assert!(s.shows(TrackerSection::Stats));
        assert_eq!(s.user_stats.health, 100);
    }

    #[test]
    fn mode_parse() {
        assert_eq!(GenerationMode::parse("Separate"), Some(GenerationMode::Separate));
        assert_eq!(GenerationMode::parse("both"), None);
        assert_eq!(GenerationMode::Together.to_string(), "together");
    }
}
