//! Raw tracker sections as extracted from one model response.

use serde::{Deserialize, Serialize};

/// One of the three tracker sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackerSection {
    /// Meters, mood, inventory, quests.
    Stats,
    /// Date, weather, time, location.
    InfoBox,
    /// Present characters and their thoughts.
    PresentCharacters,
}

impl TrackerSection {
    /// All sections in output order.
    pub const ALL: [TrackerSection; 3] = [
        TrackerSection::Stats,
        TrackerSection::InfoBox,
        TrackerSection::PresentCharacters,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stats => "Stats",
            Self::InfoBox => "Info Box",
            Self::PresentCharacters => "Present Characters",
        }
    }
}

impl std::fmt::Display for TrackerSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The raw text of each tracker section, `None` where a section was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackerSnapshot {
    /// Raw Stats section text.
    pub user_stats: Option<String>,
    /// Raw Info Box section text.
    pub info_box: Option<String>,
    /// Raw Present Characters section text.
    pub character_thoughts: Option<String>,
}

impl TrackerSnapshot {
    /// The text stored for a section.
    pub fn get(&self, section: TrackerSection) -> Option<&str> {
        match section {
            TrackerSection::Stats => self.user_stats.as_deref(),
            TrackerSection::InfoBox => self.info_box.as_deref(),
            TrackerSection::PresentCharacters => self.character_thoughts.as_deref(),
        }
    }

    /// Mutable slot for a section.
    pub fn slot_mut(&mut self, section: TrackerSection) -> &mut Option<String> {
        match section {
            TrackerSection::Stats => &mut self.user_stats,
            TrackerSection::InfoBox => &mut self.info_box,
            TrackerSection::PresentCharacters => &mut self.character_thoughts,
        }
    }

    /// Whether every section is absent.
    pub fn is_empty(&self) -> bool {
        self.user_stats.is_none() && self.info_box.is_none() && self.character_thoughts.is_none()
    }

    /// Whether no section carries real tracker content.
    ///
    /// A section counts as placeholder when it holds nothing but its header
    /// and divider (no `Label: value` line), which is what a freshly created
    /// chat stores before the first generation.
    pub fn is_placeholder(&self) -> bool {
        TrackerSection::ALL
            .iter()
            .all(|s| self.get(*s).is_none_or(|text| !has_field_line(text)))
    }

    /// Overwrite the sections that are present in `other`, keep the rest.
    pub fn merge_from(&mut self, other: &TrackerSnapshot) {
        for section in TrackerSection::ALL {
            if let Some(text) = other.get(section) {
                *self.slot_mut(section) = Some(text.to_string());
            }
        }
    }
}

fn has_field_line(text: &str) -> bool {
    text.lines().any(|line| {
        line.split_once(':')
            .is_some_and(|(label, value)| !label.trim().is_empty() && !value.trim().is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_placeholder() {
        let s = TrackerSnapshot::default();
        assert!(s.is_empty());
        assert!(s.is_placeholder());
    }

    #[test]
    fn header_only_is_placeholder() {
        let s = TrackerSnapshot {
            user_stats: Some("Stats\n---".into()),
            info_box: Some("Info Box\n---\n".into()),
            character_thoughts: None,
        };
        assert!(!s.is_empty());
        assert!(s.is_placeholder());
    }

    #[test]
    fn field_line_is_content() {
        let s = TrackerSnapshot {
            user_stats: Some("Stats\n---\nHealth: 80%".into()),
            ..Default::default()
        };
        assert!(!s.is_placeholder());
    }

    #[test]
    fn merge_keeps_absent_sections() {
        let mut s = TrackerSnapshot {
            user_stats: Some("old stats".into()),
            info_box: Some("old info".into()),
            character_thoughts: None,
        };
        s.merge_from(&TrackerSnapshot {
            user_stats: Some("new stats".into()),
            ..Default::default()
        });
        assert_eq!(s.user_stats.as_deref(), Some("new stats"));
        assert_eq!(s.info_box.as_deref(), Some("old info"));
    }

    #[test]
    fn serializes_camel_case() {
        let s = TrackerSnapshot {
            character_thoughts: Some("x".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["characterThoughts"], "x");
        assert!(json["userStats"].is_null());
    }
}
