//! Field extraction from the Stats section.
//!
//! Extraction and application are separate steps. [`extract_stats`] reads
//! everything it can recognize into a [`StatsUpdate`]; [`StatsUpdate::apply`]
//! then overwrites only the fields that were found.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use rpgc_core::items::parse_items;
use rpgc_core::{InventoryV2, Meter, Quests, UserStats};

use crate::config::ParserConfig;
use crate::emoji::split_emoji_prefix;
use crate::error::ParseError;
use crate::inventory::extract_inventory;

fn meter_regex(label: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{label}:\s*(\d+)\s*%")).expect("invalid meter regex")
}

static METER_PATTERNS: Lazy<Vec<(Meter, Regex)>> = Lazy::new(|| {
    Meter::ALL
        .iter()
        .map(|&m| (m, meter_regex(m.label())))
        .collect()
});

static STATUS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[\s\-*]*Status:[ \t]*(.+)$").expect("invalid status regex"));

static MOOD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[\s\-*]*Mood:[ \t]*(.+)$").expect("invalid mood regex"));

static CONDITIONS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[\s\-*]*Conditions?:[ \t]*(.+)$").expect("invalid conditions regex")
});

static MAIN_QUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[\s\-*]*Main\s+Quests?:[ \t]*(.*)$").expect("invalid main quest regex")
});

static OPTIONAL_QUESTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[\s\-*]*Optional\s+Quests?:[ \t]*(.*)$")
        .expect("invalid optional quest regex")
});

/// Line prefixes that are never a mood line.
const KEYWORD_PREFIXES: &[&str] = &[
    "health",
    "satiety",
    "energy",
    "hygiene",
    "arousal",
    "status",
    "mood",
    "condition",
    "inventory",
    "on person",
    "stored",
    "assets",
    "main quest",
    "optional quest",
    "quests",
    "skills",
];

/// Everything recognized in one Stats section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsUpdate {
    /// Meter values that were present.
    pub meters: Vec<(Meter, u32)>,
    /// Mood and conditions.
    pub mood: Option<(String, String)>,
    /// Conditions from an explicit `Conditions:` line.
    pub conditions: Option<String>,
    /// The parsed inventory, if any inventory lines were present.
    pub inventory: Option<InventoryV2>,
    /// Main quest title.
    pub main_quest: Option<String>,
    /// Optional quest titles.
    pub optional_quests: Option<Vec<String>>,
}

impl StatsUpdate {
    /// Whether nothing was recognized.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite the fields that were found; leave the rest alone.
    pub fn apply(self, stats: &mut UserStats, quests: &mut Quests) {
        for (meter, value) in self.meters {
            stats.set_meter(meter, value);
        }
        if let Some((mood, conditions)) = self.mood {
            stats.mood = mood;
            stats.conditions = conditions;
        }
        if let Some(conditions) = self.conditions {
            stats.conditions = conditions;
        }
        if let Some(inventory) = self.inventory {
            stats.inventory = inventory;
        }
        if let Some(main) = self.main_quest {
            quests.set_main(&main);
        }
        if let Some(optional) = self.optional_quests {
            quests.optional = optional;
        }
    }
}

/// Parse a Stats section into `stats` and `quests`.
///
/// Best-effort: absent or malformed fields keep their previous values.
pub fn parse_user_stats(
    text: &str,
    stats: &mut UserStats,
    quests: &mut Quests,
    config: &ParserConfig,
) {
    let update = extract_stats(text, config);
    if update.is_empty() {
        debug!("no stats fields recognized");
    }
    update.apply(stats, quests);
}

/// Read every recognizable field from a Stats section.
pub fn extract_stats(text: &str, config: &ParserConfig) -> StatsUpdate {
    StatsUpdate {
        meters: extract_meters(text),
        mood: extract_mood(text, config),
        conditions: CONDITIONS_LINE
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty()),
        inventory: extract_inventory(text),
        main_quest: MAIN_QUEST
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string()),
        optional_quests: OPTIONAL_QUESTS
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| parse_items(m.as_str())),
    }
}

fn extract_meters(text: &str) -> Vec<(Meter, u32)> {
    let mut meters = Vec::new();
    for (meter, re) in METER_PATTERNS.iter() {
        let Some(raw) = re.captures(text).and_then(|c| c.get(1)) else {
            continue;
        };
        match raw.as_str().parse::<u32>() {
            Ok(value) => meters.push((*meter, value)),
            Err(_) => {
                let err = ParseError::InvalidNumber {
                    label: meter.label(),
                    value: raw.as_str().to_string(),
                };
                warn!(error = %err, "skipping meter");
            }
        }
    }
    meters
}

fn extract_mood(text: &str, config: &ParserConfig) -> Option<(String, String)> {
    for re in [&*STATUS_LINE, &*MOOD_LINE] {
        if let Some(line) = re.captures(text).and_then(|c| c.get(1)) {
            return Some(split_mood(line.as_str()));
        }
    }
    scan_mood_line(text, config)
}

/// Split `"😊, Tired"`, `"Happy - Tired"` or `"Happy"` into mood and
/// conditions.
fn split_mood(content: &str) -> (String, String) {
    let content = content.trim();
    if let Some((emoji, rest)) = split_emoji_prefix(content) {
        return (emoji.to_string(), rest.to_string());
    }
    let split = content
        .split_once(',')
        .or_else(|| content.split_once(" - "));
    match split {
        Some((mood, conditions)) if !mood.trim().is_empty() => {
            (mood.trim().to_string(), conditions.trim().to_string())
        }
        _ => (content.to_string(), "None".to_string()),
    }
}

/// Find the first short `label: text` line that is not a known field.
fn scan_mood_line(text: &str, config: &ParserConfig) -> Option<(String, String)> {
    text.lines().find_map(|line| {
        let line = line.trim().trim_start_matches(['-', '*']).trim();
        if line.contains('%') {
            return None;
        }
        let lower = line.to_lowercase();
        if KEYWORD_PREFIXES.iter().any(|k| lower.starts_with(k)) {
            return None;
        }
        let (label, rest) = line.split_once(':')?;
        let label = label.trim();
        let rest = rest.trim();
        if label.is_empty() || rest.is_empty() || label.chars().count() > config.mood_label_max_chars
        {
            return None;
        }
        Some((label.to_string(), rest.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (UserStats, Quests) {
        let mut stats = UserStats::default();
        let mut quests = Quests::default();
        parse_user_stats(text, &mut stats, &mut quests, &ParserConfig::default());
        (stats, quests)
    }

    #[test]
    fn scenario_meters_mood_and_legacy_inventory() {
        let text = "Stats\n---\nHealth: 80%\nEnergy: 50%\n😊: Tired\nInventory: Sword, Shield";
        let (stats, _) = parse(text);
        assert_eq!(stats.health, 80);
        assert_eq!(stats.energy, 50);
        assert_eq!(stats.satiety, 100);
        assert_eq!(stats.mood, "😊");
        assert_eq!(stats.conditions, "Tired");
        assert_eq!(stats.inventory.on_person, "Sword, Shield");
    }

    #[test]
    fn meters_in_any_order() {
        let (stats, _) = parse("Arousal: 5%\nHygiene: 40 %\nSatiety: 70%");
        assert_eq!(stats.arousal, 5);
        assert_eq!(stats.hygiene, 40);
        assert_eq!(stats.satiety, 70);
        assert_eq!(stats.health, 100);
    }

    #[test]
    fn oversized_meter_is_skipped() {
        let (stats, _) = parse("Health: 99999999999999999999%\nEnergy: 20%");
        assert_eq!(stats.health, 100);
        assert_eq!(stats.energy, 20);
    }

    #[test]
    fn status_line_with_emoji() {
        let (stats, _) = parse("Status: 😠, Bruised ribs");
        assert_eq!(stats.mood, "😠");
        assert_eq!(stats.conditions, "Bruised ribs");
    }

    #[test]
    fn mood_line_with_dash() {
        let (stats, _) = parse("Mood: Anxious - Cold");
        assert_eq!(stats.mood, "Anxious");
        assert_eq!(stats.conditions, "Cold");
    }

    #[test]
    fn mood_line_without_separator() {
        let (stats, _) = parse("Mood: Content");
        assert_eq!(stats.mood, "Content");
        assert_eq!(stats.conditions, "None");
    }

    #[test]
    fn status_wins_over_mood() {
        let (stats, _) = parse("Mood: 😢, Sad\nStatus: 😊, Fine");
        assert_eq!(stats.mood, "😊");
    }

    #[test]
    fn long_label_is_not_mood() {
        let (stats, _) = parse("The weather outside: grim");
        assert_eq!(stats.mood, "😐");
    }

    #[test]
    fn explicit_conditions_line() {
        let (stats, _) = parse("😊: Fine\nConditions: Poisoned");
        assert_eq!(stats.mood, "😊");
        assert_eq!(stats.conditions, "Poisoned");
    }

    #[test]
    fn quests_extracted() {
        let (_, quests) = parse("Main Quest: Find the relic\nOptional Quests: Help the smith, None, Map (old, torn)");
        assert_eq!(quests.main, "Find the relic");
        assert_eq!(quests.optional, vec!["Help the smith", "Map (old, torn)"]);
    }

    #[test]
    fn absent_fields_leave_previous_values() {
        let mut stats = UserStats {
            health: 30,
            mood: "😴".into(),
            ..UserStats::default()
        };
        stats.inventory.on_person = "Lantern".into();
        let mut quests = Quests::default();
        quests.set_main("Escape");
        parse_user_stats("Energy: 10%", &mut stats, &mut quests, &ParserConfig::default());
        assert_eq!(stats.health, 30);
        assert_eq!(stats.energy, 10);
        assert_eq!(stats.mood, "😴");
        assert_eq!(stats.inventory.on_person, "Lantern");
        assert_eq!(quests.main, "Escape");
    }

    #[test]
    fn garbage_is_harmless() {
        let (stats, quests) = parse("%%%:::\n\u{0}\n```");
        assert_eq!(stats, UserStats::default());
        assert_eq!(quests, Quests::default());
    }
}
