//! Manual edits to the player's stats.
//!
//! An edit is applied by [`apply_edit`], which returns new values instead of
//! mutating shared state. [`build_user_stats_text`] then regenerates the
//! Stats section so the edit also reaches the model.

use std::fmt::Write as _;

use rpgc_core::items::{NONE, serialize_items};
use rpgc_core::stats::METER_MAX;
use rpgc_core::{ExtensionSettings, InventoryBucket, Meter, Quests, UserStats};

use crate::error::{SessionError, SessionResult};

/// One field edit from the stats panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsEdit {
    /// Set a meter from raw field text such as `"45%"`.
    Meter {
        /// The meter being edited.
        meter: Meter,
        /// Raw field text.
        raw: String,
    },
    /// Set the mood tag.
    Mood(String),
    /// Set the conditions text.
    Conditions(String),
    /// Add an item to a bucket.
    AddItem {
        /// Target bucket.
        bucket: InventoryBucket,
        /// Item name.
        item: String,
    },
    /// Remove the item at an index from a bucket.
    RemoveItem {
        /// Target bucket.
        bucket: InventoryBucket,
        /// Item index.
        index: usize,
    },
    /// Add a stored location.
    AddLocation(String),
    /// Remove a stored location and its items.
    RemoveLocation(String),
    /// Set the main quest.
    MainQuest(String),
    /// Add an optional quest.
    AddOptionalQuest(String),
    /// Remove the optional quest at an index.
    RemoveOptionalQuest(usize),
}

/// Usage text for [`StatsEdit::parse`].
pub const EDIT_USAGE: &str = "\
edit <health|satiety|energy|hygiene|arousal> <value>
edit mood <text>
edit conditions <text>
edit add <person|assets|stored:LOCATION> <item>
edit remove <person|assets|stored:LOCATION> <index>
edit location <add|remove> <name>
edit quest <title>
edit optional <add|remove> <title|index>";

fn parse_bucket(token: &str) -> SessionResult<InventoryBucket> {
    match token.to_lowercase().as_str() {
        "person" | "onperson" | "on-person" => Ok(InventoryBucket::OnPerson),
        "assets" => Ok(InventoryBucket::Assets),
        _ => match token.split_once(':') {
            Some((kind, loc)) if kind.eq_ignore_ascii_case("stored") && !loc.trim().is_empty() => {
                Ok(InventoryBucket::Stored(loc.trim().to_string()))
            }
            _ => Err(SessionError::InvalidInput(format!("unknown bucket: {token}"))),
        },
    }
}

fn parse_index(token: &str) -> SessionResult<usize> {
    token
        .trim()
        .parse()
        .map_err(|_| SessionError::InvalidInput(format!("not an index: {token}")))
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    }
}

impl StatsEdit {
    /// Parse the arguments of an `edit` command.
    pub fn parse(input: &str) -> SessionResult<Self> {
        let usage = || SessionError::InvalidInput(format!("usage:\n{EDIT_USAGE}"));
        let (field, rest) = split_word(input);
        if field.is_empty() || rest.is_empty() {
            return Err(usage());
        }

        if let Some(meter) = Meter::parse(field) {
            return Ok(Self::Meter {
                meter,
                raw: rest.to_string(),
            });
        }

        let (sub, arg) = split_word(rest);
        let edit = match (field.to_lowercase().as_str(), sub.to_lowercase().as_str()) {
            ("mood", _) => Self::Mood(rest.to_string()),
            ("conditions", _) => Self::Conditions(rest.to_string()),
            ("quest", _) => Self::MainQuest(rest.to_string()),
            ("add", _) if !arg.is_empty() => Self::AddItem {
                bucket: parse_bucket(sub)?,
                item: arg.to_string(),
            },
            ("remove", _) if !arg.is_empty() => Self::RemoveItem {
                bucket: parse_bucket(sub)?,
                index: parse_index(arg)?,
            },
            ("location", "add") if !arg.is_empty() => Self::AddLocation(arg.to_string()),
            ("location", "remove") if !arg.is_empty() => Self::RemoveLocation(arg.to_string()),
            ("optional", "add") if !arg.is_empty() => Self::AddOptionalQuest(arg.to_string()),
            ("optional", "remove") if !arg.is_empty() => {
                Self::RemoveOptionalQuest(parse_index(arg)?)
            }
            _ => return Err(usage()),
        };
        Ok(edit)
    }
}

/// Read a meter value from field text: digits only, clamped to 0-100.
pub fn parse_meter_input(raw: &str) -> SessionResult<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(SessionError::InvalidInput(format!("no number in \"{raw}\"")));
    }
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    Ok(u32::try_from(value.min(u64::from(METER_MAX))).unwrap_or(METER_MAX))
}

/// Apply one edit, returning the updated stats and quests.
pub fn apply_edit(
    stats: &UserStats,
    quests: &Quests,
    edit: &StatsEdit,
) -> SessionResult<(UserStats, Quests)> {
    let mut stats = stats.clone();
    let mut quests = quests.clone();

    match edit {
        StatsEdit::Meter { meter, raw } => stats.set_meter(*meter, parse_meter_input(raw)?),
        StatsEdit::Mood(mood) => stats.mood = non_empty(mood, "mood")?,
        StatsEdit::Conditions(text) => {
            stats.conditions = match text.trim() {
                "" => NONE.to_string(),
                t => t.to_string(),
            }
        }
        StatsEdit::AddItem { bucket, item } => stats.inventory.add_item(bucket, item)?,
        StatsEdit::RemoveItem { bucket, index } => {
            stats.inventory.remove_item(bucket, *index)?;
        }
        StatsEdit::AddLocation(name) => {
            stats.inventory.add_location(name)?;
        }
        StatsEdit::RemoveLocation(name) => {
            stats.inventory.remove_location(name)?;
        }
        StatsEdit::MainQuest(title) => quests.set_main(title),
        StatsEdit::AddOptionalQuest(title) => quests.add_optional(title)?,
        StatsEdit::RemoveOptionalQuest(index) => {
            quests.remove_optional(*index)?;
        }
    }

    Ok((stats, quests))
}

fn non_empty(text: &str, what: &str) -> SessionResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SessionError::InvalidInput(format!("empty {what}")));
    }
    Ok(text.to_string())
}

/// Render stats and quests as a Stats section in the tracker format.
///
/// Inventory and quest lines follow the `show_inventory` and `show_quests`
/// toggles of `settings`.
pub fn build_user_stats_text(
    stats: &UserStats,
    quests: &Quests,
    user_name: &str,
    settings: &ExtensionSettings,
) -> String {
    let mut out = format!("{user_name}'s Stats\n---\n");
    for meter in Meter::ALL {
        let _ = writeln!(out, "{}: {}%", meter.label(), stats.meter(meter));
    }
    let _ = writeln!(out, "{}: {}", stats.mood, stats.conditions);

    if settings.show_inventory {
        let inv = &stats.inventory;
        let _ = writeln!(out, "On Person: {}", inv.on_person);
        for (location, items) in &inv.stored {
            let _ = writeln!(out, "Stored - {location}: {items}");
        }
        let _ = writeln!(out, "Assets: {}", inv.assets);
    }

    if settings.show_quests {
        let _ = writeln!(out, "Main Quest: {}", quests.main);
        let _ = writeln!(out, "Optional Quests: {}", serialize_items(&quests.optional));
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpgc_parser::{ParserConfig, parse_user_stats};

    fn sample() -> (UserStats, Quests) {
        let mut stats = UserStats {
            health: 45,
            mood: "😊".into(),
            conditions: "Tired".into(),
            ..UserStats::default()
        };
        stats.inventory.on_person = "Sword, Shield".into();
        stats.inventory.stored.insert("Home".into(), "Rope".into());
        let mut quests = Quests::default();
        quests.set_main("Find the relic");
        quests.optional.push("Help the smith".into());
        (stats, quests)
    }

    #[test]
    fn stats_text_snapshot() {
        let (stats, quests) = sample();
        let text = build_user_stats_text(&stats, &quests, "Alex", &ExtensionSettings::default());
        insta::assert_snapshot!(text, @r"
        Alex's Stats
        ---
        Health: 45%
        Satiety: 100%
        Energy: 100%
        Hygiene: 100%
        Arousal: 0%
        😊: Tired
        On Person: Sword, Shield
        Stored - Home: Rope
        Assets: None
        Main Quest: Find the relic
        Optional Quests: Help the smith
        ");
    }

    #[test]
    fn stats_text_reparses_to_same_values() {
        let (stats, quests) = sample();
        let text = build_user_stats_text(&stats, &quests, "Alex", &ExtensionSettings::default());
        let mut parsed = UserStats::default();
        let mut parsed_quests = Quests::default();
        parse_user_stats(&text, &mut parsed, &mut parsed_quests, &ParserConfig::default());
        assert_eq!(parsed, stats);
        assert_eq!(parsed_quests, quests);
    }

    #[test]
    fn stats_text_honours_section_toggles() {
        let (stats, quests) = sample();
        let settings = ExtensionSettings {
            show_inventory: false,
            ..ExtensionSettings::default()
        };
        let text = build_user_stats_text(&stats, &quests, "Alex", &settings);
        assert!(text.ends_with("😊: Tired"));
        assert!(!text.contains("On Person"));
        assert!(!text.contains("Stored - Home"));
        assert!(text.contains("Health: 45%"));

        let settings = ExtensionSettings {
            show_quests: false,
            ..ExtensionSettings::default()
        };
        let text = build_user_stats_text(&stats, &quests, "Alex", &settings);
        assert!(text.ends_with("Assets: None"));
        assert!(!text.contains("Main Quest"));
        assert!(!text.contains("Optional Quests"));
    }

    #[test]
    fn meter_input_digits_and_clamp() {
        assert_eq!(parse_meter_input("45%").unwrap(), 45);
        assert_eq!(parse_meter_input(" 1 0 ").unwrap(), 10);
        assert_eq!(parse_meter_input("250").unwrap(), 100);
        assert_eq!(parse_meter_input("99999999999999999999999").unwrap(), 100);
        assert!(parse_meter_input("full").is_err());
    }

    #[test]
    fn apply_meter_edit_is_pure() {
        let (stats, quests) = sample();
        let edit = StatsEdit::Meter {
            meter: Meter::Energy,
            raw: "12%".into(),
        };
        let (new_stats, new_quests) = apply_edit(&stats, &quests, &edit).unwrap();
        assert_eq!(new_stats.energy, 12);
        assert_eq!(stats.energy, 100);
        assert_eq!(new_quests, quests);
    }

    #[test]
    fn inventory_edits() {
        let (stats, quests) = sample();
        let add = StatsEdit::parse("add stored:Home Lamp").unwrap();
        let (stats, _) = apply_edit(&stats, &quests, &add).unwrap();
        assert_eq!(stats.inventory.stored["Home"], "Rope, Lamp");

        let remove = StatsEdit::parse("remove person 0").unwrap();
        let (stats, _) = apply_edit(&stats, &quests, &remove).unwrap();
        assert_eq!(stats.inventory.on_person, "Shield");

        let bad = StatsEdit::parse("location add __proto__").unwrap();
        assert!(apply_edit(&stats, &quests, &bad).is_err());
    }

    #[test]
    fn quest_edits() {
        let (stats, quests) = sample();
        let (_, quests) =
            apply_edit(&stats, &quests, &StatsEdit::parse("optional add Map the caves").unwrap())
                .unwrap();
        assert_eq!(quests.optional.len(), 2);
        let (_, quests) =
            apply_edit(&stats, &quests, &StatsEdit::parse("optional remove 0").unwrap()).unwrap();
        assert_eq!(quests.optional, vec!["Map the caves"]);
        let (_, quests) =
            apply_edit(&stats, &quests, &StatsEdit::MainQuest("  ".into())).unwrap();
        assert_eq!(quests.main, "None");
    }

    #[test]
    fn parse_edit_commands() {
        assert_eq!(
            StatsEdit::parse("health 45%").unwrap(),
            StatsEdit::Meter {
                meter: Meter::Health,
                raw: "45%".into()
            }
        );
        assert_eq!(
            StatsEdit::parse("mood 😠").unwrap(),
            StatsEdit::Mood("😠".into())
        );
        assert_eq!(
            StatsEdit::parse("location remove Old Mill").unwrap(),
            StatsEdit::RemoveLocation("Old Mill".into())
        );
        assert!(StatsEdit::parse("mana 10").is_err());
        assert!(StatsEdit::parse("health").is_err());
        assert!(StatsEdit::parse("add backpack Rope").is_err());
    }
}
