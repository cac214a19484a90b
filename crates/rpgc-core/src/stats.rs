//! Needs meters, mood, and classic attributes.

use serde::{Deserialize, Serialize};

use crate::inventory::InventoryV2;

/// Upper bound applied to meters on manual edit.
pub const METER_MAX: u32 = 100;

/// Bounds applied to classic attributes.
pub const ATTRIBUTE_MIN: i32 = 1;
/// Upper bound for classic attributes.
pub const ATTRIBUTE_MAX: i32 = 30;

/// One of the five percentage meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meter {
    /// Physical health.
    Health,
    /// Hunger (100 = fully fed).
    Satiety,
    /// Stamina / tiredness.
    Energy,
    /// Cleanliness.
    Hygiene,
    /// Arousal.
    Arousal,
}

impl Meter {
    /// All meters in display order.
    pub const ALL: [Meter; 5] = [
        Meter::Health,
        Meter::Satiety,
        Meter::Energy,
        Meter::Hygiene,
        Meter::Arousal,
    ];

    /// The label used in tracker text, e.g. `Health`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Health => "Health",
            Self::Satiety => "Satiety",
            Self::Energy => "Energy",
            Self::Hygiene => "Hygiene",
            Self::Arousal => "Arousal",
        }
    }

    /// Parse a meter from its label (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for Meter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The player's tracked stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserStats {
    /// Health, conventionally 0-100.
    pub health: u32,
    /// Satiety, conventionally 0-100.
    pub satiety: u32,
    /// Energy, conventionally 0-100.
    pub energy: u32,
    /// Hygiene, conventionally 0-100.
    pub hygiene: u32,
    /// Arousal, conventionally 0-100.
    pub arousal: u32,
    /// Short mood tag, usually an emoji.
    pub mood: String,
    /// Free-text conditions.
    pub conditions: String,
    /// The three-bucket inventory.
    pub inventory: InventoryV2,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            health: 100,
            satiety: 100,
            energy: 100,
            hygiene: 100,
            arousal: 0,
            mood: "😐".to_string(),
            conditions: "None".to_string(),
            inventory: InventoryV2::default(),
        }
    }
}

impl UserStats {
    /// Current value of a meter.
    pub fn meter(&self, meter: Meter) -> u32 {
        match meter {
            Meter::Health => self.health,
            Meter::Satiety => self.satiety,
            Meter::Energy => self.energy,
            Meter::Hygiene => self.hygiene,
            Meter::Arousal => self.arousal,
        }
    }

    /// Set a meter without clamping.
    pub fn set_meter(&mut self, meter: Meter, value: u32) {
        match meter {
            Meter::Health => self.health = value,
            Meter::Satiety => self.satiety = value,
            Meter::Energy => self.energy = value,
            Meter::Hygiene => self.hygiene = value,
            Meter::Arousal => self.arousal = value,
        }
    }
}

/// A classic six-attribute block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Strength.
    Str,
    /// Dexterity.
    Dex,
    /// Constitution.
    Con,
    /// Intelligence.
    Int,
    /// Wisdom.
    Wis,
    /// Charisma.
    Cha,
}

impl Attribute {
    /// All attributes in sheet order.
    pub const ALL: [Attribute; 6] = [
        Attribute::Str,
        Attribute::Dex,
        Attribute::Con,
        Attribute::Int,
        Attribute::Wis,
        Attribute::Cha,
    ];

    /// Upper-case abbreviation, e.g. `STR`.
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Con => "CON",
            Self::Int => "INT",
            Self::Wis => "WIS",
            Self::Cha => "CHA",
        }
    }

    /// Parse from an abbreviation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.abbrev().eq_ignore_ascii_case(s.trim()))
    }
}

/// Classic attributes adjusted through +/- controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassicStats {
    /// Strength.
    pub str: i32,
    /// Dexterity.
    pub dex: i32,
    /// Constitution.
    pub con: i32,
    /// Intelligence.
    pub int: i32,
    /// Wisdom.
    pub wis: i32,
    /// Charisma.
    pub cha: i32,
}

impl Default for ClassicStats {
    fn default() -> Self {
        Self {
            str: 10,
            dex: 10,
            con: 10,
            int: 10,
            wis: 10,
            cha: 10,
        }
    }
}

impl ClassicStats {
    /// Current value of an attribute.
    pub fn get(&self, attr: Attribute) -> i32 {
        match attr {
            Attribute::Str => self.str,
            Attribute::Dex => self.dex,
            Attribute::Con => self.con,
            Attribute::Int => self.int,
            Attribute::Wis => self.wis,
            Attribute::Cha => self.cha,
        }
    }

    /// Add `delta` to an attribute, clamped to 1-30. Returns the new value.
    pub fn adjust(&mut self, attr: Attribute, delta: i32) -> i32 {
        let slot = match attr {
            Attribute::Str => &mut self.str,
            Attribute::Dex => &mut self.dex,
            Attribute::Con => &mut self.con,
            Attribute::Int => &mut self.int,
            Attribute::Wis => &mut self.wis,
            Attribute::Cha => &mut self.cha,
        };
        *slot = slot.saturating_add(delta).clamp(ATTRIBUTE_MIN, ATTRIBUTE_MAX);
        *slot
    }

    /// `STR 10, DEX 12, ...` summary line.
    pub fn summary(&self) -> String {
        Attribute::ALL
            .iter()
            .map(|a| format!("{} {}", a.abbrev(), self.get(*a)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_roundtrip_by_label() {
        for m in Meter::ALL {
            assert_eq!(Meter::parse(m.label()), Some(m));
        }
        assert_eq!(Meter::parse("health"), Some(Meter::Health));
        assert_eq!(Meter::parse("mana"), None);
    }

    #[test]
    fn set_and_get_meter() {
        let mut s = UserStats::default();
        s.set_meter(Meter::Energy, 42);
        assert_eq!(s.meter(Meter::Energy), 42);
        assert_eq!(s.energy, 42);
    }

    #[test]
    fn user_stats_defaults_fill_missing_fields() {
        let s: UserStats = serde_json::from_str(r#"{"health": 55}"#).unwrap();
        assert_eq!(s.health, 55);
        assert_eq!(s.satiety, 100);
        assert_eq!(s.inventory.version, 2);
    }

    #[test]
    fn attribute_adjust_clamped() {
        let mut c = ClassicStats::default();
        assert_eq!(c.adjust(Attribute::Str, 5), 15);
        assert_eq!(c.adjust(Attribute::Str, 100), ATTRIBUTE_MAX);
        assert_eq!(c.adjust(Attribute::Dex, -50), ATTRIBUTE_MIN);
    }

    #[test]
    fn attribute_summary() {
        let c = ClassicStats::default();
        assert_eq!(
            c.summary(),
            "STR 10, DEX 10, CON 10, INT 10, WIS 10, CHA 10"
        );
        assert_eq!(Attribute::parse("wis"), Some(Attribute::Wis));
    }
}
