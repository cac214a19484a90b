//! Scene fields from the Info Box section.
//!
//! Two label styles exist. Current output uses text labels:
//!
//! ```text
//! Info Box
//! ---
//! Date: Monday, March 3rd
//! Weather: ☀️ Sunny
//! Temperature: 18°C
//! Time: 09:00 → 10:30
//! Location: Harbor market
//! Recent Events: The ship arrived
//! ```
//!
//! Older output used emoji labels (`🗓️:`, `🌡️:`, `🕒:`, `🗺️:`) and a
//! weather line labelled by the weather emoji itself, e.g. `🌧️: Light rain`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ParserConfig;
use crate::emoji::{is_emoji, normalize_label, split_emoji_prefix};

/// Parsed Info Box fields. Missing fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoBox {
    /// In-world date.
    pub date: Option<String>,
    /// Weather glyph.
    pub weather_emoji: Option<String>,
    /// Weather description.
    pub weather: Option<String>,
    /// Temperature, verbatim.
    pub temperature: Option<String>,
    /// Time or time range, verbatim.
    pub time: Option<String>,
    /// Current location.
    pub location: Option<String>,
    /// Recent events summary.
    pub recent_events: Option<String>,
}

impl InfoBox {
    /// Whether no field was found.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

enum Field {
    Date,
    Weather,
    Temperature,
    Time,
    Location,
    RecentEvents,
}

fn field_for(label: &str) -> Option<Field> {
    Some(match normalize_label(label).as_str() {
        "date" | "🗓" | "📅" => Field::Date,
        "weather" => Field::Weather,
        "temperature" | "temp" | "🌡" => Field::Temperature,
        "time" | "🕒" | "⏰" => Field::Time,
        "location" | "🗺" | "📍" => Field::Location,
        "recent events" | "events" => Field::RecentEvents,
        _ => return None,
    })
}

/// Parse an Info Box section.
pub fn parse_info_box(text: &str, config: &ParserConfig) -> InfoBox {
    let mut info = InfoBox::default();

    for line in text.lines() {
        let line = line.trim().trim_start_matches(['-', '*']).trim();
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match field_for(label) {
            Some(Field::Date) => info.date = Some(value.to_string()),
            Some(Field::Temperature) => info.temperature = Some(value.to_string()),
            Some(Field::Time) => info.time = Some(value.to_string()),
            Some(Field::Location) => info.location = Some(value.to_string()),
            Some(Field::RecentEvents) => info.recent_events = Some(value.to_string()),
            Some(Field::Weather) => match split_emoji_prefix(value) {
                Some((emoji, desc)) => {
                    info.weather_emoji = Some(emoji.to_string());
                    info.weather = Some(desc.to_string());
                }
                None if is_emoji(value) => info.weather_emoji = Some(value.to_string()),
                None => info.weather = Some(value.to_string()),
            },
            None if info.weather_emoji.is_none()
                && is_emoji(label)
                && label.chars().count() <= config.weather_emoji_max_chars =>
            {
                info.weather_emoji = Some(label.to_string());
                info.weather = Some(value.to_string());
            }
            None => debug!(label, "unrecognized info box line"),
        }
    }

    info
}
