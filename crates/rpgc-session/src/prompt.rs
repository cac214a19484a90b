//! Prompt text built from committed tracker data.
//!
//! Every builder here reads the committed snapshot and never the displayed
//! one. Swipes of the same turn therefore always see the same prior-turn
//! context, whatever the user has been looking at in between.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use rpgc_core::items::serialize_items;
use rpgc_core::{ExtensionSettings, TrackerSection};
use rpgc_parser::{extract_stats, parse_info_box, parse_present_characters, strip_tracker_blocks};

use crate::chat::ChatHistory;
use crate::config::SessionConfig;
use crate::state::SessionState;

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    /// System instruction.
    System,
    /// Player turn.
    User,
    /// Model turn.
    Assistant,
}

impl std::fmt::Display for PromptRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message of a chat-completion prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    /// Who is speaking.
    pub role: PromptRole,
    /// Message text.
    pub content: String,
}

impl PromptMessage {
    /// Build a message.
    pub fn new(role: PromptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Rich-media formatting addendum.
pub const HTML_PROMPT: &str = "When the scene calls for it, you may render in-world documents, \
screens, signs or letters with inline HTML and CSS. Do not use scripts or external resources.";

fn fence(text: &str) -> String {
    format!("```\n{text}\n```")
}

/// The committed sections, fenced one by one, for enabled sections only.
///
/// Returns `None` when no enabled section has committed text.
pub fn generate_tracker_example(state: &SessionState) -> Option<String> {
    let settings = state.settings();
    let committed = state.committed();
    let blocks: Vec<String> = settings
        .enabled_sections()
        .into_iter()
        .filter_map(|s| committed.get(s))
        .map(|text| fence(text.trim()))
        .collect();
    (!blocks.is_empty()).then(|| blocks.join("\n\n"))
}

fn stats_template(settings: &ExtensionSettings, user: &str) -> String {
    let mut out = format!(
        "{user}'s Stats\n---\n\
         Health: [0-100]%\n\
         Satiety: [0-100]%\n\
         Energy: [0-100]%\n\
         Hygiene: [0-100]%\n\
         Arousal: [0-100]%\n\
         [Mood emoji]: [Conditions, up to three short traits]"
    );
    if settings.show_inventory {
        let _ = write!(
            out,
            "\nOn Person: [Items {user} carries or wears, or None]\n\
             Stored - [Location]: [Items kept there, or None]\n\
             Assets: [Vehicles, property and other major possessions, or None]"
        );
    }
    if settings.show_quests {
        out.push_str(
            "\nMain Quest: [Current main objective, or None]\n\
             Optional Quests: [Side quests, comma-separated, or None]",
        );
    }
    out
}

const INFO_BOX_TEMPLATE: &str = "Info Box\n---\n\
Date: [Weekday, Month Day, Year]\n\
Weather: [Weather emoji] [Forecast]\n\
Temperature: [Temperature in °C]\n\
Time: [Start time] → [End time]\n\
Location: [Specific location]\n\
Recent Events: [One-line summary of what just happened]";

fn characters_template(user: &str) -> String {
    format!(
        "Present Characters\n---\n\
         [Emoji]: [Name, visible traits] | [Demeanor] | [Relationship to {user}] | 💭 [Internal thoughts]\n\
         (one line per character present, excluding {user})"
    )
}

/// The instruction text describing the tracker format.
pub fn generate_tracker_instructions(
    state: &SessionState,
    user_name: &str,
    include_html: bool,
    include_continuation: bool,
) -> String {
    let settings = state.settings();
    let mut out = String::from(
        "At the end of every reply, output the tracker blocks below, each in its own code \
         fence, updated to reflect the events of the reply. Keep every header and its --- \
         divider exactly as shown. Replace each [bracketed placeholder] with real content and \
         leave no brackets in the output.",
    );

    for section in settings.enabled_sections() {
        let template = match section {
            TrackerSection::Stats => stats_template(settings, user_name),
            TrackerSection::InfoBox => INFO_BOX_TEMPLATE.to_string(),
            TrackerSection::PresentCharacters => characters_template(user_name),
        };
        out.push_str("\n\n");
        out.push_str(&fence(&template));
    }

    if include_continuation {
        out.push_str("\n\nContinue the roleplay from where it left off, then append the updated tracker blocks.");
    }

    if let Some(roll) = &settings.last_dice_roll {
        let dice: Vec<String> = roll.rolls.iter().map(u32::to_string).collect();
        let _ = write!(
            out,
            "\n\n{user_name} rolled {} and got {} (dice: {}). {user_name}'s attributes: {} (level {}). \
             Narrate the outcome of {user_name}'s action according to this roll.",
            roll.formula,
            roll.total,
            dice.join(", "),
            settings.classic_stats.summary(),
            settings.level,
        );
    }

    if include_html {
        out.push_str("\n\n");
        out.push_str(HTML_PROMPT);
    }

    out
}

/// A condensed digest of the committed trackers, for separate mode.
///
/// Only fields that are actually present in the committed text are
/// mentioned. Returns an empty string when nothing is committed.
pub fn generate_contextual_summary(state: &SessionState, config: &SessionConfig) -> String {
    let settings = state.settings();
    let committed = state.committed();
    let user = &config.user_name;
    let mut lines = Vec::new();

    if let Some(text) = committed.get(TrackerSection::Stats).filter(|_| settings.show_user_stats) {
        let update = extract_stats(text, &config.parser);
        if !update.meters.is_empty() {
            let meters: Vec<String> = update
                .meters
                .iter()
                .map(|(m, v)| format!("{} {v}%", m.label()))
                .collect();
            lines.push(format!("{user}'s stats: {}.", meters.join(", ")));
        }
        if let Some((mood, conditions)) = &update.mood {
            lines.push(format!("Mood: {mood} ({conditions})."));
        }
        if let Some(inv) = update.inventory.as_ref().filter(|_| settings.show_inventory) {
            let mut parts = vec![format!("on person: {}", inv.on_person)];
            parts.extend(
                inv.stored
                    .iter()
                    .map(|(loc, items)| format!("stored at {loc}: {items}")),
            );
            parts.push(format!("assets: {}", inv.assets));
            lines.push(format!("Inventory: {}.", parts.join("; ")));
        }
        if settings.show_quests {
            if let Some(main) = &update.main_quest {
                lines.push(format!("Main quest: {main}."));
            }
            if let Some(optional) = &update.optional_quests {
                lines.push(format!("Optional quests: {}.", serialize_items(optional)));
            }
        }
    }

    if let Some(text) = committed.get(TrackerSection::InfoBox).filter(|_| settings.show_info_box) {
        let info = parse_info_box(text, &config.parser);
        let weather = match (&info.weather_emoji, &info.weather) {
            (Some(e), Some(w)) => Some(format!("{e} {w}")),
            (Some(x), None) | (None, Some(x)) => Some(x.clone()),
            (None, None) => None,
        };
        let scene: Vec<String> = [
            info.date.clone(),
            info.time.clone(),
            info.location.clone(),
            weather,
            info.temperature.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !scene.is_empty() {
            lines.push(format!("Scene: {}.", scene.join("; ")));
        }
        if let Some(events) = &info.recent_events {
            lines.push(format!("Recent events: {events}"));
        }
    }

    if let Some(text) = committed
        .get(TrackerSection::PresentCharacters)
        .filter(|_| settings.show_character_thoughts)
    {
        let characters = parse_present_characters(text);
        if !characters.is_empty() {
            lines.push("Present characters:".to_string());
            for c in characters {
                let mut line = format!("- {}", c.name);
                let details: Vec<&str> = [c.demeanor.as_str(), c.relationship.as_str()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect();
                if !details.is_empty() {
                    let _ = write!(line, " ({})", details.join(", "));
                }
                if !c.thoughts.is_empty() {
                    let _ = write!(line, ": {}", c.thoughts);
                }
                lines.push(line);
            }
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    format!("Current tracker context:\n{}", lines.join("\n"))
}

/// The instruction message for a dedicated tracker call.
pub fn generate_rpg_prompt_text(state: &SessionState, user_name: &str) -> String {
    let previous = generate_tracker_example(state).unwrap_or_else(|| "None yet.".to_string());
    format!(
        "Previous tracker state:\n{previous}\n\n{}\n\nRespond with the updated tracker blocks only, \
         with no narrative before or after them.",
        generate_tracker_instructions(state, user_name, false, false)
    )
}

/// The full message array for a dedicated tracker call: a system message,
/// the most recent chat messages, and the instruction message.
pub fn generate_separate_update_prompt(
    state: &SessionState,
    history: &dyn ChatHistory,
    config: &SessionConfig,
) -> Vec<PromptMessage> {
    let user = &config.user_name;
    let mut messages = vec![PromptMessage::new(
        PromptRole::System,
        format!(
            "You are a meticulous state tracker for an ongoing roleplay with {user}. Read the \
             recent conversation and report the current state of the trackers."
        ),
    )];

    let depth = state.settings().update_depth;
    for entry in history.recent_before(history.len(), depth) {
        let role = if entry.is_user {
            PromptRole::User
        } else {
            PromptRole::Assistant
        };
        messages.push(PromptMessage::new(
            role,
            format!("{}: {}", entry.name, strip_tracker_blocks(entry.text)),
        ));
    }

    messages.push(PromptMessage::new(
        PromptRole::User,
        generate_rpg_prompt_text(state, user),
    ));
    messages
}
