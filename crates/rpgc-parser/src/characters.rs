//! Records from the Present Characters section.

use serde::{Deserialize, Serialize};

use crate::matcher::CHARACTER_HEADERS;

/// One character line: `Emoji: Name, traits | demeanor | relationship | thoughts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentCharacter {
    /// Emoji or short tag before the colon.
    pub emoji: String,
    /// Character name.
    pub name: String,
    /// Physical or personality traits following the name.
    pub traits: String,
    /// Current demeanor.
    pub demeanor: String,
    /// Relationship to the player.
    pub relationship: String,
    /// Internal thoughts.
    pub thoughts: String,
}

fn strip_thoughts_label(text: &str) -> &str {
    let text = text.trim().trim_start_matches('💭').trim_start();
    match text.split_once(':') {
        Some((label, rest)) if label.trim().eq_ignore_ascii_case("thoughts") => rest.trim(),
        _ => text,
    }
}

fn parse_line(line: &str) -> Option<PresentCharacter> {
    let line = line.trim().trim_start_matches(['-', '*']).trim();
    if !line.contains(" | ") {
        return None;
    }
    let mut fields = line.split('|').map(str::trim);
    let (emoji, identity) = fields.next()?.split_once(':')?;
    let (name, traits) = identity.split_once(',').unwrap_or((identity, ""));

    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let demeanor = fields.next().unwrap_or_default();
    let relationship = fields.next().unwrap_or_default();
    let rest: Vec<&str> = fields.collect();

    Some(PresentCharacter {
        emoji: emoji.trim().to_string(),
        name: name.to_string(),
        traits: traits.trim().to_string(),
        demeanor: demeanor.to_string(),
        relationship: relationship.to_string(),
        thoughts: strip_thoughts_label(&rest.join(" | ")).to_string(),
    })
}

/// Parse every character line in a Present Characters section.
///
/// Header, divider and malformed lines are skipped.
pub fn parse_present_characters(text: &str) -> Vec<PresentCharacter> {
    text.lines()
        .filter(|line| {
            let l = line.trim();
            !CHARACTER_HEADERS.iter().any(|h| l.eq_ignore_ascii_case(h))
        })
        .filter_map(parse_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_line() {
        let text = "Present Characters\n---\n😊: Elena, tall, red cloak | Cheerful | Friend | 💭 I hope they stay.";
        let chars = parse_present_characters(text);
        assert_eq!(chars.len(), 1);
        let elena = &chars[0];
        assert_eq!(elena.emoji, "😊");
        assert_eq!(elena.name, "Elena");
        assert_eq!(elena.traits, "tall, red cloak");
        assert_eq!(elena.demeanor, "Cheerful");
        assert_eq!(elena.relationship, "Friend");
        assert_eq!(elena.thoughts, "I hope they stay.");
    }

    #[test]
    fn thoughts_label_stripped() {
        let chars = parse_present_characters("😠: Brom | Gruff | Rival | Thoughts: Not again.");
        assert_eq!(chars[0].name, "Brom");
        assert_eq!(chars[0].traits, "");
        assert_eq!(chars[0].thoughts, "Not again.");
    }

    #[test]
    fn multiple_and_malformed_lines() {
        let text = "Characters\n---\n🙂: Ana | Calm | Ally | 💭 Fine\nJust narration here.\n: | x\n🤔: Ben | Wary | Stranger | 💭 Who?";
        let names: Vec<_> = parse_present_characters(text)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Ben"]);
    }

    #[test]
    fn short_line_fills_what_exists() {
        let chars = parse_present_characters("👤: Guard | Bored");
        assert_eq!(chars[0].demeanor, "Bored");
        assert_eq!(chars[0].relationship, "");
        assert_eq!(chars[0].thoughts, "");
    }
}
