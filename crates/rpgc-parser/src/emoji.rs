//! Emoji prefix detection.

use once_cell::sync::Lazy;
use regex::Regex;

/// One emoji "unit": a pictograph, skin-tone modifier, regional indicator,
/// zero-width joiner, variation selector, or keycap combiner.
const EMOJI_UNIT: &str = r"(?:\p{Extended_Pictographic}|\p{Emoji_Modifier}|[\x{1F1E6}-\x{1F1FF}]|\x{200D}|\x{FE0F}|\x{20E3})";

static EMOJI_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({EMOJI_UNIT}+)[,\s]+(.+)$")).expect("invalid emoji prefix regex")
});

static EMOJI_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^{EMOJI_UNIT}+$")).expect("invalid emoji-only regex"));

/// Split `"😊, Tired"` or `"😊 Tired"` into `("😊", "Tired")`.
///
/// Returns `None` when the text does not start with an emoji followed by a
/// separator and more text.
pub fn split_emoji_prefix(text: &str) -> Option<(&str, &str)> {
    let caps = EMOJI_PREFIX.captures(text.trim())?;
    let emoji = caps.get(1)?.as_str();
    let rest = caps.get(2)?.as_str().trim();
    if rest.is_empty() {
        return None;
    }
    Some((emoji, rest))
}

/// Whether `text` consists solely of emoji units.
pub fn is_emoji(text: &str) -> bool {
    EMOJI_ONLY.is_match(text.trim())
}

/// Drop variation selectors so `"🗓️"` compares equal to `"🗓"`.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .filter(|&c| c != '\u{FE0F}')
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_emoji_with_comma() {
        assert_eq!(split_emoji_prefix("😊, Tired"), Some(("😊", "Tired")));
    }

    #[test]
    fn splits_emoji_with_space() {
        assert_eq!(
            split_emoji_prefix("☀️ Sunny and warm"),
            Some(("☀️", "Sunny and warm"))
        );
    }

    #[test]
    fn zwj_sequence_kept_whole() {
        let (emoji, rest) = split_emoji_prefix("🧑‍🚀, Floating").unwrap();
        assert_eq!(emoji, "🧑‍🚀");
        assert_eq!(rest, "Floating");
    }

    #[test]
    fn plain_text_not_split() {
        assert_eq!(split_emoji_prefix("Happy, Tired"), None);
        assert_eq!(split_emoji_prefix("😊"), None);
    }

    #[test]
    fn emoji_only_detection() {
        assert!(is_emoji("😊"));
        assert!(is_emoji("🌧️"));
        assert!(!is_emoji("Rain"));
        assert!(!is_emoji("😊 ok"));
    }

    #[test]
    fn label_normalization() {
        assert_eq!(normalize_label("🗓️"), "🗓");
        assert_eq!(normalize_label(" Date "), "date");
    }
}
