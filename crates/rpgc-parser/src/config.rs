//! Tunable thresholds for the heuristic parts of the parser.

/// Default upper bound on a mood label found by the line-scan fallback.
pub const DEFAULT_MOOD_LABEL_MAX_CHARS: usize = 10;

/// Default upper bound on a legacy weather-emoji label.
pub const DEFAULT_WEATHER_EMOJI_MAX_CHARS: usize = 5;

/// Configuration for the tracker parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// A `label: text` line whose label is at most this many characters is
    /// taken as a mood tag when no `Status:` or `Mood:` line exists.
    pub mood_label_max_chars: usize,
    /// An Info Box line whose label is an emoji of at most this many
    /// characters is taken as the legacy weather line.
    pub weather_emoji_max_chars: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            mood_label_max_chars: DEFAULT_MOOD_LABEL_MAX_CHARS,
            weather_emoji_max_chars: DEFAULT_WEATHER_EMOJI_MAX_CHARS,
        }
    }
}

impl ParserConfig {
    /// Set the mood-label threshold.
    pub fn with_mood_label_max_chars(mut self, max: usize) -> Self {
        self.mood_label_max_chars = max;
        self
    }

    /// Set the weather-emoji threshold (at least 1).
    pub fn with_weather_emoji_max_chars(mut self, max: usize) -> Self {
        self.weather_emoji_max_chars = max.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = ParserConfig::default();
        assert_eq!(cfg.mood_label_max_chars, 10);
        assert_eq!(cfg.weather_emoji_max_chars, 5);
    }

    #[test]
    fn builder_methods() {
        let cfg = ParserConfig::default()
            .with_mood_label_max_chars(4)
            .with_weather_emoji_max_chars(0);
        assert_eq!(cfg.mood_label_max_chars, 4);
        assert_eq!(cfg.weather_emoji_max_chars, 1);
    }
}
