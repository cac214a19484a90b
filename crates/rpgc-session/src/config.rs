//! Runtime configuration for a companion session.

use rpgc_parser::ParserConfig;

/// Placeholder the host replaces with the player's name.
pub const DEFAULT_USER_NAME: &str = "{{user}}";

/// Speaker name for assistant messages the session creates.
pub const DEFAULT_CHARACTER_NAME: &str = "Narrator";

/// Configuration for a companion session. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Player name used in prompts and the Stats header.
    pub user_name: String,
    /// Speaker name for assistant messages.
    pub character_name: String,
    /// Parser thresholds.
    pub parser: ParserConfig,
    /// RNG seed for dice. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            character_name: DEFAULT_CHARACTER_NAME.to_string(),
            parser: ParserConfig::default(),
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Set the player name. Blank names fall back to the placeholder.
    pub fn with_user_name(mut self, name: &str) -> Self {
        let name = name.trim();
        self.user_name = if name.is_empty() {
            DEFAULT_USER_NAME.to_string()
        } else {
            name.to_string()
        };
        self
    }

    /// Set the assistant speaker name.
    pub fn with_character_name(mut self, name: &str) -> Self {
        self.character_name = name.trim().to_string();
        self
    }

    /// Set the parser thresholds.
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Seed the dice RNG for reproducible rolls.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
