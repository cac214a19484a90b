//! Main and optional quest tracking.

use serde::{Deserialize, Serialize};

use crate::error::{CompanionError, CompanionResult};
use crate::items::NONE;

/// The active quests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quests {
    /// Title of the current main quest, or `"None"`.
    pub main: String,
    /// Titles of active optional quests.
    pub optional: Vec<String>,
}

impl Default for Quests {
    fn default() -> Self {
        Self {
            main: NONE.to_string(),
            optional: Vec::new(),
        }
    }
}

impl Quests {
    /// Set the main quest. Blank input clears it.
    pub fn set_main(&mut self, title: &str) {
        let title = title.trim();
        self.main = if title.is_empty() {
            NONE.to_string()
        } else {
            title.to_string()
        };
    }

    /// Add an optional quest.
    pub fn add_optional(&mut self, title: &str) -> CompanionResult<()> {
        let title = title.trim();
        if title.is_empty() || title.eq_ignore_ascii_case(NONE) {
            return Err(CompanionError::Empty("quest title"));
        }
        self.optional.push(title.to_string());
        Ok(())
    }

    /// Remove the optional quest at `index`.
    pub fn remove_optional(&mut self, index: usize) -> CompanionResult<String> {
        if index >= self.optional.len() {
            return Err(CompanionError::IndexOutOfRange {
                index,
                len: self.optional.len(),
            });
        }
        Ok(self.optional.remove(index))
    }
}
