//! Dice formulas and roll results.
//!
//! Supports `NdS`, `dS`, and `NdS+M` / `NdS-M` formulas. A roll result is
//! held as pending until the player saves it, after which the prompt builder
//! recaps it for the next generation.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CompanionError, CompanionResult};

/// Most dice allowed in one formula.
pub const MAX_DICE: u32 = 100;
/// Most sides allowed on one die.
pub const MAX_SIDES: u32 = 1000;
/// Largest flat modifier allowed, in either direction.
pub const MAX_MODIFIER: i64 = 10_000;

/// A parsed dice formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceFormula {
    /// Number of dice.
    pub count: u32,
    /// Sides per die.
    pub sides: u32,
    /// Flat modifier added to the sum.
    pub modifier: i64,
}

impl DiceFormula {
    /// Parse a formula like `"2d6+3"`, `"d20"`, or `"1d100 - 5"`.
    pub fn parse(input: &str) -> CompanionResult<Self> {
        let invalid = || CompanionError::InvalidFormula(input.to_string());
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        let (count_str, rest) = compact.split_once('d').ok_or_else(invalid)?;
        let count = if count_str.is_empty() {
            1
        } else {
            count_str.parse::<u32>().map_err(|_| invalid())?
        };

        let (sides_str, modifier) = match rest.find(['+', '-']) {
            Some(pos) => {
                let (sides, m) = rest.split_at(pos);
                (sides, m.parse::<i64>().map_err(|_| invalid())?)
            }
            None => (rest, 0),
        };
        let sides = sides_str.parse::<u32>().map_err(|_| invalid())?;

        if !(1..=MAX_DICE).contains(&count)
            || !(2..=MAX_SIDES).contains(&sides)
            || !(-MAX_MODIFIER..=MAX_MODIFIER).contains(&modifier)
        {
            return Err(invalid());
        }

        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    /// Roll every die and total the result.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.random_range(1..=self.sides))
            .collect();
        let sum: i64 = rolls.iter().map(|&v| i64::from(v)).sum();
        DiceRoll {
            formula: self.to_string(),
            total: sum + self.modifier,
            rolls,
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

/// The outcome of one dice roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// The formula that was rolled, normalized (e.g. `1d20+2`).
    pub formula: String,
    /// Sum of all dice plus the modifier.
    pub total: i64,
    /// Individual die values.
    pub rolls: Vec<u32>,
    /// When the roll happened.
    pub timestamp: DateTime<Utc>,
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.rolls.iter().map(|v| v.to_string()).collect();
        write!(f, "{}: [{}] = {}", self.formula, values.join(", "), self.total)
    }
}
