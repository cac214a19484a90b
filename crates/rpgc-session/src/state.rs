//! The in-memory state store.
//!
//! One `SessionState` holds everything a chat session mutates: settings, the
//! displayed tracker snapshot, the committed snapshot fed back to the model,
//! and the transient flags that drive reconciliation.

use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};

use rpgc_core::security::is_reserved_key;
use rpgc_core::{DiceFormula, DiceRoll, ExtensionSettings, TrackerSnapshot};

use crate::edit::{StatsEdit, apply_edit, build_user_stats_text};
use crate::error::{SessionError, SessionResult};

/// Settings, tracker snapshots, and reconciliation flags for one chat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    settings: ExtensionSettings,
    last_generated: TrackerSnapshot,
    committed: TrackerSnapshot,
    is_generating: bool,
    last_action_was_swipe: bool,
    is_plot_progression: bool,
    pending_dice_roll: Option<DiceRoll>,
}

impl SessionState {
    /// Create a state with the given settings and empty snapshots.
    pub fn new(settings: ExtensionSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &ExtensionSettings {
        &self.settings
    }

    /// Mutable settings, for field-level changes.
    pub fn settings_mut(&mut self) -> &mut ExtensionSettings {
        &mut self.settings
    }

    /// Replace the settings wholesale (chat-switch load).
    pub fn set_settings(&mut self, settings: ExtensionSettings) {
        self.settings = settings;
    }

    /// Shallow-merge a settings fragment: top-level keys present in
    /// `fragment` replace the current values, everything else is kept.
    pub fn update_settings(&mut self, fragment: &Value) -> SessionResult<()> {
        let Value::Object(fields) = fragment else {
            return Err(SessionError::InvalidInput(
                "settings fragment must be an object".to_string(),
            ));
        };
        let mut current = serde_json::to_value(&self.settings)?;
        if let Value::Object(map) = &mut current {
            for (key, value) in fields {
                if is_reserved_key(key) {
                    debug!(key = %key, "ignoring reserved settings key");
                    continue;
                }
                map.insert(key.clone(), value.clone());
            }
        }
        self.settings = serde_json::from_value(current)?;
        Ok(())
    }

    /// The snapshot currently displayed.
    pub fn last_generated(&self) -> &TrackerSnapshot {
        &self.last_generated
    }

    /// Replace the displayed snapshot.
    pub fn set_last_generated(&mut self, snapshot: TrackerSnapshot) {
        self.last_generated = snapshot;
    }

    /// Merge present sections into the displayed snapshot.
    pub fn update_last_generated(&mut self, snapshot: &TrackerSnapshot) {
        self.last_generated.merge_from(snapshot);
    }

    /// The snapshot fed to the model as prior-turn context.
    pub fn committed(&self) -> &TrackerSnapshot {
        &self.committed
    }

    /// Replace the committed snapshot (chat-switch load).
    pub fn set_committed(&mut self, snapshot: TrackerSnapshot) {
        self.committed = snapshot;
    }

    /// Copy the displayed snapshot into the committed one.
    pub fn commit(&mut self) {
        self.committed = self.last_generated.clone();
        info!("committed displayed tracker data");
    }

    /// Whether a dedicated tracker call is in flight.
    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    /// Set the dedicated-call guard.
    pub fn set_generating(&mut self, generating: bool) {
        self.is_generating = generating;
    }

    /// Whether the pending generation re-rolls an existing turn.
    pub fn last_action_was_swipe(&self) -> bool {
        self.last_action_was_swipe
    }

    /// Set the swipe flag.
    pub fn set_last_action_was_swipe(&mut self, swipe: bool) {
        self.last_action_was_swipe = swipe;
    }

    /// Whether an out-of-band plot nudge is generating.
    pub fn is_plot_progression(&self) -> bool {
        self.is_plot_progression
    }

    /// Set the plot-progression flag.
    pub fn set_plot_progression(&mut self, on: bool) {
        self.is_plot_progression = on;
    }

    /// The unsaved dice roll, if any.
    pub fn pending_dice_roll(&self) -> Option<&DiceRoll> {
        self.pending_dice_roll.as_ref()
    }

    /// Roll a formula and hold the result as pending.
    pub fn roll_dice<R: Rng + ?Sized>(
        &mut self,
        formula: &str,
        rng: &mut R,
    ) -> SessionResult<&DiceRoll> {
        let formula = DiceFormula::parse(formula)?;
        let roll = formula.roll(rng);
        debug!(roll = %roll, "dice rolled");
        Ok(self.pending_dice_roll.insert(roll))
    }

    /// Save the pending roll so the next prompt recaps it.
    pub fn commit_dice_roll(&mut self) -> SessionResult<DiceRoll> {
        let roll = self
            .pending_dice_roll
            .take()
            .ok_or(SessionError::NoPendingRoll)?;
        self.settings.last_dice_roll = Some(roll.clone());
        Ok(roll)
    }

    /// Apply a manual stats edit.
    ///
    /// The edited values go into settings, and the regenerated Stats text
    /// replaces the Stats section of both the displayed and the committed
    /// snapshot. Returns that text.
    pub fn apply_stats_edit(&mut self, edit: &StatsEdit, user_name: &str) -> SessionResult<String> {
        let (stats, quests) = apply_edit(&self.settings.user_stats, &self.settings.quests, edit)?;
        let text = build_user_stats_text(&stats, &quests, user_name, &self.settings);
        self.settings.user_stats = stats;
        self.settings.quests = quests;
        self.last_generated.user_stats = Some(text.clone());
        self.committed.user_stats = Some(text.clone());
        Ok(text)
    }
}
