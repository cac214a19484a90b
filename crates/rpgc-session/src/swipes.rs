//! Per-swipe tracker storage.
//!
//! The host keeps each assistant message's reply variants ("swipes") and an
//! `extra` bag of extension data. Tracker snapshots are stored in that bag
//! under [`SWIPES_KEY`], keyed by swipe index, so that navigating back to a
//! swipe restores the trackers it was generated with.

use serde_json::{Map, Value};
use tracing::warn;

use rpgc_core::TrackerSnapshot;

use crate::error::SessionResult;

/// Key of the swipe map inside a message's `extra` bag.
pub const SWIPES_KEY: &str = "rpg_companion_swipes";

/// Access to per-swipe tracker data on host messages.
pub trait SwipeRepository {
    /// The snapshot stored for a swipe, if any.
    fn swipe_data(&self, message: usize, swipe_id: usize) -> Option<TrackerSnapshot>;

    /// Store a snapshot for a swipe.
    fn set_swipe_data(
        &mut self,
        message: usize,
        swipe_id: usize,
        data: &TrackerSnapshot,
    ) -> SessionResult<()>;

    /// Whether the message already has reply text at this swipe index.
    ///
    /// Swiping to such a slot only navigates; swiping past the last slot
    /// generates a new reply.
    fn has_swipe_content(&self, message: usize, swipe_id: usize) -> bool;

    /// The swipe index currently selected on a message.
    fn current_swipe_id(&self, message: usize) -> Option<usize>;
}

/// Read the snapshot for `swipe_id` from a message's `extra` bag.
pub fn read_swipe_data(extra: &Map<String, Value>, swipe_id: usize) -> Option<TrackerSnapshot> {
    let entry = extra.get(SWIPES_KEY)?.get(swipe_id.to_string())?;
    match serde_json::from_value(entry.clone()) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(swipe_id, error = %e, "ignoring corrupt swipe data");
            None
        }
    }
}

/// Write the snapshot for `swipe_id` into a message's `extra` bag.
pub fn write_swipe_data(
    extra: &mut Map<String, Value>,
    swipe_id: usize,
    data: &TrackerSnapshot,
) -> SessionResult<()> {
    let value = serde_json::to_value(data)?;
    let swipes = extra
        .entry(SWIPES_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    if !swipes.is_object() {
        warn!("swipe map was not an object, replacing it");
        *swipes = Value::Object(Map::new());
    }
    if let Value::Object(map) = swipes {
        map.insert(swipe_id.to_string(), value);
    }
    Ok(())
}
