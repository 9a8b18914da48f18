//! Idempotent daily quest generation
//!
//! The day's quest set is keyed by calendar day in the store. The first
//! generation for a day materializes the templates and persists them; every
//! later call, from any view, reads the persisted set back instead of
//! generating again, so all views agree on quest ids and deadlines.

use crate::error::Result;
use questline_core::daily::quests_for_day;
use questline_core::{Clock, Quest};
use questline_store::{keys, DurableStore};
use std::sync::Arc;

/// Generates, or reloads, the quest set for the current day
pub struct DailyQuestGenerator {
    store: Arc<dyn DurableStore>,
}

impl DailyQuestGenerator {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// The quest set for the clock's current day
    ///
    /// A malformed persisted set is logged and regenerated in place.
    pub fn generate(&self, clock: &dyn Clock) -> Result<Vec<Quest>> {
        let today = clock.today();
        let key = keys::daily(today);

        if let Some(bytes) = self.store.read(&key)? {
            match serde_json::from_slice::<Vec<Quest>>(&bytes) {
                Ok(quests) => return Ok(quests),
                Err(err) => {
                    tracing::warn!(%err, key, "regenerating malformed daily quest set");
                }
            }
        }

        let quests = quests_for_day(today, clock.now());
        let bytes = serde_json::to_vec(&quests)
            .map_err(|err| crate::error::Error::Codec(err.to_string()))?;
        self.store.write(&key, &bytes)?;
        Ok(quests)
    }
}
