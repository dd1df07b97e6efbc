//! Typed access to the preference store.
//!
//! Wraps a [`PreferenceStore`] with the game's keys: the selected level, the
//! high score and the in-progress checkpoint.

use tracing::{debug, warn};

use crate::checkpoint::Checkpoint;
use crate::error::CheckpointError;
use crate::ports::PreferenceStore;
use crate::types::{GAME_STATE_KEY, HIGH_SCORE_KEY, SELECTED_CATEGORY_KEY, SELECTED_GRID_KEY};

pub struct Persistence<'a> {
    store: &'a mut dyn PreferenceStore,
}

impl<'a> Persistence<'a> {
    pub fn new(store: &'a mut dyn PreferenceStore) -> Self {
        Self { store }
    }

    pub fn save_selected_level(&mut self, grid_size: usize, category: usize) {
        self.store.set_int(SELECTED_GRID_KEY, grid_size as i64);
        self.store.set_int(SELECTED_CATEGORY_KEY, category as i64);
    }

    /// Stored `(grid_size, category)`; both keys must be present and non-negative.
    pub fn load_selected_level(&self) -> Option<(usize, usize)> {
        let grid = self.store.get_int(SELECTED_GRID_KEY)?;
        let category = self.store.get_int(SELECTED_CATEGORY_KEY)?;
        Some((usize::try_from(grid).ok()?, usize::try_from(category).ok()?))
    }

    pub fn delete_selected_level(&mut self) {
        self.store.delete_key(SELECTED_GRID_KEY);
        self.store.delete_key(SELECTED_CATEGORY_KEY);
    }

    /// Only overwrites when `score` beats the stored value. Returns whether it did.
    pub fn save_high_score(&mut self, score: u32) -> bool {
        if score <= self.load_high_score() {
            return false;
        }
        self.store.set_int(HIGH_SCORE_KEY, score as i64);
        true
    }

    pub fn load_high_score(&self) -> u32 {
        self.store
            .get_int(HIGH_SCORE_KEY)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0)
    }

    pub fn delete_high_score(&mut self) {
        self.store.delete_key(HIGH_SCORE_KEY);
    }

    pub fn has_checkpoint(&self) -> bool {
        self.store.has_key(GAME_STATE_KEY)
    }

    pub fn save_checkpoint(&mut self, checkpoint: &Checkpoint) {
        match checkpoint.to_json() {
            Ok(json) => {
                self.store.set_string(GAME_STATE_KEY, &json);
                debug!(
                    score = checkpoint.score,
                    matches = checkpoint.matches,
                    "checkpoint saved"
                );
            }
            Err(err) => warn!(error = %err, "failed to encode checkpoint"),
        }
    }

    /// Load and validate the checkpoint for a level of `grid_size` cards.
    ///
    /// `Ok(None)` when nothing is stored.
    pub fn load_checkpoint(&self, grid_size: usize) -> Result<Option<Checkpoint>, CheckpointError> {
        let Some(json) = self.store.get_string(GAME_STATE_KEY) else {
            return Ok(None);
        };
        let checkpoint = Checkpoint::from_json(&json)?;
        checkpoint.validate(grid_size)?;
        Ok(Some(checkpoint))
    }

    pub fn clear_checkpoint(&mut self) {
        self.store.delete_key(GAME_STATE_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{CardRecord, CHECKPOINT_VERSION};
    use crate::ports::MemoryStore;

    #[test]
    fn high_score_only_increases() {
        let mut store = MemoryStore::new();
        let mut p = Persistence::new(&mut store);
        assert_eq!(p.load_high_score(), 0);
        assert!(p.save_high_score(500));
        assert!(!p.save_high_score(300));
        assert!(!p.save_high_score(500));
        assert_eq!(p.load_high_score(), 500);
        assert!(p.save_high_score(501));
        p.delete_high_score();
        assert_eq!(p.load_high_score(), 0);
    }

    #[test]
    fn selected_level_needs_both_keys() {
        let mut store = MemoryStore::new();
        store.set_int(SELECTED_GRID_KEY, 16);
        {
            let p = Persistence::new(&mut store);
            assert_eq!(p.load_selected_level(), None);
        }
        let mut p = Persistence::new(&mut store);
        p.save_selected_level(12, 1);
        assert_eq!(p.load_selected_level(), Some((12, 1)));
        p.delete_selected_level();
        assert_eq!(p.load_selected_level(), None);
    }

    #[test]
    fn checkpoint_save_load_clear() {
        let mut store = MemoryStore::new();
        let mut p = Persistence::new(&mut store);
        assert!(!p.has_checkpoint());
        assert!(p.load_checkpoint(2).unwrap().is_none());

        let cp = Checkpoint {
            version: CHECKPOINT_VERSION,
            cards: vec![
                CardRecord {
                    card_id: 0,
                    face_up: false,
                    matched: false,
                },
                CardRecord {
                    card_id: 0,
                    face_up: false,
                    matched: false,
                },
            ],
            score: 0,
            timer: 1.5,
            turns: 0,
            matches: 0,
        };
        p.save_checkpoint(&cp);
        assert!(p.has_checkpoint());
        assert_eq!(p.load_checkpoint(2).unwrap(), Some(cp));
        assert!(p.load_checkpoint(4).is_err());

        p.clear_checkpoint();
        assert!(!p.has_checkpoint());
    }

    #[test]
    fn corrupt_checkpoint_is_an_error() {
        let mut store = MemoryStore::new();
        store.set_string(GAME_STATE_KEY, "garbage");
        let p = Persistence::new(&mut store);
        assert!(matches!(p.load_checkpoint(4), Err(CheckpointError::Decode(_))));
    }
}
