//! Perfect-memory player used by the autoplay runner.
//!
//! The bot only learns a card's id once it has seen the card face-up, and it
//! never forgets. With a known pair on the table it takes it; otherwise it
//! turns over the first card it has not seen yet.

use std::collections::BTreeMap;

use concentration_core::types::CardId;
use concentration_core::Game;

#[derive(Debug, Default)]
pub struct MemoryBot {
    // Layout slot -> id, for unmatched cards seen face-up.
    seen: BTreeMap<usize, CardId>,
}

impl MemoryBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything (new level).
    pub fn reset(&mut self) {
        self.seen.clear();
    }

    pub fn known(&self) -> usize {
        self.seen.len()
    }

    /// Record every face-up card and drop matched ones.
    pub fn observe(&mut self, game: &Game) {
        for slot in 0..game.card_count() {
            let Some(card) = game.card(slot) else {
                continue;
            };
            if card.is_matched() {
                self.seen.remove(&slot);
            } else if card.is_face_up() {
                self.seen.insert(slot, card.id());
            }
        }
    }

    /// Slot to select next, if the game currently accepts a selection.
    pub fn next_slot(&self, game: &Game) -> Option<usize> {
        if !game.accepts_selection() {
            return None;
        }
        let selectable = |slot: usize| game.card(slot).is_some_and(|c| c.is_selectable());

        // Waiting card: flipped but not yet part of a comparison.
        let waiting = game.coordinator().pending().first().and_then(|&handle| {
            game.session().layout().iter().position(|&h| h == handle)
        });

        if let Some(first) = waiting {
            let id = self.seen.get(&first).copied();
            let partner = self
                .seen
                .iter()
                .find(|&(&slot, &other)| slot != first && Some(other) == id && selectable(slot))
                .map(|(&slot, _)| slot);
            return partner.or_else(|| self.first_unseen(game));
        }

        self.known_pair(&selectable)
            .or_else(|| self.first_unseen(game))
            .or_else(|| (0..game.card_count()).find(|&slot| selectable(slot)))
    }

    fn known_pair(&self, selectable: &impl Fn(usize) -> bool) -> Option<usize> {
        let mut by_id: BTreeMap<CardId, usize> = BTreeMap::new();
        for (&slot, &id) in &self.seen {
            if !selectable(slot) {
                continue;
            }
            if by_id.insert(id, slot).is_some() {
                return Some(slot);
            }
        }
        None
    }

    fn first_unseen(&self, game: &Game) -> Option<usize> {
        (0..game.card_count()).find(|slot| {
            !self.seen.contains_key(slot) && game.card(*slot).is_some_and(|c| c.is_selectable())
        })
    }
}
