//! Card pool - reusable card slots cycled across levels.
//!
//! Cards live in a contiguous arena and are addressed by [`CardHandle`], a
//! stable index that stays valid for the lifetime of the pool. Free slots are
//! kept in a queue so `acquire`/`release` are O(1). `rewind` puts every slot
//! back in index order, so each new level reuses the same instances in the same
//! order.

use std::collections::VecDeque;

use tracing::warn;

use crate::card::Card;
use crate::ports::SpriteHandle;

/// Stable index of a card slot in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardHandle(pub usize);

impl CardHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    card: Card,
    active: bool,
}

#[derive(Debug, Clone)]
pub struct CardPool {
    slots: Vec<Slot>,
    free: VecDeque<usize>,
    capacity: usize,
}

impl CardPool {
    /// Pre-allocate `capacity` inactive cards.
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                card: Card::default(),
                active: false,
            })
            .collect();
        Self {
            slots,
            free: (0..capacity).collect(),
            capacity,
        }
    }

    /// Configured capacity (allocated slots may exceed it after overflow).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots allocated so far.
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Take the next free card, growing the pool (with a warning) if none is left.
    pub fn acquire(&mut self) -> CardHandle {
        let index = match self.free.pop_front() {
            Some(index) => index,
            None => {
                warn!(
                    allocated = self.slots.len(),
                    capacity = self.capacity,
                    "card pool exhausted, allocating a new card"
                );
                self.slots.push(Slot {
                    card: Card::default(),
                    active: false,
                });
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.active = true;
        slot.card.reset();
        CardHandle(index)
    }

    /// Deactivate and reset a card. Returns false for unknown or already free handles.
    ///
    /// Sprites are left on the card; take them first if they must be released.
    pub fn release(&mut self, handle: CardHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.0) else {
            return false;
        };
        if !slot.active {
            return false;
        }
        slot.active = false;
        slot.card.reset();
        self.free.push_back(handle.0);
        true
    }

    /// Release everything and restart the free queue at index 0.
    pub fn rewind(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
            slot.card.reset();
        }
        self.free.clear();
        self.free.extend(0..self.slots.len());
    }

    pub fn is_active(&self, handle: CardHandle) -> bool {
        self.slots.get(handle.0).is_some_and(|s| s.active)
    }

    /// Active card behind a handle.
    pub fn get(&self, handle: CardHandle) -> Option<&Card> {
        self.slots
            .get(handle.0)
            .filter(|s| s.active)
            .map(|s| &s.card)
    }

    pub fn get_mut(&mut self, handle: CardHandle) -> Option<&mut Card> {
        self.slots
            .get_mut(handle.0)
            .filter(|s| s.active)
            .map(|s| &mut s.card)
    }

    /// Detach every sprite handle held by any slot, active or not.
    pub fn drain_sprites(&mut self) -> Vec<SpriteHandle> {
        self.slots
            .iter_mut()
            .flat_map(|s| s.card.take_sprites())
            .flatten()
            .collect()
    }
}

impl Default for CardPool {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_POOL_CAPACITY)
    }
}
