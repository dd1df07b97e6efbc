//! Minimal signal/slot for state-change notifications.
//!
//! Emission is synchronous and immediate: every connected slot runs once per
//! `emit`, in connection order, before `emit` returns.

use std::fmt;

/// Token returned by [`Signal::connect`], used to disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

pub struct Signal<T> {
    slots: Vec<(SlotId, Box<dyn FnMut(T)>)>,
    next_id: u64,
}

impl<T: Copy> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            next_id: 0,
        }
    }

    pub fn connect(&mut self, slot: impl FnMut(T) + 'static) -> SlotId {
        self.next_id += 1;
        let id = SlotId(self.next_id);
        self.slots.push((id, Box::new(slot)));
        id
    }

    pub fn disconnect(&mut self, id: SlotId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|(slot_id, _)| *slot_id != id);
        self.slots.len() != before
    }

    pub fn emit(&mut self, value: T) {
        for (_, slot) in &mut self.slots {
            slot(value);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Copy> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.len())
            .finish()
    }
}
