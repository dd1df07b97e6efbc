//! Cooperative scheduler - timed continuations on a single logical thread.
//!
//! Work that must happen "later" (judging a pair after the flip animation,
//! flipping a mismatch back, the reveal cascade) is queued here with a delay and
//! handed back by [`Scheduler::pop_due`] once enough time has been ticked.
//! Time is logical: a single large tick yields the same task order and timing
//! as many small ones.
//!
//! Every task is stamped with the epoch current at scheduling time. Bumping the
//! epoch (level restart, return to menu) invalidates everything queued before:
//! stale tasks are dropped when they come due instead of running against a
//! ledger that has since been reset.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

/// Generation counter for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Epoch(pub u64);

#[derive(Debug)]
struct Entry<T> {
    due_ms: u64,
    seq: u64,
    epoch: Epoch,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // Reversed: BinaryHeap is a max-heap, we want the earliest (due, seq) on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    horizon_ms: u64,
    next_seq: u64,
    epoch: Epoch,
    queue: BinaryHeap<Entry<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            horizon_ms: 0,
            next_seq: 0,
            epoch: Epoch::default(),
            queue: BinaryHeap::new(),
        }
    }

    /// Scheduler clock. While tasks are being drained this is the due time of
    /// the task just popped, so follow-ups are timed from when it was due.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Invalidate every task scheduled so far.
    pub fn bump_epoch(&mut self) -> Epoch {
        self.epoch = Epoch(self.epoch.0.wrapping_add(1));
        self.queue.clear();
        self.epoch
    }

    /// Queue `task` to come due `delay_ms` from now. Equal due times keep scheduling order.
    pub fn schedule(&mut self, delay_ms: u32, task: T) {
        self.schedule_in_epoch(delay_ms, self.epoch, task);
    }

    /// Queue a task stamped with an explicit epoch; it is dropped if that epoch is stale.
    pub fn schedule_in_epoch(&mut self, delay_ms: u32, epoch: Epoch, task: T) {
        self.next_seq += 1;
        self.queue.push(Entry {
            due_ms: self.now_ms + delay_ms as u64,
            seq: self.next_seq,
            epoch,
            task,
        });
    }

    /// Number of queued tasks (including not-yet-dropped stale ones).
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Let `elapsed_ms` more time pass. Due tasks are then drained with [`Scheduler::pop_due`].
    pub fn advance_clock(&mut self, elapsed_ms: u32) {
        self.horizon_ms += elapsed_ms as u64;
    }

    /// Pop the earliest task due by the current horizon, skipping stale ones.
    ///
    /// Drain until `None`: tasks scheduled by a popped task that fall inside
    /// the horizon come out of the same drain.
    pub fn pop_due(&mut self) -> Option<T> {
        loop {
            let due_ms = match self.queue.peek() {
                Some(head) if head.due_ms <= self.horizon_ms => head.due_ms,
                _ => {
                    self.now_ms = self.horizon_ms;
                    return None;
                }
            };
            let entry = self.queue.pop()?;
            self.now_ms = due_ms;
            if entry.epoch != self.epoch {
                debug!(
                    task_epoch = entry.epoch.0,
                    current_epoch = self.epoch.0,
                    "dropping stale continuation"
                );
                continue;
            }
            return Some(entry.task);
        }
    }

    /// Advance and collect every task that came due, earliest first.
    pub fn advance(&mut self, elapsed_ms: u32) -> Vec<T> {
        self.advance_clock(elapsed_ms);
        let mut due = Vec::new();
        while let Some(task) = self.pop_due() {
            due.push(task);
        }
        due
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
