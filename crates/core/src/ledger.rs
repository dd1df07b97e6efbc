//! Score ledger - score, bonus, turns and matches for the current level.
//!
//! Each mutation notifies its observers exactly once with the new value.

use tracing::warn;

use crate::scoring::apply_score_delta;
use crate::signal::Signal;

#[derive(Debug, Default)]
pub struct ScoreLedger {
    score: u32,
    bonus: u32,
    turns: u32,
    matches: u32,
    total_pairs: u32,
    pub on_score: Signal<u32>,
    pub on_bonus: Signal<u32>,
    pub on_turns: Signal<u32>,
    pub on_matches: Signal<u32>,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn bonus(&self) -> u32 {
        self.bonus
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    /// Upper bound for `matches` in the current level.
    pub fn total_pairs(&self) -> u32 {
        self.total_pairs
    }

    /// Zero all counters for a level with `total_pairs` pairs.
    pub fn reset(&mut self, total_pairs: u32) {
        self.score = 0;
        self.bonus = 0;
        self.turns = 0;
        self.matches = 0;
        self.total_pairs = total_pairs;
        self.on_score.emit(0);
        self.on_bonus.emit(0);
        self.on_turns.emit(0);
        self.on_matches.emit(0);
    }

    /// `score = max(0, score + amount)`
    pub fn apply_delta(&mut self, amount: i64) {
        self.score = apply_score_delta(self.score, amount);
        self.on_score.emit(self.score);
    }

    pub fn increment_turns(&mut self) {
        self.turns = self.turns.saturating_add(1);
        self.on_turns.emit(self.turns);
    }

    /// Refuses to count past the level's pair total.
    pub fn increment_matches(&mut self) -> bool {
        if self.matches >= self.total_pairs {
            warn!(
                matches = self.matches,
                total_pairs = self.total_pairs,
                "match count already at pair total"
            );
            return false;
        }
        self.matches += 1;
        self.on_matches.emit(self.matches);
        true
    }

    pub fn set_bonus(&mut self, bonus: u32) {
        self.bonus = bonus;
        self.on_bonus.emit(bonus);
    }

    /// Load persisted counters; matches are clamped to the pair total.
    pub fn restore(&mut self, total_pairs: u32, score: u32, turns: u32, matches: u32) {
        self.total_pairs = total_pairs;
        self.score = score;
        self.bonus = 0;
        self.turns = turns;
        self.matches = matches.min(total_pairs);
        self.on_score.emit(self.score);
        self.on_bonus.emit(self.bonus);
        self.on_turns.emit(self.turns);
        self.on_matches.emit(self.matches);
    }

    pub fn is_complete(&self) -> bool {
        self.total_pairs > 0 && self.matches >= self.total_pairs
    }
}
