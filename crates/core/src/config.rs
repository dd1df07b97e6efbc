//! Rule and level configuration.

use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::types::*;

/// Tunable scoring rules and delays. Defaults come from the `types` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub match_reward: u32,
    pub mismatch_penalty: u32,
    pub perfect_multiplier: u32,
    pub near_perfect_multiplier: u32,
    pub near_perfect_slack: u32,
    pub good_slack: u32,
    pub good_bonus: u32,
    pub fair_slack: u32,
    pub fair_bonus: u32,
    pub compare_delay_ms: u32,
    pub mismatch_delay_ms: u32,
    pub reveal_stagger_ms: u32,
    pub reveal_show_ms: u32,
    pub reveal_hold_ms: u32,
    pub reveal_hide_ms: u32,
    pub completion_step_ms: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            match_reward: MATCH_REWARD,
            mismatch_penalty: MISMATCH_PENALTY,
            perfect_multiplier: PERFECT_MULTIPLIER,
            near_perfect_multiplier: NEAR_PERFECT_MULTIPLIER,
            near_perfect_slack: NEAR_PERFECT_SLACK,
            good_slack: GOOD_SLACK,
            good_bonus: GOOD_BONUS,
            fair_slack: FAIR_SLACK,
            fair_bonus: FAIR_BONUS,
            compare_delay_ms: COMPARE_DELAY_MS,
            mismatch_delay_ms: MISMATCH_DELAY_MS,
            reveal_stagger_ms: REVEAL_STAGGER_MS,
            reveal_show_ms: REVEAL_SHOW_MS,
            reveal_hold_ms: REVEAL_HOLD_MS,
            reveal_hide_ms: REVEAL_HIDE_MS,
            completion_step_ms: COMPLETION_STEP_MS,
        }
    }
}

impl RuleSet {
    /// Same rules with every delay set to zero; continuations still run through the scheduler.
    pub fn instant() -> Self {
        Self {
            compare_delay_ms: 0,
            mismatch_delay_ms: 0,
            reveal_stagger_ms: 0,
            reveal_show_ms: 0,
            reveal_hold_ms: 0,
            reveal_hide_ms: 0,
            completion_step_ms: 0,
            ..Self::default()
        }
    }

    /// Length of the opening reveal cascade for `cards` cards.
    pub fn reveal_duration_ms(&self, cards: usize) -> u32 {
        let last_offset = self
            .reveal_stagger_ms
            .saturating_mul(cards.saturating_sub(1) as u32);
        last_offset + self.reveal_show_ms + self.reveal_hold_ms + self.reveal_hide_ms
    }
}

/// A validated grid size plus category choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelConfig {
    grid_size: usize,
    category: usize,
}

impl LevelConfig {
    /// Grid size must be even and at least 2. The category is checked against a catalog later.
    pub fn new(grid_size: usize, category: usize) -> Result<Self, LevelError> {
        if grid_size % 2 != 0 {
            return Err(LevelError::OddGridSize(grid_size));
        }
        if grid_size < 2 {
            return Err(LevelError::GridTooSmall(grid_size));
        }
        Ok(Self {
            grid_size,
            category,
        })
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn category(&self) -> usize {
        self.category
    }

    pub fn total_pairs(&self) -> u32 {
        (self.grid_size / 2) as u32
    }
}
