//! Scoring module - per-comparison deltas and the end-of-level bonus.
//!
//! The completion bonus is a step function over how many turns above the
//! minimum the player needed:
//!
//! | Turns | Bonus |
//! |-------|-------|
//! | `== pairs` | `adjusted_base * perfect_multiplier` |
//! | `<= pairs + near_perfect_slack` | `adjusted_base * near_perfect_multiplier` |
//! | `<= pairs + good_slack` | `good_bonus` |
//! | `<= pairs + fair_slack` | `fair_bonus` |
//! | otherwise | 0 |
//!
//! where `adjusted_base = max(0, matches * match_reward - floor(elapsed))`.

use crate::config::RuleSet;

/// Which bonus step a finished level landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusTier {
    Perfect,
    NearPerfect,
    Good,
    Fair,
    None,
}

/// Completion bonus breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusResult {
    pub tier: BonusTier,
    /// Match points minus whole elapsed seconds, floored at 0.
    pub adjusted_base: u32,
    pub bonus: u32,
}

/// Apply a signed delta to a score, flooring at 0.
pub fn apply_score_delta(score: u32, delta: i64) -> u32 {
    (score as i64)
        .saturating_add(delta)
        .clamp(0, u32::MAX as i64) as u32
}

/// Signed delta for one judged pair.
pub fn comparison_delta(rules: &RuleSet, matched: bool) -> i64 {
    if matched {
        rules.match_reward as i64
    } else {
        -(rules.mismatch_penalty as i64)
    }
}

/// Classify the number of turns taken for a level with `total_pairs` pairs.
///
/// Only an exact `turns == total_pairs` earns the top tier.
pub fn bonus_tier(rules: &RuleSet, total_pairs: u32, turns: u32) -> BonusTier {
    if turns == total_pairs {
        BonusTier::Perfect
    } else if turns <= total_pairs.saturating_add(rules.near_perfect_slack) {
        BonusTier::NearPerfect
    } else if turns <= total_pairs.saturating_add(rules.good_slack) {
        BonusTier::Good
    } else if turns <= total_pairs.saturating_add(rules.fair_slack) {
        BonusTier::Fair
    } else {
        BonusTier::None
    }
}

/// Calculate the completion bonus.
///
/// `elapsed_whole_secs` is the floor of the level timer.
pub fn calculate_completion_bonus(
    rules: &RuleSet,
    total_pairs: u32,
    turns: u32,
    matches: u32,
    elapsed_whole_secs: u32,
) -> BonusResult {
    let match_score = matches.saturating_mul(rules.match_reward);
    let adjusted_base = match_score.saturating_sub(elapsed_whole_secs);
    let tier = bonus_tier(rules, total_pairs, turns);

    let bonus = match tier {
        BonusTier::Perfect => adjusted_base.saturating_mul(rules.perfect_multiplier),
        BonusTier::NearPerfect => adjusted_base.saturating_mul(rules.near_perfect_multiplier),
        BonusTier::Good => rules.good_bonus,
        BonusTier::Fair => rules.fair_bonus,
        BonusTier::None => 0,
    };

    BonusResult {
        tier,
        adjusted_base,
        bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_delta_floors_at_zero() {
        assert_eq!(apply_score_delta(0, -10), 0);
        assert_eq!(apply_score_delta(5, -10), 0);
        assert_eq!(apply_score_delta(100, -10), 90);
        assert_eq!(apply_score_delta(100, 100), 200);
        assert_eq!(apply_score_delta(u32::MAX, 1), u32::MAX);
    }

    #[test]
    fn test_comparison_delta() {
        let rules = RuleSet::default();
        assert_eq!(comparison_delta(&rules, true), 100);
        assert_eq!(comparison_delta(&rules, false), -10);
    }

    #[test]
    fn test_bonus_tiers_eight_pairs() {
        let rules = RuleSet::default();
        assert_eq!(bonus_tier(&rules, 8, 8), BonusTier::Perfect);
        assert_eq!(bonus_tier(&rules, 8, 9), BonusTier::NearPerfect);
        assert_eq!(bonus_tier(&rules, 8, 10), BonusTier::NearPerfect);
        assert_eq!(bonus_tier(&rules, 8, 11), BonusTier::Good);
        assert_eq!(bonus_tier(&rules, 8, 12), BonusTier::Good);
        assert_eq!(bonus_tier(&rules, 8, 13), BonusTier::Fair);
        assert_eq!(bonus_tier(&rules, 8, 14), BonusTier::Fair);
        assert_eq!(bonus_tier(&rules, 8, 15), BonusTier::None);
        assert_eq!(bonus_tier(&rules, 8, 40), BonusTier::None);
    }

    #[test]
    fn test_bonus_amounts() {
        let rules = RuleSet::default();

        // 8 pairs, 30s: 800 - 30 = 770
        let perfect = calculate_completion_bonus(&rules, 8, 8, 8, 30);
        assert_eq!(perfect.adjusted_base, 770);
        assert_eq!(perfect.bonus, 3080);

        assert_eq!(calculate_completion_bonus(&rules, 8, 10, 8, 30).bonus, 1540);
        assert_eq!(calculate_completion_bonus(&rules, 8, 11, 8, 30).bonus, 100);
        assert_eq!(calculate_completion_bonus(&rules, 8, 14, 8, 30).bonus, 50);
        assert_eq!(calculate_completion_bonus(&rules, 8, 15, 8, 30).bonus, 0);
    }

    #[test]
    fn test_slow_game_floors_adjusted_base() {
        let rules = RuleSet::default();
        let result = calculate_completion_bonus(&rules, 2, 2, 2, 900);
        assert_eq!(result.adjusted_base, 0);
        assert_eq!(result.bonus, 0);
        assert_eq!(result.tier, BonusTier::Perfect);
    }

    #[test]
    fn test_turns_below_pairs_is_not_perfect() {
        // Cannot happen in play, but the top tier needs exact equality.
        let rules = RuleSet::default();
        assert_eq!(bonus_tier(&rules, 8, 7), BonusTier::NearPerfect);
    }

    #[test]
    fn test_custom_rules() {
        let rules = RuleSet {
            match_reward: 50,
            perfect_multiplier: 3,
            ..RuleSet::default()
        };
        let result = calculate_completion_bonus(&rules, 2, 2, 2, 0);
        assert_eq!(result.bonus, 300);
    }
}
