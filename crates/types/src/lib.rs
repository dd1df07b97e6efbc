//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, persistence, the autoplay runner).
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MATCH_REWARD` | 100 | Points for a matching pair |
//! | `MISMATCH_PENALTY` | 10 | Points removed for a mismatch (score floors at 0) |
//! | `PERFECT_MULTIPLIER` | 4 | Bonus multiplier when turns == pairs |
//! | `NEAR_PERFECT_MULTIPLIER` | 2 | Bonus multiplier within `NEAR_PERFECT_SLACK` extra turns |
//! | `GOOD_BONUS` | 100 | Flat bonus within `GOOD_SLACK` extra turns |
//! | `FAIR_BONUS` | 50 | Flat bonus within `FAIR_SLACK` extra turns |
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `COMPARE_DELAY_MS` | 500 | Flip animation window before a pair is judged |
//! | `MISMATCH_DELAY_MS` | 1000 | Mismatch feedback window before cards flip back |
//! | `REVEAL_STAGGER_MS` | 100 | Per-card offset of the opening reveal cascade |
//! | `REVEAL_SHOW_MS` | 500 | Show -> flip front |
//! | `REVEAL_HOLD_MS` | 1500 | Flip front -> flip back |
//! | `REVEAL_HIDE_MS` | 500 | Flip back -> card ready |
//! | `COMPLETION_STEP_MS` | 500 | Each step of the level-complete sequence |
//!
//! # Examples
//!
//! ```
//! use concentration_types::{AnimationTrigger, AudioCue, GameAction};
//!
//! assert_eq!(AnimationTrigger::from_str("flipFrontSide"), Some(AnimationTrigger::FlipFront));
//! assert_eq!(AudioCue::Match.as_str(), "match");
//! assert_eq!(GameAction::from_str("select:3"), Some(GameAction::Select(3)));
//! ```

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Delay between the second flip and the match judgement.
pub const COMPARE_DELAY_MS: u32 = 500;

/// Delay between mismatch feedback and flipping both cards back.
pub const MISMATCH_DELAY_MS: u32 = 1000;

/// Start offset between consecutive cards in the opening reveal cascade.
pub const REVEAL_STAGGER_MS: u32 = 100;

/// Time a card is shown before it flips to its face.
pub const REVEAL_SHOW_MS: u32 = 500;

/// Time a card stays face-up during the opening reveal.
pub const REVEAL_HOLD_MS: u32 = 1500;

/// Time after the reveal flip-back before the card counts as ready.
pub const REVEAL_HIDE_MS: u32 = 500;

/// Length of each step in the level-complete sequence.
pub const COMPLETION_STEP_MS: u32 = 500;

/// Points awarded for a matching pair.
pub const MATCH_REWARD: u32 = 100;

/// Points removed for a mismatched pair.
pub const MISMATCH_PENALTY: u32 = 10;

/// Bonus multiplier for a perfect game (turns == pairs).
pub const PERFECT_MULTIPLIER: u32 = 4;

/// Bonus multiplier for a near-perfect game.
pub const NEAR_PERFECT_MULTIPLIER: u32 = 2;

/// Extra turns allowed for the near-perfect tier.
pub const NEAR_PERFECT_SLACK: u32 = 2;

/// Extra turns allowed for the flat "good" tier.
pub const GOOD_SLACK: u32 = 4;

/// Flat bonus of the "good" tier.
pub const GOOD_BONUS: u32 = 100;

/// Extra turns allowed for the flat "fair" tier.
pub const FAIR_SLACK: u32 = 6;

/// Flat bonus of the "fair" tier.
pub const FAIR_BONUS: u32 = 50;

/// Number of cards allocated up front by the card pool.
pub const DEFAULT_POOL_CAPACITY: usize = 60;

/// Preference key: last selected grid size.
pub const SELECTED_GRID_KEY: &str = "SelectedGridType";

/// Preference key: last selected card category.
pub const SELECTED_CATEGORY_KEY: &str = "SelectedCategoryType";

/// Preference key: best final score.
pub const HIGH_SCORE_KEY: &str = "HighScore";

/// Preference key: in-progress level checkpoint blob.
pub const GAME_STATE_KEY: &str = "GameState";


/// Pairing key of a card. Exactly two cards share an id within a level.
pub type CardId = u32;

/// Feedback sounds the engine asks the audio collaborator to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    Flip,
    Match,
    Mismatch,
    LevelComplete,
}

impl AudioCue {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCue::Flip => "flip",
            AudioCue::Match => "match",
            AudioCue::Mismatch => "mismatch",
            AudioCue::LevelComplete => "levelComplete",
        }
    }
}

/// Animation triggers sent to the visual driver for a single card.
///
/// The driver is fire-and-forget: the engine never waits on an animation,
/// it relies on the fixed delays above instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationTrigger {
    /// Intro "appear" animation of the reveal cascade
    Show,
    FlipFront,
    FlipBack,
    Match,
    Mismatch,
}

impl AnimationTrigger {
    /// Parse a trigger name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use concentration_types::AnimationTrigger;
    ///
    /// assert_eq!(AnimationTrigger::from_str("ShowCard"), Some(AnimationTrigger::Show));
    /// assert_eq!(AnimationTrigger::from_str("mismatch"), Some(AnimationTrigger::Mismatch));
    /// assert_eq!(AnimationTrigger::from_str("spin"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "showcard" => Some(AnimationTrigger::Show),
            "flipfrontside" => Some(AnimationTrigger::FlipFront),
            "flipbackside" => Some(AnimationTrigger::FlipBack),
            "match" => Some(AnimationTrigger::Match),
            "mismatch" => Some(AnimationTrigger::Mismatch),
            _ => None,
        }
    }

    /// Trigger name as understood by the visual driver
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationTrigger::Show => "ShowCard",
            AnimationTrigger::FlipFront => "FlipFrontSide",
            AnimationTrigger::FlipBack => "FlipBackSide",
            AnimationTrigger::Match => "Match",
            AnimationTrigger::Mismatch => "Mismatch",
        }
    }
}

/// Player-facing actions accepted by the game.
///
/// `Select` carries the layout slot of the card (0-based, row-major).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Select the card in the given layout slot
    Select(usize),
    /// Regenerate the current level from scratch
    Restart,
    /// Tear down the level and go back to the menu
    Menu,
    /// Resume the saved checkpoint
    Resume,
    /// Discard the saved checkpoint
    DeclineResume,
}

impl GameAction {
    /// Parse action from string
    ///
    /// # Examples
    ///
    /// ```
    /// use concentration_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("Select:12"), Some(GameAction::Select(12)));
    /// assert_eq!(GameAction::from_str("select:x"), None);
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if let Some(slot) = lower.strip_prefix("select:") {
            return slot.trim().parse::<usize>().ok().map(GameAction::Select);
        }
        match lower.as_str() {
            "restart" => Some(GameAction::Restart),
            "menu" => Some(GameAction::Menu),
            "resume" => Some(GameAction::Resume),
            "declineresume" => Some(GameAction::DeclineResume),
            _ => None,
        }
    }

    /// Convert to camelCase string (slot suffix omitted for `Select`)
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Select(_) => "select",
            GameAction::Restart => "restart",
            GameAction::Menu => "menu",
            GameAction::Resume => "resume",
            GameAction::DeclineResume => "declineResume",
        }
    }
}
