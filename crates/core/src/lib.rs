//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the rules of the memory-matching game: card state,
//! pair comparison, scoring, timing and checkpointing. It never touches the
//! filesystem, a clock or a screen. Everything outside (sprites, sound,
//! animation, key-value storage) is reached through the traits in [`ports`].
//!
//! - **Deterministic**: same seed and same inputs produce the same game
//! - **Testable**: time only advances through [`Game::tick`]
//! - **Headless**: [`Services::headless`] runs without any host at all
//!
//! # Module Structure
//!
//! - [`card`]: card entity and its face/match state machine
//! - [`pool`]: arena of reusable cards addressed by [`CardHandle`]
//! - [`coordinator`]: selection sequencing and the compare/resolve cycle
//! - [`session`]: level layout, reveal cascade, restore and teardown
//! - [`ledger`] / [`scoring`]: score, turns, matches and the completion bonus
//! - [`timer`]: level timer with whole-second notifications
//! - [`scheduler`]: timed continuations with epoch-based cancellation
//! - [`checkpoint`] / [`persistence`]: resumable mid-level state and preferences
//! - [`game`]: the context object tying all of the above together
//!
//! # Game Rules
//!
//! - A matched pair scores 100, a mismatch costs 10; the score never drops below 0
//! - A pair is judged 500ms after the second card flips; a mismatch flips back 1000ms later
//! - Only one comparison is in flight at a time
//! - Clearing the board awards a bonus that rewards few turns and little time
//!
//! # Example
//!
//! ```
//! use concentration_core::{Game, GamePhase, RuleSet, Services};
//!
//! let mut game = Game::new(7, Services::headless()).with_rules(RuleSet::instant());
//! game.start_level(4, 0).unwrap();
//!
//! // Zero delays: the reveal cascade finishes on the first tick.
//! game.tick(0);
//! assert_eq!(game.phase(), GamePhase::Playing);
//!
//! game.select(0);
//! game.select(1);
//! game.tick(0);
//! assert_eq!(game.ledger().turns(), 1);
//! ```
//!
//! # Timing
//!
//! The host calls [`Game::tick`] with the elapsed milliseconds, normally every
//! [`types::TICK_MS`]. Scheduled work is timed logically: one large tick
//! produces the same outcome as many small ones.

pub mod card;
pub mod catalog;
pub mod checkpoint;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod game;
pub mod ledger;
pub mod persistence;
pub mod pool;
pub mod ports;
pub mod rng;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod signal;
pub mod timer;

pub use concentration_types as types;

// Re-export commonly used types for convenience
pub use card::{Card, CardFace};
pub use catalog::{CardCatalog, CardCategory};
pub use checkpoint::{CardRecord, Checkpoint};
pub use config::{LevelConfig, RuleSet};
pub use coordinator::{MatchCoordinator, Resolution, SelectOutcome};
pub use error::{AssetError, CheckpointError, LevelError};
pub use game::{Continuation, Game, GamePhase, LevelStart};
pub use ledger::ScoreLedger;
pub use persistence::Persistence;
pub use pool::{CardHandle, CardPool};
pub use ports::{
    AnimationDriver, AssetLoader, AudioSink, MemoryAssets, MemoryStore, PreferenceStore,
    RecordingAnimation, RecordingAudio, Services, SharedStore, SpriteHandle, StoredValue,
};
pub use rng::SimpleRng;
pub use scheduler::{Epoch, Scheduler};
pub use scoring::{calculate_completion_bonus, BonusResult, BonusTier};
pub use session::LevelSession;
pub use signal::{Signal, SlotId};
pub use timer::GameTimer;
