//! Game context - owns every piece of state for one run.
//!
//! `Game` replaces per-manager globals: the ledger, timer, scheduler, level
//! session, coordinator and host services all live here and are handed to
//! each other by reference. The host drives it with [`Game::tick`] and
//! player input with [`Game::select`] / [`Game::apply_action`].

use tracing::{error, info, warn};

use crate::card::Card;
use crate::catalog::CardCatalog;
use crate::checkpoint::Checkpoint;
use crate::config::{LevelConfig, RuleSet};
use crate::coordinator::{MatchCoordinator, PlayContext, Resolution, SelectOutcome};
use crate::error::LevelError;
use crate::ledger::ScoreLedger;
use crate::persistence::Persistence;
use crate::pool::CardHandle;
use crate::ports::Services;
use crate::rng::SimpleRng;
use crate::scheduler::Scheduler;
use crate::session::LevelSession;
use crate::signal::Signal;
use crate::timer::GameTimer;
use crate::types::{AnimationTrigger, AudioCue, GameAction, DEFAULT_POOL_CAPACITY};

/// Work queued on the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    ResolveComparison {
        first: CardHandle,
        second: CardHandle,
    },
    FinishMismatch {
        first: CardHandle,
        second: CardHandle,
    },
    RevealShow(CardHandle),
    RevealFront(CardHandle),
    RevealBack(CardHandle),
    RevealReady(CardHandle),
    CompletionChime,
    CompletionTeardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// No level on the table.
    #[default]
    Menu,
    /// Opening cascade running; cards not yet interactable.
    Revealing,
    Playing,
    /// Last pair matched; level-complete sequence running.
    Completing,
    /// Grid cleared; final ledger values remain readable.
    Completed,
}

/// How a level was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStart {
    Fresh,
    Resumed,
}

pub struct Game {
    rules: RuleSet,
    catalog: CardCatalog,
    rng: SimpleRng,
    ledger: ScoreLedger,
    timer: GameTimer,
    scheduler: Scheduler<Continuation>,
    services: Services,
    session: LevelSession,
    coordinator: MatchCoordinator,
    phase: GamePhase,
    // Survives teardown so a cleared level can be restarted.
    last_config: Option<LevelConfig>,
    level_completed: Signal<()>,
}

impl Game {
    /// Default rules, built-in catalog.
    pub fn new(seed: u32, services: Services) -> Self {
        Self {
            rules: RuleSet::default(),
            catalog: CardCatalog::builtin(),
            rng: SimpleRng::new(seed),
            ledger: ScoreLedger::new(),
            timer: GameTimer::new(),
            scheduler: Scheduler::new(),
            services,
            session: LevelSession::new(DEFAULT_POOL_CAPACITY),
            coordinator: MatchCoordinator::new(),
            phase: GamePhase::Menu,
            last_config: None,
            level_completed: Signal::new(),
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_catalog(mut self, catalog: CardCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.session = LevelSession::new(capacity);
        self
    }

    // Accessors

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    pub fn session(&self) -> &LevelSession {
        &self.session
    }

    pub fn coordinator(&self) -> &MatchCoordinator {
        &self.coordinator
    }

    pub fn level_config(&self) -> Option<LevelConfig> {
        self.session.config()
    }

    /// Number of cards on the table.
    pub fn card_count(&self) -> usize {
        self.session.layout().len()
    }

    /// Card in a layout slot.
    pub fn card(&self, slot: usize) -> Option<&Card> {
        self.session.handle_at(slot).and_then(|h| self.session.card(h))
    }

    /// Whether a selection could currently start or complete a pair.
    pub fn accepts_selection(&self) -> bool {
        self.phase == GamePhase::Playing
            && !(self.coordinator.is_comparing() && !self.coordinator.pending().is_empty())
    }

    pub fn high_score(&mut self) -> u32 {
        self.persistence().load_high_score()
    }

    pub fn has_checkpoint(&mut self) -> bool {
        self.persistence().has_checkpoint()
    }

    pub fn selected_level(&mut self) -> Option<(usize, usize)> {
        self.persistence().load_selected_level()
    }

    /// Forget the high score, the selected level and any checkpoint.
    pub fn reset_preferences(&mut self) {
        let mut persistence = self.persistence();
        persistence.delete_high_score();
        persistence.delete_selected_level();
        persistence.clear_checkpoint();
    }

    // Observers

    pub fn on_score(&mut self) -> &mut Signal<u32> {
        &mut self.ledger.on_score
    }

    pub fn on_bonus(&mut self) -> &mut Signal<u32> {
        &mut self.ledger.on_bonus
    }

    pub fn on_turns(&mut self) -> &mut Signal<u32> {
        &mut self.ledger.on_turns
    }

    pub fn on_matches(&mut self) -> &mut Signal<u32> {
        &mut self.ledger.on_matches
    }

    pub fn on_timer(&mut self) -> &mut Signal<f64> {
        &mut self.timer.on_updated
    }

    /// Fired once per level when the final pair is matched.
    pub fn on_level_completed(&mut self) -> &mut Signal<()> {
        &mut self.level_completed
    }

    // Flow

    /// Start a fresh level. Invalid configurations are logged and nothing is spawned.
    pub fn start_level(&mut self, grid_size: usize, category: usize) -> Result<(), LevelError> {
        let config = LevelConfig::new(grid_size, category)
            .and_then(|config| self.catalog.validate(&config).map(|_| config))
            .inspect_err(|err| error!(error = %err, grid_size, category, "invalid level configuration"))?;

        self.begin_level();
        self.ledger.reset(config.total_pairs());
        let result = self.session.generate(
            config,
            &self.catalog,
            &mut self.rng,
            self.services.assets.as_mut(),
            &mut self.scheduler,
            &self.rules,
        );
        if let Err(err) = result {
            error!(error = %err, "level generation failed");
            self.phase = GamePhase::Menu;
            return Err(err);
        }

        let mut persistence = self.persistence();
        persistence.save_selected_level(grid_size, category);
        persistence.clear_checkpoint();
        self.phase = GamePhase::Revealing;
        self.last_config = Some(config);
        info!(grid_size, category, seed = self.rng.seed(), "level started");
        Ok(())
    }

    /// Resume the stored checkpoint at the stored level selection.
    ///
    /// A stale checkpoint is discarded and a fresh level is started instead.
    /// Fails only when no level selection has been stored.
    pub fn resume(&mut self) -> Result<LevelStart, LevelError> {
        let (grid_size, category) = self
            .persistence()
            .load_selected_level()
            .ok_or(LevelError::NoActiveLevel)?;
        self.resume_at(grid_size, category)
    }

    /// Like [`Game::resume`], falling back to the given selection when none is stored.
    pub fn resume_or_start(
        &mut self,
        grid_size: usize,
        category: usize,
    ) -> Result<LevelStart, LevelError> {
        let (grid_size, category) = self
            .persistence()
            .load_selected_level()
            .unwrap_or((grid_size, category));
        self.resume_at(grid_size, category)
    }

    /// Throw the checkpoint away and go back to the menu.
    pub fn decline_resume(&mut self) {
        self.persistence().clear_checkpoint();
        self.return_to_menu();
    }

    /// Regenerate the current (or just completed) level from scratch.
    pub fn restart(&mut self) -> Result<(), LevelError> {
        let config = self
            .session
            .config()
            .or(self.last_config)
            .ok_or(LevelError::NoActiveLevel)?;
        self.start_level(config.grid_size(), config.category())
    }

    /// Tear the level down and reset the timer.
    pub fn return_to_menu(&mut self) {
        self.begin_level();
        self.phase = GamePhase::Menu;
    }

    /// Select the card in a layout slot.
    pub fn select(&mut self, slot: usize) -> SelectOutcome {
        if self.phase != GamePhase::Playing {
            return SelectOutcome::Ignored;
        }
        let Some(handle) = self.session.handle_at(slot) else {
            return SelectOutcome::Ignored;
        };
        let mut cx = PlayContext {
            rules: &self.rules,
            session: &mut self.session,
            ledger: &mut self.ledger,
            timer: &mut self.timer,
            scheduler: &mut self.scheduler,
            services: &mut self.services,
        };
        self.coordinator.on_card_selected(&mut cx, handle)
    }

    /// Apply a player action. Returns whether it had any effect.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Select(slot) => self.select(slot) != SelectOutcome::Ignored,
            GameAction::Restart => self.restart().is_ok(),
            GameAction::Menu => {
                self.return_to_menu();
                true
            }
            GameAction::Resume => self.resume().is_ok(),
            GameAction::DeclineResume => {
                self.decline_resume();
                true
            }
        }
    }

    /// Advance game time by `elapsed_ms` and run every continuation that came due.
    ///
    /// The timer is brought up to each task's due time before the task runs,
    /// so a comparison judged mid-tick sees the elapsed time at that moment.
    pub fn tick(&mut self, elapsed_ms: u32) {
        let start_ms = self.scheduler.now_ms();
        let end_ms = start_ms + elapsed_ms as u64;
        let mut timed_ms = start_ms;

        self.scheduler.advance_clock(elapsed_ms);
        while let Some(task) = self.scheduler.pop_due() {
            let due_ms = self.scheduler.now_ms();
            self.advance_timer(due_ms.saturating_sub(timed_ms));
            timed_ms = timed_ms.max(due_ms);
            self.run(task);
        }
        self.advance_timer(end_ms.saturating_sub(timed_ms));
    }

    fn advance_timer(&mut self, ms: u64) {
        if ms > 0 {
            self.timer.tick(ms as f64 / 1000.0);
        }
    }

    fn run(&mut self, task: Continuation) {
        match task {
            Continuation::ResolveComparison { first, second } => {
                let mut cx = PlayContext {
                    rules: &self.rules,
                    session: &mut self.session,
                    ledger: &mut self.ledger,
                    timer: &mut self.timer,
                    scheduler: &mut self.scheduler,
                    services: &mut self.services,
                };
                let resolution = self.coordinator.resolve_comparison(&mut cx, first, second);
                if let Some(Resolution::LevelCompleted(_)) = resolution {
                    self.phase = GamePhase::Completing;
                    self.level_completed.emit(());
                    self.scheduler
                        .schedule(self.rules.completion_step_ms, Continuation::CompletionChime);
                }
            }
            Continuation::FinishMismatch { first, second } => {
                let mut cx = PlayContext {
                    rules: &self.rules,
                    session: &mut self.session,
                    ledger: &mut self.ledger,
                    timer: &mut self.timer,
                    scheduler: &mut self.scheduler,
                    services: &mut self.services,
                };
                self.coordinator.finish_mismatch(&mut cx, first, second);
            }
            Continuation::RevealShow(h) => {
                self.services.animation.set_trigger(h, AnimationTrigger::Show);
                self.scheduler
                    .schedule(self.rules.reveal_show_ms, Continuation::RevealFront(h));
            }
            Continuation::RevealFront(h) => {
                if let Some(card) = self.session.card_mut(h) {
                    card.flip_to_front();
                }
                self.services
                    .animation
                    .set_trigger(h, AnimationTrigger::FlipFront);
                self.scheduler
                    .schedule(self.rules.reveal_hold_ms, Continuation::RevealBack(h));
            }
            Continuation::RevealBack(h) => {
                if let Some(card) = self.session.card_mut(h) {
                    card.flip_to_back();
                }
                self.services
                    .animation
                    .set_trigger(h, AnimationTrigger::FlipBack);
                self.scheduler
                    .schedule(self.rules.reveal_hide_ms, Continuation::RevealReady(h));
            }
            Continuation::RevealReady(_) => {
                if self.session.mark_revealed() && self.phase == GamePhase::Revealing {
                    self.session.enable_all();
                    self.timer.start();
                    self.phase = GamePhase::Playing;
                }
            }
            Continuation::CompletionChime => {
                self.services.audio.play(AudioCue::LevelComplete);
                self.scheduler
                    .schedule(self.rules.completion_step_ms, Continuation::CompletionTeardown);
            }
            Continuation::CompletionTeardown => {
                self.session.clear(self.services.assets.as_mut());
                self.phase = GamePhase::Completed;
            }
        }
    }

    fn resume_at(&mut self, grid_size: usize, category: usize) -> Result<LevelStart, LevelError> {
        let config = LevelConfig::new(grid_size, category)
            .and_then(|config| self.catalog.validate(&config).map(|_| config))
            .inspect_err(|err| error!(error = %err, grid_size, category, "invalid level configuration"))?;

        let checkpoint = match self.persistence().load_checkpoint(grid_size) {
            Ok(Some(checkpoint)) => Some(checkpoint),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, version_issue = err.is_version_issue(), "stale checkpoint, starting fresh");
                self.persistence().clear_checkpoint();
                None
            }
        };
        match checkpoint {
            Some(checkpoint) => {
                self.restore(config, &checkpoint)?;
                Ok(LevelStart::Resumed)
            }
            None => {
                self.start_level(grid_size, category)?;
                Ok(LevelStart::Fresh)
            }
        }
    }

    fn restore(&mut self, config: LevelConfig, checkpoint: &Checkpoint) -> Result<(), LevelError> {
        self.begin_level();
        let pending = self.session.load_from_checkpoint(
            config,
            checkpoint,
            &self.catalog,
            &mut self.rng,
            self.services.assets.as_mut(),
        )?;
        if let Some(handle) = pending {
            self.coordinator.restore_pending(handle);
        }
        self.ledger.restore(
            config.total_pairs(),
            checkpoint.score,
            checkpoint.turns,
            checkpoint.matches,
        );
        self.timer.restore(checkpoint.timer);
        self.timer.resume();
        self.phase = GamePhase::Playing;
        self.last_config = Some(config);
        info!(
            grid_size = config.grid_size(),
            score = checkpoint.score,
            matches = checkpoint.matches,
            "level resumed from checkpoint"
        );
        Ok(())
    }

    // Invalidate queued work and clear the table before anything new is laid out.
    fn begin_level(&mut self) {
        self.scheduler.bump_epoch();
        self.coordinator.reset();
        self.session.clear(self.services.assets.as_mut());
        self.timer.reset();
    }

    fn persistence(&mut self) -> Persistence<'_> {
        Persistence::new(self.services.store.as_mut())
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.session.clear(self.services.assets.as_mut());
        self.session.release_sprites(self.services.assets.as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_game() -> Game {
        Game::new(5, Services::headless()).with_rules(RuleSet::instant())
    }

    #[test]
    fn new_game_starts_in_menu() {
        let game = instant_game();
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.card_count(), 0);
    }

    #[test]
    fn invalid_level_is_rejected_without_spawning() {
        let mut game = instant_game();
        assert_eq!(game.start_level(5, 0), Err(LevelError::OddGridSize(5)));
        assert!(matches!(
            game.start_level(4, 99),
            Err(LevelError::CategoryOutOfRange { .. })
        ));
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.card_count(), 0);
    }

    #[test]
    fn reveal_then_playing() {
        let mut game = Game::new(5, Services::headless());
        game.start_level(4, 0).unwrap();
        assert_eq!(game.phase(), GamePhase::Revealing);
        assert_eq!(game.select(0), SelectOutcome::Ignored);

        // 3 * 100 stagger + 500 + 1500 + 500
        let total = game.rules().reveal_duration_ms(4);
        game.tick(total - 1);
        assert_eq!(game.phase(), GamePhase::Revealing);
        game.tick(1);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert!(game.timer().is_running());
        assert!((0..4).all(|slot| {
            let card = game.card(slot).unwrap();
            card.is_interactable() && !card.is_face_up()
        }));
    }

    #[test]
    fn restart_after_completion_replays_same_level() {
        let mut game = instant_game();
        game.start_level(4, 1).unwrap();
        game.tick(0);
        for id in 0..2 {
            let slots: Vec<usize> = (0..4)
                .filter(|&s| game.card(s).unwrap().id() == id)
                .collect();
            game.select(slots[0]);
            game.select(slots[1]);
            game.tick(0);
        }
        assert_eq!(game.phase(), GamePhase::Completed);
        assert_eq!(game.card_count(), 0);

        assert_eq!(game.restart(), Ok(()));
        assert_eq!(game.phase(), GamePhase::Revealing);
        assert_eq!(game.level_config(), Some(LevelConfig::new(4, 1).unwrap()));
        assert_eq!(game.ledger().score(), 0);
    }

    #[test]
    fn restart_without_level_fails() {
        let mut game = instant_game();
        assert_eq!(game.restart(), Err(LevelError::NoActiveLevel));
    }

    #[test]
    fn return_to_menu_resets_timer_and_table() {
        let mut game = instant_game();
        game.start_level(4, 0).unwrap();
        game.tick(0);
        game.tick(3000);
        game.return_to_menu();
        assert_eq!(game.phase(), GamePhase::Menu);
        assert_eq!(game.timer().elapsed_secs(), 0.0);
        assert!(!game.timer().is_running());
        assert_eq!(game.card_count(), 0);
    }

    #[test]
    fn resume_without_selection_is_an_error() {
        let mut game = instant_game();
        assert_eq!(game.resume(), Err(LevelError::NoActiveLevel));
        assert_eq!(game.resume_or_start(4, 0), Ok(LevelStart::Fresh));
        assert_eq!(game.selected_level(), Some((4, 0)));
    }
}
