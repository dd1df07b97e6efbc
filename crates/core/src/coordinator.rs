//! Match coordinator - selection sequencing and the compare/resolve cycle.
//!
//! # Sequencing
//!
//! ```text
//! select A ──> pending [A]
//! select B ──> pending [] , in flight (A, B), both non-interactable
//!              │  compare_delay_ms
//!              ▼
//!          turns += 1, score += delta
//!          ├─ match:    matches += 1, both Matched, checkpoint saved
//!          └─ mismatch: both mismatch feedback
//!                       │  mismatch_delay_ms
//!                       ▼
//!                       flip back
//!          re-enable A and B, check completion
//! ```
//!
//! Only one comparison is ever in flight. While it is, one more card may be
//! flipped and queued as the first card of the next pair; a tap that would
//! complete a second pair is ignored.

use arrayvec::ArrayVec;
use tracing::{debug, info};

use crate::checkpoint::Checkpoint;
use crate::config::RuleSet;
use crate::game::Continuation;
use crate::ledger::ScoreLedger;
use crate::persistence::Persistence;
use crate::pool::CardHandle;
use crate::ports::Services;
use crate::scheduler::Scheduler;
use crate::scoring::{calculate_completion_bonus, comparison_delta, BonusResult};
use crate::session::LevelSession;
use crate::timer::GameTimer;
use crate::types::{AnimationTrigger, AudioCue};

/// Everything a comparison touches, borrowed from the owning [`Game`](crate::Game).
pub(crate) struct PlayContext<'a> {
    pub rules: &'a RuleSet,
    pub session: &'a mut LevelSession,
    pub ledger: &'a mut ScoreLedger,
    pub timer: &'a mut GameTimer,
    pub scheduler: &'a mut Scheduler<Continuation>,
    pub services: &'a mut Services,
}

/// What happened to a card selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Precondition failed; nothing changed.
    Ignored,
    /// Card flipped and waiting for a partner.
    Flipped,
    /// Card flipped and completed a pair; comparison scheduled.
    Comparing,
}

/// Result of one judged pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Matched,
    /// Cards flip back after the mismatch delay.
    Mismatched,
    /// Final pair matched; carries the completion bonus.
    LevelCompleted(BonusResult),
}

#[derive(Debug, Default)]
pub struct MatchCoordinator {
    pending: ArrayVec<CardHandle, 2>,
    in_flight: Option<(CardHandle, CardHandle)>,
    completed: bool,
}

impl MatchCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cards flipped and not yet handed to a comparison.
    pub fn pending(&self) -> &[CardHandle] {
        &self.pending
    }

    pub fn in_flight(&self) -> Option<(CardHandle, CardHandle)> {
        self.in_flight
    }

    pub fn is_comparing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Forget all selection state for a new or torn-down level.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.in_flight = None;
        self.completed = false;
    }

    /// Re-queue a card that was face-up and unpaired when the checkpoint was taken.
    pub(crate) fn restore_pending(&mut self, handle: CardHandle) {
        self.reset();
        self.pending.push(handle);
    }

    pub(crate) fn on_card_selected(
        &mut self,
        cx: &mut PlayContext<'_>,
        handle: CardHandle,
    ) -> SelectOutcome {
        if self.completed {
            return SelectOutcome::Ignored;
        }
        let Some(card) = cx.session.card_mut(handle) else {
            return SelectOutcome::Ignored;
        };
        if card.is_matched() || card.is_face_up() || !card.is_interactable() {
            return SelectOutcome::Ignored;
        }
        if self.in_flight.is_some() && !self.pending.is_empty() {
            debug!(card = handle.index(), "comparison in flight, selection ignored");
            return SelectOutcome::Ignored;
        }
        if self.pending.contains(&handle) || !card.flip_to_front() {
            return SelectOutcome::Ignored;
        }
        cx.services
            .feedback(handle, AnimationTrigger::FlipFront, Some(AudioCue::Flip));

        if self.pending.try_push(handle).is_err() {
            return SelectOutcome::Ignored;
        }
        if self.pending.len() < 2 {
            return SelectOutcome::Flipped;
        }

        let (first, second) = (self.pending[0], self.pending[1]);
        self.pending.clear();
        for h in [first, second] {
            if let Some(card) = cx.session.card_mut(h) {
                card.set_interactable(false);
            }
        }
        self.in_flight = Some((first, second));
        cx.scheduler.schedule(
            cx.rules.compare_delay_ms,
            Continuation::ResolveComparison { first, second },
        );
        SelectOutcome::Comparing
    }

    /// Judge the in-flight pair once the compare delay has elapsed.
    pub(crate) fn resolve_comparison(
        &mut self,
        cx: &mut PlayContext<'_>,
        first: CardHandle,
        second: CardHandle,
    ) -> Option<Resolution> {
        if self.in_flight != Some((first, second)) {
            debug!(first = first.index(), second = second.index(), "no such comparison in flight");
            return None;
        }
        let ids = cx
            .session
            .card(first)
            .zip(cx.session.card(second))
            .map(|(a, b)| (a.id(), b.id()));
        let Some((first_id, second_id)) = ids else {
            self.in_flight = None;
            return None;
        };

        cx.ledger.increment_turns();
        let matched = first_id == second_id;
        cx.ledger.apply_delta(comparison_delta(cx.rules, matched));
        debug!(
            first_id,
            second_id,
            matched,
            turns = cx.ledger.turns(),
            score = cx.ledger.score(),
            "comparison resolved"
        );

        if !matched {
            for (h, cue) in [(first, Some(AudioCue::Mismatch)), (second, None)] {
                if let Some(card) = cx.session.card_mut(h) {
                    card.mismatch();
                }
                cx.services.feedback(h, AnimationTrigger::Mismatch, cue);
            }
            cx.scheduler.schedule(
                cx.rules.mismatch_delay_ms,
                Continuation::FinishMismatch { first, second },
            );
            return Some(Resolution::Mismatched);
        }

        cx.ledger.increment_matches();
        for (h, cue) in [(first, Some(AudioCue::Match)), (second, None)] {
            if let Some(card) = cx.session.card_mut(h) {
                card.mark_matched();
            }
            cx.services.feedback(h, AnimationTrigger::Match, cue);
        }
        let checkpoint = Checkpoint::capture(cx.session.cards(), cx.ledger, cx.timer);
        Persistence::new(cx.services.store.as_mut()).save_checkpoint(&checkpoint);

        Some(
            self.finish(cx, first, second)
                .map_or(Resolution::Matched, Resolution::LevelCompleted),
        )
    }

    /// Flip a mismatched pair back once its feedback has played.
    pub(crate) fn finish_mismatch(
        &mut self,
        cx: &mut PlayContext<'_>,
        first: CardHandle,
        second: CardHandle,
    ) {
        if self.in_flight != Some((first, second)) {
            return;
        }
        for h in [first, second] {
            if let Some(card) = cx.session.card_mut(h) {
                card.flip_to_back();
            }
            cx.services.feedback(h, AnimationTrigger::FlipBack, None);
        }
        // A mismatch can never complete a level.
        let _ = self.finish(cx, first, second);
    }

    // Re-enable the pair, then run the completion check.
    fn finish(
        &mut self,
        cx: &mut PlayContext<'_>,
        first: CardHandle,
        second: CardHandle,
    ) -> Option<BonusResult> {
        for h in [first, second] {
            if let Some(card) = cx.session.card_mut(h) {
                card.set_interactable(true);
            }
        }
        self.in_flight = None;

        if self.completed || cx.ledger.matches() < cx.ledger.total_pairs() {
            return None;
        }
        Some(self.complete(cx))
    }

    fn complete(&mut self, cx: &mut PlayContext<'_>) -> BonusResult {
        self.completed = true;
        self.pending.clear();

        let result = calculate_completion_bonus(
            cx.rules,
            cx.ledger.total_pairs(),
            cx.ledger.turns(),
            cx.ledger.matches(),
            cx.timer.whole_secs(),
        );
        cx.ledger.set_bonus(result.bonus);
        cx.ledger.apply_delta(result.bonus as i64);

        let mut persistence = Persistence::new(cx.services.store.as_mut());
        let new_high = persistence.save_high_score(cx.ledger.score());
        persistence.clear_checkpoint();
        cx.timer.stop();

        info!(
            score = cx.ledger.score(),
            bonus = result.bonus,
            tier = ?result.tier,
            turns = cx.ledger.turns(),
            elapsed_secs = cx.timer.whole_secs(),
            new_high,
            "level complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardCatalog;
    use crate::config::LevelConfig;
    use crate::rng::SimpleRng;

    struct Rig {
        rules: RuleSet,
        session: LevelSession,
        ledger: ScoreLedger,
        timer: GameTimer,
        scheduler: Scheduler<Continuation>,
        services: Services,
        coordinator: MatchCoordinator,
    }

    impl Rig {
        fn new(grid: usize) -> Self {
            let rules = RuleSet::default();
            let mut session = LevelSession::new(grid);
            let mut scheduler = Scheduler::new();
            let mut services = Services::headless();
            let config = LevelConfig::new(grid, 0).unwrap();
            session
                .generate(
                    config,
                    &CardCatalog::builtin(),
                    &mut SimpleRng::new(11),
                    services.assets.as_mut(),
                    &mut scheduler,
                    &rules,
                )
                .unwrap();
            // Skip the reveal cascade.
            scheduler.bump_epoch();
            session.enable_all();
            let mut ledger = ScoreLedger::new();
            ledger.reset(config.total_pairs());
            let mut timer = GameTimer::new();
            timer.start();
            Self {
                rules,
                session,
                ledger,
                timer,
                scheduler,
                services,
                coordinator: MatchCoordinator::new(),
            }
        }

        fn select(&mut self, handle: CardHandle) -> SelectOutcome {
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

        fn run(&mut self, elapsed_ms: u32) -> Vec<Resolution> {
            let mut out = Vec::new();
            for task in self.scheduler.advance(elapsed_ms) {
                let mut cx = PlayContext {
                    rules: &self.rules,
                    session: &mut self.session,
                    ledger: &mut self.ledger,
                    timer: &mut self.timer,
                    scheduler: &mut self.scheduler,
                    services: &mut self.services,
                };
                match task {
                    Continuation::ResolveComparison { first, second } => {
                        out.extend(self.coordinator.resolve_comparison(&mut cx, first, second));
                    }
                    Continuation::FinishMismatch { first, second } => {
                        self.coordinator.finish_mismatch(&mut cx, first, second);
                    }
                    _ => {}
                }
            }
            out
        }

        /// Two handles sharing an id, and one handle with a different id.
        fn pair_and_other(&self) -> (CardHandle, CardHandle, CardHandle) {
            let layout = self.session.layout();
            let id_of = |h: CardHandle| self.session.card(h).unwrap().id();
            let a = layout[0];
            let b = *layout[1..].iter().find(|&&h| id_of(h) == id_of(a)).unwrap();
            let c = *layout.iter().find(|&&h| id_of(h) != id_of(a)).unwrap();
            (a, b, c)
        }
    }

    #[test]
    fn no_state_change_before_compare_delay() {
        let mut rig = Rig::new(4);
        let (a, b, _) = rig.pair_and_other();
        assert_eq!(rig.select(a), SelectOutcome::Flipped);
        assert_eq!(rig.select(b), SelectOutcome::Comparing);

        assert!(!rig.session.card(a).unwrap().is_interactable());
        assert!(rig.run(499).is_empty());
        assert_eq!(rig.ledger.turns(), 0);
        assert_eq!(rig.run(1), vec![Resolution::Matched]);
        assert_eq!(rig.ledger.turns(), 1);
        assert_eq!(rig.ledger.score(), 100);
    }

    #[test]
    fn mismatch_flips_back_after_delay() {
        let mut rig = Rig::new(4);
        let (a, _, c) = rig.pair_and_other();
        rig.select(a);
        rig.select(c);
        assert_eq!(rig.run(500), vec![Resolution::Mismatched]);
        assert_eq!(rig.ledger.score(), 0);
        assert!(rig.coordinator.is_comparing());
        assert!(!rig.session.card(a).unwrap().is_interactable());

        rig.run(1000);
        assert!(!rig.coordinator.is_comparing());
        for h in [a, c] {
            let card = rig.session.card(h).unwrap();
            assert!(!card.is_face_up());
            assert!(card.is_interactable());
        }
    }

    #[test]
    fn cards_under_comparison_cannot_be_reselected() {
        let mut rig = Rig::new(4);
        let (a, b, _) = rig.pair_and_other();
        rig.select(a);
        assert_eq!(rig.select(a), SelectOutcome::Ignored);
        rig.select(b);
        assert_eq!(rig.select(a), SelectOutcome::Ignored);
        assert_eq!(rig.select(b), SelectOutcome::Ignored);
    }

    #[test]
    fn third_tap_queues_fourth_is_ignored() {
        let mut rig = Rig::new(8);
        let layout = rig.session.layout().to_vec();
        rig.select(layout[0]);
        rig.select(layout[1]);
        assert_eq!(rig.select(layout[2]), SelectOutcome::Flipped);
        assert_eq!(rig.select(layout[3]), SelectOutcome::Ignored);
        assert!(!rig.session.card(layout[3]).unwrap().is_face_up());
        assert_eq!(rig.coordinator.pending(), &[layout[2]]);

        rig.run(500);
        rig.run(1000);
        assert!(!rig.coordinator.is_comparing());
        assert_eq!(rig.select(layout[3]), SelectOutcome::Comparing);
    }

    #[test]
    fn match_writes_checkpoint() {
        let mut rig = Rig::new(4);
        let (a, b, _) = rig.pair_and_other();
        rig.select(a);
        rig.select(b);
        rig.run(500);
        let p = Persistence::new(rig.services.store.as_mut());
        let cp = p.load_checkpoint(4).unwrap().unwrap();
        assert_eq!(cp.matches, 1);
        assert_eq!(cp.score, 100);
    }

    #[test]
    fn completion_fires_once_and_clears_checkpoint() {
        let mut rig = Rig::new(2);
        let layout = rig.session.layout().to_vec();
        rig.timer.tick(5.0);
        rig.select(layout[0]);
        rig.select(layout[1]);
        let out = rig.run(500);
        assert_eq!(out.len(), 1);
        let Resolution::LevelCompleted(bonus) = out[0] else {
            panic!("expected completion, got {:?}", out[0]);
        };
        // 1 pair, 1 turn, 5s: (100 - 5) * 4
        assert_eq!(bonus.bonus, 380);
        assert_eq!(rig.ledger.score(), 480);
        assert!(!rig.timer.is_running());
        assert!(rig.coordinator.is_completed());

        let mut p = Persistence::new(rig.services.store.as_mut());
        assert!(!p.has_checkpoint());
        assert_eq!(p.load_high_score(), 480);
        assert!(!p.save_high_score(480));

        assert_eq!(rig.select(layout[0]), SelectOutcome::Ignored);
    }
}
