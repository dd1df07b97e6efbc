//! Autoplay bot driving full levels on the fixed timestep.

use concentration::bot::MemoryBot;
use concentration::core::{Game, GamePhase, RuleSet, Services};
use concentration::types::TICK_MS;

struct Finish {
    score: u32,
    turns: u32,
    matches: u32,
    ticks: u32,
}

fn autoplay(seed: u32, grid_size: usize, rules: RuleSet) -> Finish {
    let mut game = Game::new(seed, Services::headless()).with_rules(rules);
    let mut bot = MemoryBot::new();
    game.start_level(grid_size, 0).unwrap();

    let mut ticks = 0;
    while game.phase() != GamePhase::Completed {
        assert!(ticks < 200_000, "bot did not finish");
        bot.observe(&game);
        if let Some(slot) = bot.next_slot(&game) {
            game.select(slot);
            bot.observe(&game);
        }
        game.tick(TICK_MS);
        ticks += 1;
    }

    let ledger = game.ledger();
    Finish {
        score: ledger.score(),
        turns: ledger.turns(),
        matches: ledger.matches(),
        ticks,
    }
}

#[test]
fn bot_clears_every_grid_size() {
    for pairs in 1..=8 {
        let grid = pairs * 2;
        let finish = autoplay(7, grid, RuleSet::default());
        assert_eq!(finish.matches, pairs as u32);
        assert!(finish.turns >= pairs as u32);
        // Perfect memory never needs more than one miss per card.
        assert!(finish.turns <= grid as u32);
    }
}

#[test]
fn autoplay_is_deterministic_per_seed() {
    let a = autoplay(42, 16, RuleSet::default());
    let b = autoplay(42, 16, RuleSet::default());
    assert_eq!((a.score, a.turns, a.ticks), (b.score, b.turns, b.ticks));
}

#[test]
fn instant_rules_finish_faster() {
    let slow = autoplay(9, 12, RuleSet::default());
    let fast = autoplay(9, 12, RuleSet::instant());
    assert_eq!(slow.matches, fast.matches);
    assert!(fast.ticks < slow.ticks);
}

#[test]
fn bot_forgets_between_levels() {
    let mut bot = MemoryBot::new();
    let mut game = Game::new(3, Services::headless()).with_rules(RuleSet::instant());
    game.start_level(4, 0).unwrap();
    game.tick(0);
    game.select(0);
    bot.observe(&game);
    assert_eq!(bot.known(), 1);

    bot.reset();
    assert_eq!(bot.known(), 0);
}
