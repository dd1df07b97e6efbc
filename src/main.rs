//! Headless autoplay runner (default binary).
//!
//! Plays one or more levels with a perfect-memory bot through the public
//! `Game` API on a fixed timestep. Simulated time is not slept, so a run
//! finishes as fast as the engine can tick.

use anyhow::{anyhow, bail, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use concentration::bot::MemoryBot;
use concentration::cli::parse_autoplay_args;
use concentration::core::ports::{NullAnimation, NullAudio};
use concentration::core::{
    Game, GamePhase, LevelStart, MemoryAssets, MemoryStore, PreferenceStore, Services,
};
use concentration::store::FileStore;
use concentration::types::TICK_MS;

/// Give up on a level after this much simulated time.
const MAX_LEVEL_MS: u64 = 30 * 60 * 1000;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = parse_autoplay_args(&args)?;

    let store: Box<dyn PreferenceStore> = match &config.store {
        Some(path) => Box::new(FileStore::open_or_default(path)),
        None => Box::new(MemoryStore::new()),
    };
    let services = Services::new(
        Box::new(MemoryAssets::accept_all()),
        Box::new(NullAudio),
        Box::new(NullAnimation),
        store,
    );
    let mut game = Game::new(config.seed, services);
    game.on_score().connect(|score| debug!(score, "score changed"));
    game.on_level_completed()
        .connect(|()| debug!("level completed signal"));

    if config.fresh {
        game.reset_preferences();
    }

    let mut bot = MemoryBot::new();
    for level in 0..config.levels {
        let started = if level == 0 && config.resume && game.has_checkpoint() {
            game.resume_or_start(config.grid_size, config.category)
        } else {
            game.start_level(config.grid_size, config.category)
                .map(|()| LevelStart::Fresh)
        };
        let start = started.map_err(|err| anyhow!("cannot start level: {}", err))?;

        play_level(&mut game, &mut bot)?;

        let high_score = game.high_score();
        let ledger = game.ledger();
        info!(
            level = level + 1,
            resumed = start == LevelStart::Resumed,
            score = ledger.score(),
            bonus = ledger.bonus(),
            turns = ledger.turns(),
            elapsed_secs = game.timer().whole_secs(),
            high_score,
            "level finished"
        );
    }
    Ok(())
}

fn play_level(game: &mut Game, bot: &mut MemoryBot) -> Result<()> {
    bot.reset();
    let mut simulated_ms: u64 = 0;
    while game.phase() != GamePhase::Completed {
        if game.phase() == GamePhase::Menu {
            bail!("level was torn down before completion");
        }
        if simulated_ms > MAX_LEVEL_MS {
            bail!("level did not finish within {} simulated ms", MAX_LEVEL_MS);
        }

        bot.observe(game);
        if let Some(slot) = bot.next_slot(game) {
            game.select(slot);
            bot.observe(game);
        }

        game.tick(TICK_MS);
        simulated_ms += TICK_MS as u64;
    }
    debug!(simulated_ms, cards_known = bot.known(), "level loop done");
    Ok(())
}
