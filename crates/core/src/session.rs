//! Level session - owns the cards of the current level.
//!
//! Handles layout (pairing ids, shuffling, sprites), the opening reveal
//! cascade, checkpoint restore and teardown. Cards come from a [`CardPool`]
//! that is rewound at the start of every level.

use tracing::{debug, error};

use crate::card::Card;
use crate::catalog::{CardCatalog, SpriteAssignment};
use crate::checkpoint::Checkpoint;
use crate::config::{LevelConfig, RuleSet};
use crate::error::LevelError;
use crate::game::Continuation;
use crate::pool::{CardHandle, CardPool};
use crate::ports::{AssetLoader, SpriteHandle};
use crate::rng::SimpleRng;
use crate::scheduler::Scheduler;
use crate::types::CardId;

#[derive(Debug, Default)]
pub struct LevelSession {
    pool: CardPool,
    layout: Vec<CardHandle>,
    config: Option<LevelConfig>,
    unrevealed: usize,
}

impl LevelSession {
    pub fn new(pool_capacity: usize) -> Self {
        Self {
            pool: CardPool::new(pool_capacity),
            ..Self::default()
        }
    }

    pub fn config(&self) -> Option<LevelConfig> {
        self.config
    }

    pub fn pool(&self) -> &CardPool {
        &self.pool
    }

    /// Card handles in layout order (slot 0 first).
    pub fn layout(&self) -> &[CardHandle] {
        &self.layout
    }

    pub fn handle_at(&self, slot: usize) -> Option<CardHandle> {
        self.layout.get(slot).copied()
    }

    pub fn card(&self, handle: CardHandle) -> Option<&Card> {
        self.pool.get(handle)
    }

    pub fn card_mut(&mut self, handle: CardHandle) -> Option<&mut Card> {
        self.pool.get_mut(handle)
    }

    /// Cards in layout order.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.layout.iter().filter_map(|&h| self.pool.get(h))
    }

    /// Lay out a fresh level and queue its reveal cascade.
    ///
    /// The configuration is checked against the catalog first; on error no
    /// card is spawned and the previous level is left untouched.
    pub fn generate(
        &mut self,
        config: LevelConfig,
        catalog: &CardCatalog,
        rng: &mut SimpleRng,
        assets: &mut dyn AssetLoader,
        scheduler: &mut Scheduler<Continuation>,
        rules: &RuleSet,
    ) -> Result<(), LevelError> {
        let sprites = catalog.assign(&config, rng)?;

        let mut ids: Vec<CardId> = (0..config.total_pairs()).flat_map(|id| [id, id]).collect();
        rng.shuffle(&mut ids);

        self.lay_out(config, &ids, &sprites, assets);
        self.unrevealed = self.layout.len();

        for (index, &handle) in self.layout.iter().enumerate() {
            let offset = rules.reveal_stagger_ms.saturating_mul(index as u32);
            scheduler.schedule(offset, Continuation::RevealShow(handle));
        }
        debug!(
            grid_size = config.grid_size(),
            category = config.category(),
            "level generated"
        );
        Ok(())
    }

    /// Rebuild a level from a checkpoint, skipping the reveal cascade.
    ///
    /// The checkpoint must already have been validated for `config`.
    /// Returns the handle of the face-up card that was awaiting its partner.
    pub fn load_from_checkpoint(
        &mut self,
        config: LevelConfig,
        checkpoint: &Checkpoint,
        catalog: &CardCatalog,
        rng: &mut SimpleRng,
        assets: &mut dyn AssetLoader,
    ) -> Result<Option<CardHandle>, LevelError> {
        let sprites = catalog.assign(&config, rng)?;
        let ids: Vec<CardId> = checkpoint.cards.iter().map(|r| r.card_id).collect();
        self.lay_out(config, &ids, &sprites, assets);
        self.unrevealed = 0;

        for (&handle, record) in self.layout.iter().zip(&checkpoint.cards) {
            if let Some(card) = self.pool.get_mut(handle) {
                card.restore(record.face_up, record.matched);
                card.set_interactable(!record.matched);
            }
        }
        Ok(checkpoint
            .pending_slot()
            .and_then(|slot| self.layout.get(slot).copied()))
    }

    /// Release every card of the current level back to the pool.
    pub fn clear(&mut self, assets: &mut dyn AssetLoader) {
        for handle in std::mem::take(&mut self.layout) {
            if let Some(card) = self.pool.get_mut(handle) {
                release_all(assets, card.take_sprites().into_iter().flatten());
            }
            self.pool.release(handle);
        }
        self.config = None;
        self.unrevealed = 0;
    }

    /// Hand back every sprite still held by the pool.
    pub fn release_sprites(&mut self, assets: &mut dyn AssetLoader) {
        release_all(assets, self.pool.drain_sprites());
    }

    /// Count down the reveal cascade. Returns true once every card has finished.
    pub(crate) fn mark_revealed(&mut self) -> bool {
        self.unrevealed = self.unrevealed.saturating_sub(1);
        self.unrevealed == 0
    }

    /// Enable interaction on every unmatched card.
    pub(crate) fn enable_all(&mut self) {
        for &handle in &self.layout {
            if let Some(card) = self.pool.get_mut(handle) {
                card.set_interactable(true);
            }
        }
    }

    fn lay_out(
        &mut self,
        config: LevelConfig,
        ids: &[CardId],
        sprites: &SpriteAssignment,
        assets: &mut dyn AssetLoader,
    ) {
        self.clear(assets);
        self.pool.rewind();

        for &id in ids {
            let handle = self.pool.acquire();
            let front = sprites.front_for(id).and_then(|addr| load(assets, addr));
            let back = sprites.back().and_then(|addr| load(assets, addr));
            if let Some(card) = self.pool.get_mut(handle) {
                card.assign(id);
                card.set_sprites(front, back);
            }
            self.layout.push(handle);
        }
        self.config = Some(config);
    }
}

// A failed load leaves the visual blank; the card stays playable.
fn load(assets: &mut dyn AssetLoader, address: &str) -> Option<SpriteHandle> {
    match assets.load_sprite(address) {
        Ok(handle) => Some(handle),
        Err(err) => {
            error!(error = %err, "sprite load failed, card visual left blank");
            None
        }
    }
}

fn release_all(assets: &mut dyn AssetLoader, handles: impl IntoIterator<Item = SpriteHandle>) {
    for handle in handles {
        assets.release_sprite(handle);
    }
}
