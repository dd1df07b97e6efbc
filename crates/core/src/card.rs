//! Card entity - identity plus face/match state, no game rules.
//!
//! State machine:
//!
//! ```text
//! FaceDown --flip_to_front--> FaceUp --mark_matched--> Matched (terminal)
//!     ^                          |
//!     +---flip_to_back/mismatch--+
//! ```
//!
//! Every transition returns whether the state actually changed so the caller
//! can decide whether to dispatch feedback (animation, sound).

use crate::ports::SpriteHandle;
use crate::types::CardId;

/// Logical face state of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CardFace {
    #[default]
    FaceDown,
    FaceUp,
    Matched,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Card {
    id: CardId,
    face: CardFace,
    interactable: bool,
    front_sprite: Option<SpriteHandle>,
    back_sprite: Option<SpriteHandle>,
}

impl Card {
    /// Fresh face-down, non-interactable card with the given pairing id.
    pub fn new(id: CardId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn face(&self) -> CardFace {
        self.face
    }

    /// Matched cards count as face-up.
    pub fn is_face_up(&self) -> bool {
        self.face != CardFace::FaceDown
    }

    pub fn is_matched(&self) -> bool {
        self.face == CardFace::Matched
    }

    pub fn is_interactable(&self) -> bool {
        self.interactable
    }

    /// Whether a click on this card may start a selection.
    pub fn is_selectable(&self) -> bool {
        self.interactable && self.face == CardFace::FaceDown
    }

    pub fn front_sprite(&self) -> Option<SpriteHandle> {
        self.front_sprite
    }

    pub fn back_sprite(&self) -> Option<SpriteHandle> {
        self.back_sprite
    }

    /// Assign a new pairing id. Only the level session calls this while laying out.
    pub(crate) fn assign(&mut self, id: CardId) {
        self.id = id;
    }

    pub(crate) fn set_sprites(
        &mut self,
        front: Option<SpriteHandle>,
        back: Option<SpriteHandle>,
    ) {
        self.front_sprite = front;
        self.back_sprite = back;
    }

    /// Detach both sprite handles so the caller can release them.
    pub(crate) fn take_sprites(&mut self) -> [Option<SpriteHandle>; 2] {
        [self.front_sprite.take(), self.back_sprite.take()]
    }

    /// FaceDown -> FaceUp. No-op when already face-up or matched.
    pub fn flip_to_front(&mut self) -> bool {
        if self.face != CardFace::FaceDown {
            return false;
        }
        self.face = CardFace::FaceUp;
        true
    }

    /// FaceUp -> FaceDown. No-op when face-down or matched.
    pub fn flip_to_back(&mut self) -> bool {
        if self.face != CardFace::FaceUp {
            return false;
        }
        self.face = CardFace::FaceDown;
        true
    }

    /// Terminal transition; idempotent. A matched card never becomes interactable again.
    pub fn mark_matched(&mut self) -> bool {
        self.interactable = false;
        if self.face == CardFace::Matched {
            return false;
        }
        self.face = CardFace::Matched;
        true
    }

    /// Mismatch feedback. Ends face-down; interactability is left to the coordinator.
    pub fn mismatch(&mut self) -> bool {
        if self.face != CardFace::FaceUp {
            return false;
        }
        self.face = CardFace::FaceDown;
        true
    }

    /// Matched cards ignore attempts to re-enable interaction.
    pub fn set_interactable(&mut self, interactable: bool) {
        self.interactable = interactable && !self.is_matched();
    }

    /// Back to spawn state for pool reuse. Sprites are released separately.
    pub fn reset(&mut self) {
        self.face = CardFace::FaceDown;
        self.interactable = false;
    }

    /// Checkpoint restore: force the recorded flags.
    pub(crate) fn restore(&mut self, face_up: bool, matched: bool) {
        self.face = match (face_up, matched) {
            (_, true) => CardFace::Matched,
            (true, false) => CardFace::FaceUp,
            (false, false) => CardFace::FaceDown,
        };
        self.interactable = false;
    }
}
