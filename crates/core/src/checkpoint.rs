//! Mid-level checkpoint - the persisted blob that lets a level resume.
//!
//! Stored as JSON under [`GAME_STATE_KEY`](crate::types::GAME_STATE_KEY):
//!
//! ```json
//! {"version":1,"cardData":[{"cardId":0,"isFaceUp":true,"isMatched":true}],
//!  "score":100,"timer":12.5,"turns":3,"matches":1}
//! ```
//!
//! Cards are listed in layout order. Sprites are not part of the blob; a
//! restored level gets a fresh sprite assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::error::CheckpointError;
use crate::ledger::ScoreLedger;
use crate::timer::GameTimer;
use crate::types::CardId;

pub const CHECKPOINT_VERSION: u8 = 1;

fn default_version() -> u8 {
    CHECKPOINT_VERSION
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub card_id: CardId,
    #[serde(rename = "isFaceUp")]
    pub face_up: bool,
    #[serde(rename = "isMatched")]
    pub matched: bool,
}

impl From<&Card> for CardRecord {
    fn from(card: &Card) -> Self {
        Self {
            card_id: card.id(),
            face_up: card.is_face_up(),
            matched: card.is_matched(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default = "default_version")]
    pub version: u8,
    #[serde(rename = "cardData")]
    pub cards: Vec<CardRecord>,
    pub score: u32,
    pub timer: f64,
    pub turns: u32,
    pub matches: u32,
}

impl Checkpoint {
    /// Snapshot the given cards (layout order) plus the ledger and timer.
    pub fn capture<'a>(
        cards: impl IntoIterator<Item = &'a Card>,
        ledger: &ScoreLedger,
        timer: &GameTimer,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            cards: cards.into_iter().map(CardRecord::from).collect(),
            score: ledger.score(),
            timer: timer.elapsed_secs(),
            turns: ledger.turns(),
            matches: ledger.matches(),
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode without checking it against a level; see [`Checkpoint::validate`].
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)?;
        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::VersionMismatch {
                found: checkpoint.version,
                expected: CHECKPOINT_VERSION,
            });
        }
        Ok(checkpoint)
    }

    /// Check internal consistency against a level of `grid_size` cards.
    pub fn validate(&self, grid_size: usize) -> Result<(), CheckpointError> {
        if self.cards.len() != grid_size {
            return Err(CheckpointError::CardCountMismatch {
                found: self.cards.len(),
                expected: grid_size,
            });
        }

        let mut per_id: BTreeMap<CardId, u8> = BTreeMap::new();
        for record in &self.cards {
            *per_id.entry(record.card_id).or_default() += 1;
        }
        let pairs = (grid_size / 2) as CardId;
        if let Some((&id, _)) = per_id
            .iter()
            .find(|&(&id, &count)| count != 2 || id >= pairs)
        {
            return Err(CheckpointError::UnpairedId(id));
        }

        let mut matched_cards = 0u32;
        let mut pending = 0usize;
        for (slot, record) in self.cards.iter().enumerate() {
            match (record.face_up, record.matched) {
                (false, true) => return Err(CheckpointError::MatchedFaceDown(slot)),
                (_, true) => matched_cards += 1,
                (true, false) => pending += 1,
                (false, false) => {}
            }
        }
        if matched_cards != self.matches * 2 {
            return Err(CheckpointError::MatchCountMismatch {
                recorded: self.matches,
                actual: matched_cards / 2,
            });
        }
        if pending > 1 {
            return Err(CheckpointError::TooManyPending(pending));
        }
        Ok(())
    }

    /// Layout slot of the face-up card that was waiting for its partner, if any.
    pub fn pending_slot(&self) -> Option<usize> {
        self.cards.iter().position(|r| r.face_up && !r.matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(card_id: CardId, face_up: bool, matched: bool) -> CardRecord {
        CardRecord {
            card_id,
            face_up,
            matched,
        }
    }

    fn sample() -> Checkpoint {
        Checkpoint {
            version: CHECKPOINT_VERSION,
            cards: vec![
                record(0, true, true),
                record(1, false, false),
                record(0, true, true),
                record(1, true, false),
            ],
            score: 100,
            timer: 7.25,
            turns: 2,
            matches: 1,
        }
    }

    #[test]
    fn json_round_trip() {
        let original = sample();
        let json = original.to_json().unwrap();
        assert!(json.contains("\"cardData\""));
        assert!(json.contains("\"isFaceUp\""));
        let back = Checkpoint::from_json(&json).unwrap();
        assert_eq!(back, original);
        assert!(back.validate(4).is_ok());
        assert_eq!(back.pending_slot(), Some(3));
    }

    #[test]
    fn missing_version_defaults_to_current() {
        let json = r#"{"cardData":[],"score":0,"timer":0.0,"turns":0,"matches":0}"#;
        assert_eq!(Checkpoint::from_json(json).unwrap().version, CHECKPOINT_VERSION);
    }

    #[test]
    fn corrupt_blob_is_decode_error() {
        assert!(matches!(
            Checkpoint::from_json("{not json"),
            Err(CheckpointError::Decode(_))
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        let mut cp = sample();
        cp.version = 9;
        let json = serde_json::to_string(&cp).unwrap();
        let err = Checkpoint::from_json(&json).unwrap_err();
        assert!(err.is_version_issue());
    }

    #[test]
    fn validate_catches_inconsistencies() {
        let cp = sample();
        assert!(matches!(
            cp.validate(6),
            Err(CheckpointError::CardCountMismatch { found: 4, expected: 6 })
        ));

        let mut unpaired = sample();
        unpaired.cards[1].card_id = 0;
        assert!(matches!(unpaired.validate(4), Err(CheckpointError::UnpairedId(0))));

        let mut face_down = sample();
        face_down.cards[0].face_up = false;
        assert!(matches!(
            face_down.validate(4),
            Err(CheckpointError::MatchedFaceDown(0))
        ));

        let mut miscounted = sample();
        miscounted.matches = 2;
        assert!(matches!(
            miscounted.validate(4),
            Err(CheckpointError::MatchCountMismatch { recorded: 2, actual: 1 })
        ));

        let mut two_pending = sample();
        two_pending.cards[1].face_up = true;
        assert!(matches!(
            two_pending.validate(4),
            Err(CheckpointError::TooManyPending(2))
        ));
    }
}
