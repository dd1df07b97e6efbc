use thiserror::Error;

/// Level configuration rejected before any card is spawned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("grid size {0} is odd")]
    OddGridSize(usize),

    #[error("grid size {0} yields no pairs")]
    GridTooSmall(usize),

    #[error("category index {index} out of range ({available} categories)")]
    CategoryOutOfRange { index: usize, available: usize },

    #[error("category {0:?} has no sprites")]
    EmptyCategory(String),

    #[error("no level is active")]
    NoActiveLevel,
}

/// Sprite loading failure reported by the asset collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("sprite not found: {address}")]
    NotFound { address: String },

    #[error("invalid sprite at {address}")]
    Invalid { address: String },
}

/// A persisted checkpoint that cannot be resumed.
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("checkpoint decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u8, expected: u8 },

    #[error("checkpoint has {found} cards, level expects {expected}")]
    CardCountMismatch { found: usize, expected: usize },

    #[error("card id {0} does not appear exactly twice")]
    UnpairedId(u32),

    #[error("card at slot {0} is matched but face-down")]
    MatchedFaceDown(usize),

    #[error("checkpoint counts {recorded} matches but {actual} pairs are matched")]
    MatchCountMismatch { recorded: u32, actual: u32 },

    #[error("checkpoint has {0} face-up unmatched cards")]
    TooManyPending(usize),
}

impl CheckpointError {
    /// Whether the blob could be a newer format rather than plain corruption.
    pub fn is_version_issue(&self) -> bool {
        matches!(self, CheckpointError::VersionMismatch { .. })
    }
}
