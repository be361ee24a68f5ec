// Construction-time errors. Anything that can go wrong during a tick is a
// state transition instead, so nothing below is ever raised mid-simulation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("tile map must have a non-zero size, got {width}x{height}")]
    EmptyMap { width: usize, height: usize },

    #[error("tile map row {row} has {found} tiles, expected {expected}")]
    RaggedRow { row: usize, found: usize, expected: usize },

    #[error("tile map expects {expected} tiles for its size, got {found}")]
    TileCount { expected: usize, found: usize },

    #[error("tile size must be positive and finite, got {0}")]
    InvalidTileSize(f32),

    #[error("unknown tile glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },

    #[error("level has no player spawn tile")]
    MissingPlayerSpawn,

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("failed to parse tuning: {0}")]
    TuningParse(#[from] ron::error::SpannedError),
}
