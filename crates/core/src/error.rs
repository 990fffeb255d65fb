//! Setup errors
//!
//! Everything that can go wrong while building a board or a battle is a
//! configuration problem and is fatal: constructors return `Err` and no
//! partially built state escapes.

use thiserror::Error;

use crate::types::{MAX_BOARD_DIM, MAX_COLORS, MIN_BOARD_DIM, MIN_COLOR_COUNT};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("board {width}x{height} is too small (minimum {MIN_BOARD_DIM}x{MIN_BOARD_DIM})")]
    BoardTooSmall { width: u8, height: u8 },

    #[error("board {width}x{height} is too large (maximum {MAX_BOARD_DIM}x{MAX_BOARD_DIM})")]
    BoardTooLarge { width: u8, height: u8 },

    #[error("{0} colors cannot fill a board without forced matches (minimum {MIN_COLOR_COUNT})")]
    TooFewColors(u8),

    #[error("{0} colors requested but only {MAX_COLORS} exist")]
    TooManyColors(u8),

    #[error("board layout is malformed: {0}")]
    Layout(String),

    #[error("no friendly characters configured")]
    EmptyRoster,

    #[error("encounter has no spawnable enemies")]
    EmptySpawnList,

    #[error("character {name:?}: {reason}")]
    InvalidCharacter { name: String, reason: &'static str },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SetupError {
    pub fn code(&self) -> &'static str {
        match self {
            SetupError::BoardTooSmall { .. } | SetupError::BoardTooLarge { .. } => "board_size",
            SetupError::TooFewColors(_) | SetupError::TooManyColors(_) => "color_count",
            SetupError::Layout(_) => "layout",
            SetupError::EmptyRoster | SetupError::EmptySpawnList => "roster",
            SetupError::InvalidCharacter { .. } => "character",
            SetupError::Io { .. } => "io",
            SetupError::Parse(_) => "parse",
        }
    }
}
