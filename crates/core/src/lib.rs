//! Core board logic - pure, deterministic, and testable
//!
//! This crate holds the match-3 rules: the token grid, match detection,
//! special token chains, gravity and refill, and the combat numbers the
//! board feeds. It has **no dependencies** on rendering or input, making it:
//!
//! - **Deterministic**: the same seed replays the same board
//! - **Testable**: scripted color sources pin down every cascade
//! - **Portable**: runs headless, in a CLI, or behind any view layer
//!
//! # Module Structure
//!
//! - [`grid`]: `width x height` token matrix with adjacency queries
//! - [`matcher`]: directional counting and match classification
//! - [`upgrade`]: bomb/cross/turbo activation chains
//! - [`cascade`]: gravity, refill and flood-fill chain detection
//! - [`board`]: pending break set and per-turn counters around a grid
//! - [`combat`]: characters, damage formula, balance tiers, targeting
//! - [`rng`]: seeded LCG and color sources
//! - [`snapshot`]: serde views of the board
//!
//! # Example
//!
//! ```
//! use wizmatch_core::{BalanceTable, Board, Grid, SimpleRng};
//!
//! let mut rng = SimpleRng::new(12345);
//! let grid = Grid::initialize(8, 8, 6, &mut rng).unwrap();
//! let mut board = Board::new(grid, BalanceTable::default());
//!
//! // A fresh board never starts with a match
//! assert!(!board.check_whole_board());
//! ```

pub mod board;
pub mod cascade;
pub mod combat;
pub mod error;
pub mod events;
pub mod grid;
pub mod matcher;
pub mod rng;
pub mod snapshot;
pub mod token;
pub mod upgrade;

pub use wizmatch_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use combat::{
    select_target, BalanceTable, Character, Modifiers, MultiAbilityProfile, Stats, Tier,
    TurnContext,
};
pub use error::SetupError;
pub use events::{EventSink, NullSink};
pub use grid::Grid;
pub use matcher::{best_swipe, check_token, classify, count_line, find_swipe, LineRun, MatchResult, SwipeHint};
pub use rng::{ColorSource, ScriptedColors, SimpleRng};
pub use snapshot::{BoardSnapshot, TokenSnapshot};
pub use token::Token;
pub use upgrade::expand_upgrade;
