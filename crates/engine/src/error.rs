//! Rejected commands
//!
//! A command the battle cannot act on is dropped without changing any
//! state. The reason is logged at `debug` and never surfaces to the caller.

use thiserror::Error;

use wizmatch_types::Pos;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCommand {
    #[error("swipe origin {0} is outside the board")]
    OutOfBounds(Pos),

    #[error("no token at {0}")]
    EmptyCell(Pos),

    #[error("no token {direction} of {pos}")]
    NoNeighbor { pos: Pos, direction: &'static str },

    #[error("tokens are still moving")]
    Unsettled,

    #[error("{command} is not accepted in state {state}")]
    WrongState {
        command: &'static str,
        state: &'static str,
    },

    #[error("special attack gauge at {charge}/{full}")]
    NotCharged { charge: u32, full: u32 },

    #[error("active character is not a player character")]
    NotPlayerTurn,
}

impl InvalidCommand {
    pub fn code(&self) -> &'static str {
        match self {
            InvalidCommand::OutOfBounds(_)
            | InvalidCommand::EmptyCell(_)
            | InvalidCommand::NoNeighbor { .. } => "invalid_swipe",
            InvalidCommand::Unsettled => "board_busy",
            InvalidCommand::WrongState { .. } | InvalidCommand::NotPlayerTurn => "wrong_state",
            InvalidCommand::NotCharged { .. } => "not_charged",
        }
    }
}
