//! Whole-battle snapshot for views, replays and the CLI's `--json` output

use serde::{Deserialize, Serialize};

use wizmatch_core::{BoardSnapshot, Character, TurnContext};
use wizmatch_types::{CharacterId, Outcome, TurnState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub state: TurnState,
    pub turn: u32,
    pub level: u32,
    pub charge: u32,
    pub full_charge: u32,
    pub active: Option<CharacterId>,
    pub outcome: Option<Outcome>,
    /// Counters of the turn in progress
    pub context: TurnContext,
    pub board: BoardSnapshot,
    pub characters: Vec<Character>,
}

impl BattleSnapshot {
    pub fn is_charged(&self) -> bool {
        self.charge >= self.full_charge
    }

    pub fn active_character(&self) -> Option<&Character> {
        let id = self.active?;
        self.characters.iter().find(|c| c.id == id)
    }
}
