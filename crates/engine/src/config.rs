//! Battle configuration
//!
//! Loaded from JSON. Every field has a default, so `{}` is a playable
//! 8x8, 6-color encounter:
//!
//! ```json
//! {
//!   "board": { "width": 8, "height": 8, "color_count": 6 },
//!   "special_attack": { "full_charge": 30, "skip_bonus": 5 },
//!   "friendlies": [ { "name": "Sandra", "hp": 40, "atk": 3 } ],
//!   "encounter": {
//!     "spawnable_enemies": [ { "name": "Golem", "kind": "enemy", "hp": 30, "disrupts_board": true } ]
//!   },
//!   "instant_animations": true
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use wizmatch_core::{BalanceTable, Character, Grid, MultiAbilityProfile, SetupError, Stats};
use wizmatch_types::{
    CharacterAbility, CharacterId, CharacterKind, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH,
    DEFAULT_COLOR_COUNT, DEFAULT_FULL_CHARGE, SKIP_CHARGE_BONUS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            color_count: DEFAULT_COLOR_COUNT,
        }
    }
}

/// Special attack gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialAttackConfig {
    pub full_charge: u32,
    /// Charge gained by skipping a turn
    pub skip_bonus: u32,
}

impl Default for SpecialAttackConfig {
    fn default() -> Self {
        Self {
            full_charge: DEFAULT_FULL_CHARGE,
            skip_bonus: SKIP_CHARGE_BONUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterData {
    pub name: String,
    pub kind: CharacterKind,
    pub level: u32,
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    /// Animation layer per ability; empty for single-layer characters
    pub ability_layers: Vec<(CharacterAbility, u8)>,
    pub disrupts_board: bool,
}

impl Default for CharacterData {
    fn default() -> Self {
        Self {
            name: String::from("Adventurer"),
            kind: CharacterKind::Player,
            level: 0,
            hp: 30,
            atk: 2,
            def: 0,
            ability_layers: Vec::new(),
            disrupts_board: false,
        }
    }
}

impl CharacterData {
    pub fn new(name: &str, kind: CharacterKind, level: u32, hp: u32, atk: u32, def: u32) -> Self {
        Self {
            name: name.to_string(),
            kind,
            level,
            hp,
            atk,
            def,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), SetupError> {
        let invalid = |reason| SetupError::InvalidCharacter {
            name: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.hp == 0 {
            return Err(invalid("max hp must be positive"));
        }
        Ok(())
    }

    /// Instantiate with full hp under the given roster id
    pub fn to_character(&self, id: CharacterId) -> Character {
        let mut c = Character::new(
            id,
            self.name.clone(),
            self.kind,
            Stats::new(self.hp, self.atk, self.def),
        );
        c.level = self.level;
        c.disrupts_board = self.disrupts_board;
        if !self.ability_layers.is_empty() {
            c.profile = Some(MultiAbilityProfile::new(self.ability_layers.iter().copied()));
        }
        c
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Opening enemies; empty picks one from the spawn list
    pub enemies: Vec<CharacterData>,
    /// Pool the gauntlet draws from
    pub spawnable_enemies: Vec<CharacterData>,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        let slime = CharacterData::new("Slime", CharacterKind::Enemy, 0, 20, 2, 0);
        let mut golem = CharacterData::new("Golem", CharacterKind::Enemy, 1, 30, 2, 2);
        golem.disrupts_board = true;
        let mut lich = CharacterData::new("Lich", CharacterKind::Boss, 3, 45, 4, 1);
        lich.disrupts_board = true;
        Self {
            enemies: vec![slime.clone()],
            spawnable_enemies: vec![slime, golem, lich],
        }
    }
}

impl EncounterConfig {
    /// Gauntlet pick for `level`: the last entry whose level reaches `roll`
    ///
    /// Falls back to the first entry when none does.
    pub fn pick_spawn(&self, roll: u32) -> Option<&CharacterData> {
        self.spawnable_enemies
            .iter()
            .rev()
            .find(|c| c.level >= roll)
            .or_else(|| self.spawnable_enemies.first())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub board: BoardConfig,
    pub balance: BalanceTable,
    pub special_attack: SpecialAttackConfig,
    pub friendlies: Vec<CharacterData>,
    pub encounter: EncounterConfig,
    /// Acknowledge every animation at the start of each tick
    pub instant_animations: bool,
}

impl Default for BattleConfig {
    fn default() -> Self {
        let mut sandra = CharacterData::new("Sandra", CharacterKind::Player, 1, 40, 3, 1);
        sandra.ability_layers = vec![(CharacterAbility::Attack, 1), (CharacterAbility::Ultimate, 2)];
        Self {
            board: BoardConfig::default(),
            balance: BalanceTable::default(),
            special_attack: SpecialAttackConfig::default(),
            friendlies: vec![sandra],
            encounter: EncounterConfig::default(),
            instant_animations: true,
        }
    }
}

impl BattleConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SetupError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SetupError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        Grid::validate(self.board.width, self.board.height, self.board.color_count)?;

        if self.friendlies.is_empty() {
            return Err(SetupError::EmptyRoster);
        }
        if self.encounter.spawnable_enemies.is_empty() {
            return Err(SetupError::EmptySpawnList);
        }
        for f in &self.friendlies {
            f.validate()?;
            if !f.kind.is_friendly() {
                return Err(SetupError::InvalidCharacter {
                    name: f.name.clone(),
                    reason: "friendly roster entry is not a player",
                });
            }
        }
        for e in self
            .encounter
            .enemies
            .iter()
            .chain(&self.encounter.spawnable_enemies)
        {
            e.validate()?;
            if e.kind.is_friendly() {
                return Err(SetupError::InvalidCharacter {
                    name: e.name.clone(),
                    reason: "enemy entry is a player",
                });
            }
        }

        if self.special_attack.full_charge == 0 {
            log::warn!("full_charge is 0; the special attack is always available");
        }
        Ok(())
    }
}
