//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the simulation.
//! All types are plain data with no behavior beyond small conversions, making
//! them usable in any context (board logic, turn sequencing, view layers).
//!
//! # Board Dimensions
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_BOARD_WIDTH` | 8 | Columns on the default board |
//! | `DEFAULT_BOARD_HEIGHT` | 8 | Rows on the default board |
//! | `DEFAULT_COLOR_COUNT` | 6 | Token colors on the default board |
//! | `MIN_BOARD_DIM` | 3 | Smallest legal width/height |
//! | `MAX_BOARD_DIM` | 32 | Largest legal width/height |
//! | `MIN_COLOR_COUNT` | 3 | Fewer colors cannot avoid forced matches |
//! | `MAX_COLORS` | 8 | Distinct token colors available |
//!
//! Coordinates are `(col, row)`: `col` grows to the right, `row` grows
//! downward, so row 0 is the top of the board and gravity pulls toward
//! larger rows.
//!
//! # Example
//!
//! ```
//! use wizmatch_types::{Direction, MatchType, Pos, UpgradeType};
//!
//! let pos = Pos::new(3, 4);
//! assert_eq!(pos.step(Direction::Up), Some(Pos::new(3, 3)));
//! assert_eq!(Pos::new(0, 0).step(Direction::Left), None);
//!
//! assert_eq!(MatchType::Five.upgrade(), UpgradeType::Turbo);
//! assert!(MatchType::Cross > MatchType::Four);
//!
//! assert_eq!(Direction::from_str("left"), Some(Direction::Left));
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default board width in columns
pub const DEFAULT_BOARD_WIDTH: u8 = 8;

/// Default board height in rows
pub const DEFAULT_BOARD_HEIGHT: u8 = 8;

/// Default number of token colors
pub const DEFAULT_COLOR_COUNT: u8 = 6;

/// Smallest legal board width/height
pub const MIN_BOARD_DIM: u8 = 3;

/// Largest legal board width/height
pub const MAX_BOARD_DIM: u8 = 32;

/// Fewest colors that can fill a board without forced matches
pub const MIN_COLOR_COUNT: u8 = 3;

/// Number of distinct token colors
pub const MAX_COLORS: u8 = 8;

/// Special attack gauge capacity
pub const DEFAULT_FULL_CHARGE: u32 = 30;

/// Charge granted for passing a turn
pub const SKIP_CHARGE_BONUS: u32 = 5;

/// Attempts a board-disrupting enemy makes to find a harmless swap
pub const DISRUPT_ATTEMPTS: u32 = 64;

/// Token color index (`0..color_count`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u8);

impl Color {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cell coordinate on the board
///
/// Ordering is row-major (top row first, then left to right) so that sets of
/// positions iterate in the same order the board is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub col: u8,
    pub row: u8,
}

impl Pos {
    pub const fn new(col: u8, row: u8) -> Self {
        Self { col, row }
    }

    /// Step one cell in `direction`
    ///
    /// Returns `None` when the step would leave the top or left edge.
    /// The bottom/right edges depend on the board size and are checked there.
    pub fn step(self, direction: Direction) -> Option<Pos> {
        let (dc, dr) = direction.delta();
        self.offset(dc, dr)
    }

    /// Offset by a signed delta, `None` below zero
    pub fn offset(self, dc: i8, dr: i8) -> Option<Pos> {
        let col = self.col.checked_add_signed(dc)?;
        let row = self.row.checked_add_signed(dr)?;
        Some(Pos { col, row })
    }

    /// True if `other` shares an edge with this position
    pub fn is_adjacent(self, other: Pos) -> bool {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row) == 1
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Compass direction on the board
///
/// - **Up**: toward row 0
/// - **Down**: toward the last row (the direction of gravity)
/// - **Left**: toward column 0
/// - **Right**: toward the last column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// `(dcol, drow)` for one step in this direction
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The direction pointing back where we came from
    ///
    /// # Examples
    ///
    /// ```
    /// use wizmatch_types::Direction;
    ///
    /// assert_eq!(Direction::Up.opposite(), Direction::Down);
    /// assert_eq!(Direction::Left.opposite(), Direction::Right);
    /// ```
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Parse direction from string
    ///
    /// Accepts full names or single letters (case-insensitive):
    /// "up" | "u", "down" | "d", "left" | "l", "right" | "r"
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Stable identity of a token for the lifetime of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub u32);

/// Logical motion state of a token
///
/// The core never interpolates positions. A token is `Moving` from the moment
/// it is swapped, dropped or spawned until the view acknowledges the motion,
/// and `Destroying` from the break until the view acknowledges the removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    Idle,
    Moving,
    Destroying,
}

/// Shape of a match, ordered by value
///
/// The derived ordering is the scoring order used to pick the
/// "highest scoring" token of a cluster: `None < Three < Four < Cross < Five`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    None,
    Three,
    Four,
    Cross,
    Five,
}

impl MatchType {
    /// Special token created by a match of this shape
    pub fn upgrade(self) -> UpgradeType {
        match self {
            MatchType::None | MatchType::Three => UpgradeType::None,
            MatchType::Four => UpgradeType::Bomb,
            MatchType::Cross => UpgradeType::Cross,
            MatchType::Five => UpgradeType::Turbo,
        }
    }

    pub fn is_match(self) -> bool {
        self != MatchType::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::None => "none",
            MatchType::Three => "three",
            MatchType::Four => "four",
            MatchType::Cross => "cross",
            MatchType::Five => "five",
        }
    }
}

/// Special token kind
///
/// - **Bomb**: clears the 8 surrounding cells
/// - **Cross**: clears its whole row and column
/// - **Turbo**: clears every token of its color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeType {
    #[default]
    None,
    Bomb,
    Cross,
    Turbo,
}

impl UpgradeType {
    pub fn is_special(self) -> bool {
        self != UpgradeType::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeType::None => "none",
            UpgradeType::Bomb => "bomb",
            UpgradeType::Cross => "cross",
            UpgradeType::Turbo => "turbo",
        }
    }
}

/// States of the turn state machine
///
/// ```text
/// Ready -> CheckSwipe -> Return -> Ready
///                     -> Matching -> WaitForCascade -> Cascade -> FinalCheck
/// FinalCheck -> Cascade | AttackExecuting
/// AttackExecuting -> WaitGeneral -> Ready | EnemyTurn
/// EnemyTurn -> AttackExecuting
/// any -> Win
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Ready,
    CheckSwipe,
    Return,
    Matching,
    WaitForCascade,
    Cascade,
    FinalCheck,
    AttackExecuting,
    WaitGeneral,
    EnemyTurn,
    Win,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnState::Ready => "ready",
            TurnState::CheckSwipe => "check_swipe",
            TurnState::Return => "return",
            TurnState::Matching => "matching",
            TurnState::WaitForCascade => "wait_for_cascade",
            TurnState::Cascade => "cascade",
            TurnState::FinalCheck => "final_check",
            TurnState::AttackExecuting => "attack_executing",
            TurnState::WaitGeneral => "wait_general",
            TurnState::EnemyTurn => "enemy_turn",
            TurnState::Win => "win",
        }
    }

    /// True while the board is resolving a swipe
    pub fn is_resolving(&self) -> bool {
        matches!(
            self,
            TurnState::CheckSwipe
                | TurnState::Matching
                | TurnState::WaitForCascade
                | TurnState::Cascade
                | TurnState::FinalCheck
        )
    }
}

/// Index of a character in the battle roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u16);

impl CharacterId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which side a character fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterKind {
    #[default]
    Player,
    Enemy,
    Boss,
}

impl CharacterKind {
    pub fn is_friendly(self) -> bool {
        self == CharacterKind::Player
    }

    /// True if `other` fights on the opposite side
    pub fn opposes(self, other: CharacterKind) -> bool {
        self.is_friendly() != other.is_friendly()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CharacterKind::Player => "player",
            CharacterKind::Enemy => "enemy",
            CharacterKind::Boss => "boss",
        }
    }
}

/// Ability a character will use on its next action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterAbility {
    #[default]
    Attack,
    Support,
    Ultimate,
    Other,
}

/// Animation state reported back by the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterState {
    Idle,
    Attacking,
    Hurt,
    Dead,
}

impl CharacterState {
    /// Dead characters never animate again, so they count as still
    pub fn is_still(self) -> bool {
        matches!(self, CharacterState::Idle | CharacterState::Dead)
    }
}

/// Character animations the view is asked to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    Idle,
    Attack,
    Damage,
    Death,
    Win,
    UltimateStart,
}

/// Result of a finished encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every enemy reached 0 hp
    Victory,
    /// Every friendly reached 0 hp
    Defeat,
}

/// Commands issued by the view layer
///
/// Commands are queued and consumed by the turn state machine in `Ready`.
/// Invalid commands are dropped without changing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Swap the token at `pos` with its neighbor in `direction`
    RequestSwipe { pos: Pos, direction: Direction },
    /// Drop any commands still waiting in the queue
    CancelSelection,
    /// Spend a full special gauge to charge the active character's ultimate
    TriggerSpecialAttack,
    /// Pass the turn in exchange for gauge charge
    TriggerSkipTurn,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::RequestSwipe { .. } => "requestSwipe",
            Command::CancelSelection => "cancelSelection",
            Command::TriggerSpecialAttack => "triggerSpecialAttack",
            Command::TriggerSkipTurn => "triggerSkipTurn",
        }
    }
}

/// Core-to-view notifications
///
/// Emitted in the order the simulation performs the underlying changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    TokenSpawned {
        id: TokenId,
        pos: Pos,
        color: Color,
    },
    TokenMoved {
        id: TokenId,
        from: Pos,
        to: Pos,
    },
    /// Token flagged for destruction; removal follows the view acknowledgement
    TokenBreaking {
        id: TokenId,
        pos: Pos,
        color: Color,
    },
    TokenDestroyed {
        id: TokenId,
        pos: Pos,
    },
    TokenUpgraded {
        id: TokenId,
        pos: Pos,
        upgrade: UpgradeType,
    },
    SpecialActivated {
        pos: Pos,
        upgrade: UpgradeType,
        affected: u32,
    },
    MatchCleared {
        combo: u32,
        tokens: u32,
    },
    TurnStateChanged {
        from: TurnState,
        to: TurnState,
    },
    CharacterStatChanged {
        id: CharacterId,
        hp: u32,
        max_hp: u32,
    },
    AnimationTrigger {
        id: CharacterId,
        animation: Animation,
    },
    AbilityChanged {
        id: CharacterId,
        ability: CharacterAbility,
        layer: Option<u8>,
    },
    ChargeChanged {
        charge: u32,
        full: u32,
    },
    TurnAdvanced {
        active: CharacterId,
        turn: u32,
    },
    EncounterFinished {
        outcome: Outcome,
    },
    LevelAdvanced {
        level: u32,
    },
}
