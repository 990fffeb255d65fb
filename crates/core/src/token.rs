//! Token - the atomic matchable unit

use crate::types::{Color, Pos, TokenId, TokenState, UpgradeType};

/// A colored token occupying one grid cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: TokenId,
    pub color: Color,
    /// Logical cell; always equals the slot the grid stores it in
    pub pos: Pos,
    pub state: TokenState,
    /// Part of a detected match awaiting break
    pub matched: bool,
    pub upgrade: UpgradeType,
    /// Designated to become (or stay) a special token at the next break
    pub should_upgrade: bool,
    /// Flood-fill scratch flag, cleared after every cascade pass
    pub visited: bool,
}

impl Token {
    pub fn new(id: TokenId, color: Color, pos: Pos) -> Self {
        Self {
            id,
            color,
            pos,
            state: TokenState::Idle,
            matched: false,
            upgrade: UpgradeType::None,
            should_upgrade: false,
            visited: false,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == TokenState::Idle
    }

    /// A special token that will fire when broken
    ///
    /// Tokens designated for an upgrade this turn do not fire; they survive
    /// the break instead.
    pub fn is_activatable(&self) -> bool {
        self.upgrade.is_special() && !self.should_upgrade
    }

    /// Mark this token to become `upgrade` when its match breaks
    ///
    /// Tokens that are already special keep their kind and fire instead.
    /// Returns whether the designation took.
    pub fn designate(&mut self, upgrade: UpgradeType) -> bool {
        if !upgrade.is_special() || self.upgrade.is_special() {
            return false;
        }
        self.upgrade = upgrade;
        self.should_upgrade = true;
        true
    }

    /// Clear per-check flags (`matched`, pending upgrade designation)
    ///
    /// Only plain tokens are ever designated, so dropping a designation
    /// makes the token plain again.
    pub fn reset_flags(&mut self) {
        self.matched = false;
        self.visited = false;
        if self.should_upgrade {
            self.should_upgrade = false;
            self.upgrade = UpgradeType::None;
        }
    }
}
