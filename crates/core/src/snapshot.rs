//! Serializable board snapshots for views and tooling

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::{Color, Pos, TokenId, TokenState, UpgradeType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub id: TokenId,
    pub color: Color,
    pub upgrade: UpgradeType,
    pub state: TokenState,
}

/// Row-major copy of every cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
    pub cells: Vec<Vec<Option<TokenSnapshot>>>,
}

impl From<&Grid> for BoardSnapshot {
    fn from(grid: &Grid) -> Self {
        let cells = (0..grid.height())
            .map(|row| {
                (0..grid.width())
                    .map(|col| {
                        grid.get(Pos::new(col, row))
                            .map(|t| TokenSnapshot {
                                id: t.id,
                                color: t.color,
                                upgrade: t.upgrade,
                                state: t.state,
                            })
                    })
                    .collect()
            })
            .collect();
        Self {
            width: grid.width(),
            height: grid.height(),
            color_count: grid.color_count(),
            cells,
        }
    }
}

impl BoardSnapshot {
    /// Colors only, `None` for empty cells
    pub fn colors(&self) -> Vec<Vec<Option<u8>>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.map(|t| t.color.0)).collect())
            .collect()
    }
}
