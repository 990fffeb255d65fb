//! Grid module - the token playfield
//!
//! The grid is a `width x height` matrix of optional tokens stored in a flat,
//! row-major `Vec` (`row * width + col`). A cell is empty only transiently,
//! between a break and the refill that follows it.
//!
//! Coordinates: `(col, row)` where col grows to the right and row grows
//! downward; gravity pulls toward the last row.

use std::fmt;

use crate::error::SetupError;
use crate::events::EventSink;
use crate::rng::ColorSource;
use crate::token::Token;
use crate::types::{
    Color, Direction, Event, Pos, TokenId, TokenState, UpgradeType, MAX_BOARD_DIM, MAX_COLORS,
    MIN_BOARD_DIM, MIN_COLOR_COUNT,
};

/// Rerolls tried per cell before settling on the first legal color
const MAX_REROLLS: u32 = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: u8,
    height: u8,
    color_count: u8,
    /// Flat array of cells, row-major order (row * width + col)
    cells: Vec<Option<Token>>,
    next_id: u32,
}

impl Grid {
    /// Check board dimensions and palette size
    pub fn validate(width: u8, height: u8, color_count: u8) -> Result<(), SetupError> {
        if width < MIN_BOARD_DIM || height < MIN_BOARD_DIM {
            return Err(SetupError::BoardTooSmall { width, height });
        }
        if width > MAX_BOARD_DIM || height > MAX_BOARD_DIM {
            return Err(SetupError::BoardTooLarge { width, height });
        }
        if color_count < MIN_COLOR_COUNT {
            return Err(SetupError::TooFewColors(color_count));
        }
        if color_count > MAX_COLORS {
            return Err(SetupError::TooManyColors(color_count));
        }
        Ok(())
    }

    /// Create a grid with every cell empty
    pub fn empty(width: u8, height: u8, color_count: u8) -> Result<Self, SetupError> {
        Self::validate(width, height, color_count)?;
        Ok(Self {
            width,
            height,
            color_count,
            cells: vec![None; width as usize * height as usize],
            next_id: 0,
        })
    }

    /// Fill a new grid with random tokens and no initial matches
    ///
    /// Cells are filled row-major, so only the western and northern
    /// neighbors exist when a cell is colored. A color equal to either of
    /// them is rerolled, which also rules out any 3-in-a-row.
    pub fn initialize(
        width: u8,
        height: u8,
        color_count: u8,
        rng: &mut impl ColorSource,
    ) -> Result<Self, SetupError> {
        let mut grid = Self::empty(width, height, color_count)?;

        for row in 0..height {
            for col in 0..width {
                let pos = Pos::new(col, row);
                let west = grid.neighbor(pos, Direction::Left).map(|t| t.color);
                let north = grid.neighbor(pos, Direction::Up).map(|t| t.color);
                let blocked = |c: Color| Some(c) == west || Some(c) == north;

                let mut color = rng.next_color(color_count);
                let mut rerolls = 0;
                while blocked(color) {
                    rerolls += 1;
                    if rerolls > MAX_REROLLS {
                        // At most two colors are blocked, so one is always free.
                        color = (0..color_count)
                            .map(Color)
                            .find(|c| !blocked(*c))
                            .unwrap_or(color);
                        break;
                    }
                    color = rng.next_color(color_count);
                }
                grid.spawn(pos, color);
            }
        }

        Ok(grid)
    }

    /// Build a grid with an exact color layout, one slice per row
    ///
    /// Every token starts idle. Intended for tests, benches and tooling.
    pub fn from_rows(rows: &[&[u8]], color_count: u8) -> Result<Self, SetupError> {
        let height = u8::try_from(rows.len())
            .map_err(|_| SetupError::Layout(format!("{} rows", rows.len())))?;
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let width =
            u8::try_from(width).map_err(|_| SetupError::Layout(format!("{} columns", width)))?;

        let mut grid = Self::empty(width, height, color_count)?;
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width as usize {
                return Err(SetupError::Layout(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    cells.len(),
                    width
                )));
            }
            for (col, &color) in cells.iter().enumerate() {
                if color >= color_count {
                    return Err(SetupError::Layout(format!(
                        "color {} at ({}, {}) exceeds palette of {}",
                        color, col, row, color_count
                    )));
                }
                grid.spawn(Pos::new(col as u8, row as u8), Color(color));
            }
        }
        Ok(grid)
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Pos) -> Option<usize> {
        if pos.col >= self.width || pos.row >= self.height {
            return None;
        }
        Some(pos.row as usize * self.width as usize + pos.col as usize)
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn color_count(&self) -> u8 {
        self.color_count
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        self.index(pos).is_some()
    }

    /// Token at `pos`, `None` if empty or out of bounds
    pub fn get(&self, pos: Pos) -> Option<&Token> {
        self.index(pos).and_then(|idx| self.cells[idx].as_ref())
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Token> {
        let idx = self.index(pos)?;
        self.cells[idx].as_mut()
    }

    pub fn color_at(&self, pos: Pos) -> Option<Color> {
        self.get(pos).map(|t| t.color)
    }

    /// In-bounds position one step away, occupied or not
    pub fn neighbor_pos(&self, pos: Pos, direction: Direction) -> Option<Pos> {
        pos.step(direction).filter(|p| self.in_bounds(*p))
    }

    /// Token one step away; `None` at edges and empty cells
    pub fn neighbor(&self, pos: Pos, direction: Direction) -> Option<&Token> {
        self.neighbor_pos(pos, direction).and_then(|p| self.get(p))
    }

    /// Exchange the occupants of two cells
    ///
    /// Adjacency is not checked. Returns false, changing nothing, if either
    /// position is out of bounds.
    pub fn swap(&mut self, a: Pos, b: Pos) -> bool {
        let (Some(ia), Some(ib)) = (self.index(a), self.index(b)) else {
            return false;
        };
        self.cells.swap(ia, ib);
        if let Some(token) = self.cells[ia].as_mut() {
            token.pos = a;
        }
        if let Some(token) = self.cells[ib].as_mut() {
            token.pos = b;
        }
        true
    }

    /// Place a new idle token into an empty cell
    pub fn spawn(&mut self, pos: Pos, color: Color) -> Option<TokenId> {
        let idx = self.index(pos)?;
        debug_assert!(self.cells[idx].is_none(), "spawn onto occupied cell {}", pos);
        if self.cells[idx].is_some() {
            return None;
        }
        let id = TokenId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.cells[idx] = Some(Token::new(id, color, pos));
        Some(id)
    }

    /// Take the token out of a cell
    pub fn remove(&mut self, pos: Pos) -> Option<Token> {
        let idx = self.index(pos)?;
        self.cells[idx].take()
    }

    /// Move a token into an empty cell
    pub fn move_token(&mut self, from: Pos, to: Pos) -> bool {
        let (Some(src), Some(dst)) = (self.index(from), self.index(to)) else {
            return false;
        };
        debug_assert!(self.cells[dst].is_none(), "move onto occupied cell {}", to);
        if self.cells[dst].is_some() || self.cells[src].is_none() {
            return false;
        }
        let mut token = self.cells[src].take();
        if let Some(t) = token.as_mut() {
            t.pos = to;
        }
        self.cells[dst] = token;
        true
    }

    /// Every occupied token is idle
    pub fn is_settled(&self) -> bool {
        self.tokens().all(Token::is_idle)
    }

    pub fn any_moving(&self) -> bool {
        self.tokens().any(|t| t.state == TokenState::Moving)
    }

    /// Flag the token at `pos` as in motion
    pub fn begin_motion(&mut self, pos: Pos) {
        if let Some(token) = self.get_mut(pos) {
            token.state = TokenState::Moving;
        }
    }

    /// Acknowledge that the view finished all pending token animations
    ///
    /// Moving tokens come to rest; destroying tokens leave the board.
    /// Returns the number of tokens removed.
    pub fn finish_animations(&mut self, sink: &mut dyn EventSink) -> usize {
        let mut removed = 0;
        for cell in self.cells.iter_mut() {
            let Some(token) = cell else { continue };
            match token.state {
                TokenState::Idle => {}
                TokenState::Moving => token.state = TokenState::Idle,
                TokenState::Destroying => {
                    sink.emit(Event::TokenDestroyed {
                        id: token.id,
                        pos: token.pos,
                    });
                    *cell = None;
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Clear `matched`, `visited` and pending upgrade flags on every token
    pub fn reset_flags(&mut self) {
        for token in self.tokens_mut() {
            token.reset_flags();
        }
    }

    pub fn clear_visited(&mut self) {
        for token in self.tokens_mut() {
            token.visited = false;
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.cells.iter().flatten()
    }

    pub fn tokens_mut(&mut self) -> impl Iterator<Item = &mut Token> {
        self.cells.iter_mut().flatten()
    }

    /// Every cell position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |col| Pos::new(col, row)))
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Color layout, one `Vec` per row
    pub fn colors(&self) -> Vec<Vec<Option<u8>>> {
        let width = self.width as usize;
        self.cells
            .chunks(width)
            .map(|row| row.iter().map(|c| c.as_ref().map(|t| t.color.0)).collect())
            .collect()
    }

    /// True if two orthogonally adjacent unmatched tokens share a color
    pub fn has_adjacent_pair(&self) -> bool {
        self.tokens().filter(|t| !t.matched).any(|t| {
            [Direction::Right, Direction::Down].iter().any(|&dir| {
                self.neighbor(t.pos, dir)
                    .is_some_and(|n| !n.matched && n.color == t.color)
            })
        })
    }

    /// Tokens carrying a special upgrade
    pub fn specials(&self) -> impl Iterator<Item = &Token> {
        self.tokens().filter(|t| t.upgrade != UpgradeType::None)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for cell in row {
                match cell {
                    None => write!(f, " . ")?,
                    Some(t) => {
                        let mark = match t.upgrade {
                            UpgradeType::None => ' ',
                            UpgradeType::Bomb => '*',
                            UpgradeType::Cross => '+',
                            UpgradeType::Turbo => '!',
                        };
                        write!(f, " {}{}", t.color, mark)?;
                    }
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::rng::SimpleRng;

    #[test]
    fn test_grid_index_calculation() {
        let grid = Grid::empty(8, 6, 6).unwrap();
        assert_eq!(grid.index(Pos::new(0, 0)), Some(0));
        assert_eq!(grid.index(Pos::new(7, 0)), Some(7));
        assert_eq!(grid.index(Pos::new(0, 1)), Some(8));
        assert_eq!(grid.index(Pos::new(7, 5)), Some(47));
        assert_eq!(grid.index(Pos::new(8, 0)), None);
        assert_eq!(grid.index(Pos::new(0, 6)), None);
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        assert!(matches!(
            Grid::validate(2, 8, 6),
            Err(SetupError::BoardTooSmall { .. })
        ));
        assert!(matches!(
            Grid::validate(8, 40, 6),
            Err(SetupError::BoardTooLarge { .. })
        ));
        assert!(matches!(
            Grid::validate(8, 8, 2),
            Err(SetupError::TooFewColors(2))
        ));
        assert!(matches!(
            Grid::validate(8, 8, 9),
            Err(SetupError::TooManyColors(9))
        ));
        assert!(Grid::validate(3, 3, 3).is_ok());
    }

    #[test]
    fn test_initialize_fills_every_cell() {
        let mut rng = SimpleRng::new(12345);
        let grid = Grid::initialize(8, 8, 6, &mut rng).unwrap();
        assert_eq!(grid.empty_count(), 0);
        assert!(grid.is_settled());
        assert!(grid.tokens().all(|t| t.color.0 < 6));
        assert!(!grid.has_adjacent_pair());
    }

    #[test]
    fn test_initialize_minimum_palette() {
        let mut rng = SimpleRng::new(5);
        let grid = Grid::initialize(3, 3, 3, &mut rng).unwrap();
        assert!(!grid.has_adjacent_pair());
    }

    #[test]
    fn test_token_positions_match_slots() {
        let mut rng = SimpleRng::new(77);
        let grid = Grid::initialize(5, 4, 4, &mut rng).unwrap();
        for pos in grid.positions() {
            assert_eq!(grid.get(pos).map(|t| t.pos), Some(pos));
        }
    }

    #[test]
    fn test_from_rows_layout_errors() {
        assert!(matches!(
            Grid::from_rows(&[&[0, 1, 2], &[0, 1], &[2, 0, 1]], 3),
            Err(SetupError::Layout(_))
        ));
        assert!(matches!(
            Grid::from_rows(&[&[0, 1, 2], &[0, 1]], 3),
            Err(SetupError::BoardTooSmall { width: 3, height: 2 })
        ));
        assert!(matches!(
            Grid::from_rows(&[&[0, 1, 5], &[0, 1, 2], &[0, 1, 2]], 3),
            Err(SetupError::Layout(_))
        ));
    }

    #[test]
    fn test_neighbor_at_edges() {
        let grid = Grid::from_rows(&[&[0, 1, 2], &[1, 2, 0], &[2, 0, 1]], 3).unwrap();
        let corner = Pos::new(0, 0);
        assert!(grid.neighbor(corner, Direction::Up).is_none());
        assert!(grid.neighbor(corner, Direction::Left).is_none());
        assert_eq!(grid.neighbor(corner, Direction::Right).unwrap().color, Color(1));
        assert_eq!(grid.neighbor(corner, Direction::Down).unwrap().color, Color(1));
        assert!(grid.neighbor(Pos::new(2, 2), Direction::Right).is_none());
        assert!(grid.neighbor(Pos::new(2, 2), Direction::Down).is_none());
    }

    #[test]
    fn test_swap_updates_positions() {
        let mut grid = Grid::from_rows(&[&[0, 1, 2], &[1, 2, 0], &[2, 0, 1]], 3).unwrap();
        let a = Pos::new(0, 0);
        let b = Pos::new(1, 0);
        let id_a = grid.get(a).unwrap().id;
        assert!(grid.swap(a, b));
        assert_eq!(grid.get(b).unwrap().id, id_a);
        assert_eq!(grid.get(b).unwrap().pos, b);
        assert_eq!(grid.color_at(a), Some(Color(1)));
        assert!(!grid.swap(a, Pos::new(3, 0)));
    }

    #[test]
    fn test_finish_animations_removes_destroying() {
        let mut grid = Grid::from_rows(&[&[0, 1, 2], &[1, 2, 0], &[2, 0, 1]], 3).unwrap();
        grid.begin_motion(Pos::new(0, 0));
        grid.get_mut(Pos::new(1, 1)).unwrap().state = TokenState::Destroying;
        assert!(!grid.is_settled());
        assert!(grid.any_moving());

        let mut events = Vec::new();
        assert_eq!(grid.finish_animations(&mut events), 1);
        assert!(grid.is_settled());
        assert!(grid.get(Pos::new(1, 1)).is_none());
        assert!(matches!(events[0], Event::TokenDestroyed { .. }));

        assert_eq!(grid.finish_animations(&mut NullSink), 0);
    }

    #[test]
    fn test_move_token_into_empty_cell() {
        let mut grid = Grid::from_rows(&[&[0, 1, 2], &[1, 2, 0], &[2, 0, 1]], 3).unwrap();
        grid.remove(Pos::new(0, 2));
        assert!(grid.move_token(Pos::new(0, 1), Pos::new(0, 2)));
        assert_eq!(grid.get(Pos::new(0, 2)).unwrap().pos, Pos::new(0, 2));
        assert!(grid.get(Pos::new(0, 1)).is_none());
    }

    #[test]
    fn test_display_marks_specials() {
        let mut grid = Grid::from_rows(&[&[0, 1, 2], &[1, 2, 0], &[2, 0, 1]], 3).unwrap();
        grid.get_mut(Pos::new(0, 0)).unwrap().upgrade = UpgradeType::Turbo;
        grid.remove(Pos::new(2, 2));
        let text = grid.to_string();
        assert!(text.starts_with(" 0!"));
        assert!(text.trim_end().ends_with('.'));
    }
}
