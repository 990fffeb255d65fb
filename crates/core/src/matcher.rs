//! Match detection
//!
//! Pure functions over a [`Grid`]. Nothing here mutates the board; the
//! [`Board`](crate::board::Board) applies results.
//!
//! # Counting
//!
//! From an origin token, [`count_line`] walks one direction while the
//! neighbor shares the origin's color and is not already matched. The four
//! counts are summed per axis (`x = left + right`, `y = up + down`), so a
//! straight run of length `L` through the origin gives `L - 1` on its axis.
//!
//! | x / y counts                  | MatchType |
//! |-------------------------------|-----------|
//! | either >= 4                   | Five      |
//! | either == 3, other < 2        | Four      |
//! | both >= 2                     | Cross     |
//! | either == 2                   | Three     |
//! | otherwise                     | None      |
//!
//! Stopping at already-matched neighbors makes results depend on the order
//! origins are checked in. Whole-board checks always scan row-major.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{Direction, MatchType, Pos, MAX_BOARD_DIM};

/// Same-color neighbors found in one direction, nearest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineRun {
    pub count: u8,
    pub tokens: ArrayVec<Pos, { MAX_BOARD_DIM as usize }>,
}

/// Outcome of checking a single origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub match_type: MatchType,
    /// Token checked; candidate for the upgrade
    pub primary: Pos,
    /// Every token in the match, origin included. Empty when no match.
    pub affected: BTreeSet<Pos>,
}

impl MatchResult {
    pub fn none(primary: Pos) -> Self {
        Self {
            match_type: MatchType::None,
            primary,
            affected: BTreeSet::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.match_type.is_match()
    }
}

/// Count same-color, unmatched neighbors from `pos` toward `direction`
pub fn count_line(grid: &Grid, pos: Pos, direction: Direction) -> LineRun {
    let mut run = LineRun::default();
    let Some(origin) = grid.get(pos) else {
        return run;
    };
    let color = origin.color;

    let mut cursor = pos;
    while let Some(next) = grid.neighbor(cursor, direction) {
        if next.color != color || next.matched {
            break;
        }
        cursor = next.pos;
        run.count += 1;
        run.tokens.push(cursor);
    }
    run
}

/// Classify a match from its horizontal and vertical neighbor counts
///
/// ```
/// use wizmatch_core::matcher::classify;
/// use wizmatch_core::types::MatchType;
///
/// assert_eq!(classify(2, 0), MatchType::Three);
/// assert_eq!(classify(3, 0), MatchType::Four);
/// assert_eq!(classify(4, 0), MatchType::Five);
/// assert_eq!(classify(2, 2), MatchType::Cross);
/// assert_eq!(classify(1, 1), MatchType::None);
/// ```
pub fn classify(x_count: u8, y_count: u8) -> MatchType {
    if x_count >= 4 || y_count >= 4 {
        MatchType::Five
    } else if x_count == 3 || y_count == 3 {
        if x_count >= 2 && y_count >= 2 {
            MatchType::Cross
        } else {
            MatchType::Four
        }
    } else if x_count >= 2 && y_count >= 2 {
        MatchType::Cross
    } else if x_count == 2 || y_count == 2 {
        MatchType::Three
    } else {
        MatchType::None
    }
}

/// Evaluate the match formed around `pos`
///
/// The longer axis contributes its tokens and the shorter one is dropped,
/// even when it would form a line of its own. Equal axes both count.
pub fn check_token(grid: &Grid, pos: Pos) -> MatchResult {
    if grid.get(pos).is_none() {
        return MatchResult::none(pos);
    }

    let left = count_line(grid, pos, Direction::Left);
    let right = count_line(grid, pos, Direction::Right);
    let up = count_line(grid, pos, Direction::Up);
    let down = count_line(grid, pos, Direction::Down);

    let x = left.count + right.count;
    let y = up.count + down.count;
    let match_type = classify(x, y);
    if !match_type.is_match() {
        return MatchResult::none(pos);
    }

    let mut affected = BTreeSet::new();
    affected.insert(pos);
    if x >= y {
        affected.extend(left.tokens.iter().chain(right.tokens.iter()).copied());
    }
    if y >= x {
        affected.extend(up.tokens.iter().chain(down.tokens.iter()).copied());
    }

    MatchResult {
        match_type,
        primary: pos,
        affected,
    }
}

/// A swap that produces a match, with the best shape it creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeHint {
    pub pos: Pos,
    pub direction: Direction,
    pub match_type: MatchType,
    /// Tokens the better of the two swapped cells would clear
    pub size: usize,
}

/// Score a swap of `pos` with its neighbor, restoring the grid afterwards
fn evaluate_swap(scratch: &mut Grid, pos: Pos, direction: Direction) -> Option<SwipeHint> {
    let other = scratch.neighbor_pos(pos, direction)?;
    scratch.get(other)?;
    if scratch.color_at(pos) == scratch.color_at(other) {
        return None;
    }

    scratch.swap(pos, other);
    let a = check_token(scratch, pos);
    let b = check_token(scratch, other);
    scratch.swap(pos, other);

    let best = if (b.match_type, b.affected.len()) > (a.match_type, a.affected.len()) {
        b
    } else {
        a
    };
    best.is_match().then(|| SwipeHint {
        pos,
        direction,
        match_type: best.match_type,
        size: best.affected.len(),
    })
}

/// First swap (row-major, rightward before downward) that makes a match
pub fn find_swipe(grid: &Grid) -> Option<SwipeHint> {
    let mut scratch = grid.clone();
    scratch.reset_flags();
    grid.positions().find_map(|pos| {
        [Direction::Right, Direction::Down]
            .into_iter()
            .find_map(|dir| evaluate_swap(&mut scratch, pos, dir))
    })
}

/// Swap with the highest scoring match; earliest wins ties
pub fn best_swipe(grid: &Grid) -> Option<SwipeHint> {
    let mut scratch = grid.clone();
    scratch.reset_flags();
    let mut best: Option<SwipeHint> = None;
    for pos in grid.positions() {
        for dir in [Direction::Right, Direction::Down] {
            if let Some(hint) = evaluate_swap(&mut scratch, pos, dir) {
                let better = best.map_or(true, |b| {
                    (hint.match_type, hint.size) > (b.match_type, b.size)
                });
                if better {
                    best = Some(hint);
                }
            }
        }
    }
    best
}
