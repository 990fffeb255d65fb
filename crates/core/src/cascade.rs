//! Cascade engine - gravity, refill and chain detection
//!
//! After a break the destroyed tokens leave holes. [`repopulate`] compacts
//! each column toward the bottom and spawns fresh tokens into the empty
//! cells left at the top. Every token that moved or spawned lands in the
//! board's re-check set, and [`cascade`] looks for chain matches among
//! them only.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::events::EventSink;
use crate::grid::Grid;
use crate::matcher::{check_token, MatchResult};
use crate::rng::ColorSource;
use crate::types::{Direction, Event, Pos};

/// Apply gravity and refill every column
///
/// Returns the positions of every token that moved or spawned. Those
/// tokens are left `Moving` until the view acknowledges them.
pub fn repopulate(
    grid: &mut Grid,
    colors: &mut (impl ColorSource + ?Sized),
    sink: &mut dyn EventSink,
) -> BTreeSet<Pos> {
    let mut touched = BTreeSet::new();
    let height = grid.height();
    let color_count = grid.color_count();

    for col in 0..grid.width() {
        // Two-pointer compaction: `write` is the lowest free row.
        let mut write = height;
        for read in (0..height).rev() {
            let from = Pos::new(col, read);
            let Some(id) = grid.get(from).map(|t| t.id) else {
                continue;
            };
            write -= 1;
            if write != read {
                let to = Pos::new(col, write);
                let moved = grid.move_token(from, to);
                debug_assert!(moved, "gravity target {} occupied", to);
                grid.begin_motion(to);
                sink.emit(Event::TokenMoved { id, from, to });
                touched.insert(to);
            }
        }

        // Everything above `write` is now empty.
        for row in 0..write {
            let pos = Pos::new(col, row);
            let color = colors.next_color(color_count);
            if let Some(id) = grid.spawn(pos, color) {
                grid.begin_motion(pos);
                sink.emit(Event::TokenSpawned { id, pos, color });
                touched.insert(pos);
            }
        }
    }

    touched
}

/// Collect the same-color component around `start`
///
/// Depth-first over unmatched, unvisited tokens of the start color. A step
/// never heads straight back the way it came. Every collected token is
/// left `visited`; callers clear the flags after the pass.
pub fn flood_component(grid: &mut Grid, start: Pos) -> Vec<Pos> {
    let mut component = Vec::new();
    let color = match grid.get(start) {
        Some(t) if !t.matched && !t.visited => t.color,
        _ => return component,
    };

    let mut stack: Vec<(Pos, Option<Direction>)> = vec![(start, None)];
    if let Some(t) = grid.get_mut(start) {
        t.visited = true;
    }

    while let Some((pos, came_from)) = stack.pop() {
        debug_assert!(!component.contains(&pos), "flood revisited {}", pos);
        component.push(pos);

        for dir in Direction::ALL {
            if came_from == Some(dir.opposite()) {
                continue;
            }
            let Some(next) = grid.neighbor_pos(pos, dir) else {
                continue;
            };
            let Some(token) = grid.get_mut(next) else {
                continue;
            };
            if token.color != color || token.matched || token.visited {
                continue;
            }
            token.visited = true;
            stack.push((next, Some(dir)));
        }
    }

    component
}

/// Highest scoring match in a component; first encountered wins ties
fn best_in_component(grid: &Grid, component: &[Pos]) -> Option<MatchResult> {
    let mut best: Option<MatchResult> = None;
    for &pos in component {
        let result = check_token(grid, pos);
        if !result.is_match() {
            continue;
        }
        if best
            .as_ref()
            .map_or(true, |b| result.match_type > b.match_type)
        {
            best = Some(result);
        }
    }
    best
}

/// Run one chain-detection pass over the board's re-check set
///
/// Each component of three or more same-color tokens contributes its best
/// match to the pending break set. Returns whether anything matched.
pub fn cascade(board: &mut Board) -> bool {
    let recheck = std::mem::take(&mut board.recheck);
    let mut found = false;

    for start in recheck {
        let component = flood_component(&mut board.grid, start);
        if component.len() < 3 {
            continue;
        }
        if let Some(result) = best_in_component(&board.grid, &component) {
            log::trace!(
                "cascade: {} match at {} ({} tokens)",
                result.match_type.as_str(),
                result.primary,
                result.affected.len()
            );
            board.apply_match(&result);
            found = true;
        }
    }

    board.grid.clear_visited();
    found
}
