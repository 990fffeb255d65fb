//! Special token activation
//!
//! When a special token breaks it pulls more tokens into the break:
//!
//! - **Bomb**: the 8 surrounding cells
//! - **Cross**: its entire row and column
//! - **Turbo**: every token sharing its color
//!
//! Specials reached this way fire too. Chains are resolved with an explicit
//! worklist; a token already in the break set is never added again, so
//! every special fires at most once and mutual references terminate.

use std::collections::BTreeSet;

use crate::combat::{BalanceTable, TurnContext};
use crate::events::EventSink;
use crate::grid::Grid;
use crate::types::{Event, Pos, UpgradeType};

/// Cells an activation at `origin` reaches, excluding `origin` itself
pub fn blast_area(grid: &Grid, origin: Pos, upgrade: UpgradeType) -> Vec<Pos> {
    match upgrade {
        UpgradeType::None => Vec::new(),
        UpgradeType::Bomb => (-1i8..=1)
            .flat_map(|dr| (-1i8..=1).map(move |dc| (dc, dr)))
            .filter(|&(dc, dr)| (dc, dr) != (0, 0))
            .filter_map(|(dc, dr)| origin.offset(dc, dr))
            .filter(|p| grid.in_bounds(*p))
            .collect(),
        UpgradeType::Cross => {
            let row = (0..grid.width()).map(|col| Pos::new(col, origin.row));
            let col = (0..grid.height()).map(|row| Pos::new(origin.col, row));
            row.chain(col).filter(|p| *p != origin).collect()
        }
        UpgradeType::Turbo => {
            let Some(color) = grid.color_at(origin) else {
                return Vec::new();
            };
            grid.tokens()
                .filter(|t| t.color == color && t.pos != origin)
                .map(|t| t.pos)
                .collect()
        }
    }
}

/// Fire the special token at `origin` and everything it chains into
///
/// Newly reached positions are added to `break_set` and returned. Each
/// activation raises `ctx.special_token_modifier` by its
/// [`BalanceTable::activation_bonus`] and emits `SpecialActivated`.
pub fn expand_upgrade(
    grid: &Grid,
    origin: Pos,
    break_set: &mut BTreeSet<Pos>,
    ctx: &mut TurnContext,
    balance: &BalanceTable,
    sink: &mut dyn EventSink,
) -> BTreeSet<Pos> {
    let mut added = BTreeSet::new();
    let mut activated = BTreeSet::new();
    let mut worklist = vec![origin];

    while let Some(pos) = worklist.pop() {
        if !activated.insert(pos) {
            continue;
        }
        let Some(token) = grid.get(pos) else { continue };
        if !token.is_activatable() {
            continue;
        }
        let upgrade = token.upgrade;

        let mut reached = 0;
        for target in blast_area(grid, pos, upgrade) {
            let Some(hit) = grid.get(target) else { continue };
            if !break_set.insert(target) {
                continue;
            }
            added.insert(target);
            reached += 1;
            if hit.is_activatable() {
                worklist.push(target);
            }
        }

        ctx.special_token_modifier += balance.activation_bonus(upgrade);
        log::trace!("{} at {} reached {} tokens", upgrade.as_str(), pos, reached);
        sink.emit(Event::SpecialActivated {
            pos,
            upgrade,
            affected: reached,
        });
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;

    fn grid() -> Grid {
        Grid::from_rows(
            &[
                &[0, 1, 2, 3, 4],
                &[1, 2, 3, 4, 0],
                &[2, 3, 4, 0, 1],
                &[3, 4, 0, 1, 2],
                &[4, 0, 1, 2, 3],
            ],
            5,
        )
        .unwrap()
    }

    fn special(grid: &mut Grid, pos: Pos, upgrade: UpgradeType) {
        grid.get_mut(pos).unwrap().upgrade = upgrade;
    }

    #[test]
    fn test_bomb_area() {
        let g = grid();
        assert_eq!(blast_area(&g, Pos::new(2, 2), UpgradeType::Bomb).len(), 8);
        assert_eq!(blast_area(&g, Pos::new(0, 0), UpgradeType::Bomb).len(), 3);
        assert_eq!(blast_area(&g, Pos::new(4, 2), UpgradeType::Bomb).len(), 5);
    }

    #[test]
    fn test_cross_area() {
        let g = grid();
        let area = blast_area(&g, Pos::new(1, 3), UpgradeType::Cross);
        assert_eq!(area.len(), 8);
        assert!(area.iter().all(|p| p.row == 3 || p.col == 1));
    }

    #[test]
    fn test_turbo_area_same_color() {
        let g = grid();
        let area = blast_area(&g, Pos::new(0, 0), UpgradeType::Turbo);
        assert_eq!(area.len(), 4);
        assert!(area.iter().all(|p| g.color_at(*p) == g.color_at(Pos::new(0, 0))));
    }

    #[test]
    fn test_expand_bomb_raises_modifier() {
        let mut g = grid();
        special(&mut g, Pos::new(2, 2), UpgradeType::Bomb);
        let mut set = BTreeSet::from([Pos::new(2, 2)]);
        let mut ctx = TurnContext::default();
        let mut events = Vec::new();

        let added = expand_upgrade(
            &g,
            Pos::new(2, 2),
            &mut set,
            &mut ctx,
            &BalanceTable::default(),
            &mut events,
        );
        assert_eq!(added.len(), 8);
        assert_eq!(set.len(), 9);
        assert_eq!(ctx.special_token_modifier, 2);
        assert_eq!(
            events,
            vec![Event::SpecialActivated {
                pos: Pos::new(2, 2),
                upgrade: UpgradeType::Bomb,
                affected: 8
            }]
        );
    }

    #[test]
    fn test_bomb_and_cross_chain_once() {
        let mut g = grid();
        special(&mut g, Pos::new(2, 2), UpgradeType::Bomb);
        special(&mut g, Pos::new(3, 2), UpgradeType::Cross);
        let mut set = BTreeSet::from([Pos::new(2, 2)]);
        let mut ctx = TurnContext::default();

        expand_upgrade(
            &g,
            Pos::new(2, 2),
            &mut set,
            &mut ctx,
            &BalanceTable::default(),
            &mut NullSink,
        );

        // 3x3 around the bomb plus row 2 and column 3.
        let mut expected: BTreeSet<Pos> = (1..=3)
            .flat_map(|r| (1..=3).map(move |c| Pos::new(c, r)))
            .collect();
        expected.extend((0..5).map(|c| Pos::new(c, 2)));
        expected.extend((0..5).map(|r| Pos::new(3, r)));
        assert_eq!(set, expected);
        assert_eq!(ctx.special_token_modifier, 1 + 1 + 2);
    }

    #[test]
    fn test_mutual_references_terminate() {
        let mut g = grid();
        special(&mut g, Pos::new(0, 0), UpgradeType::Cross);
        special(&mut g, Pos::new(4, 0), UpgradeType::Cross);
        special(&mut g, Pos::new(0, 4), UpgradeType::Cross);
        special(&mut g, Pos::new(4, 4), UpgradeType::Cross);
        let mut set = BTreeSet::from([Pos::new(0, 0)]);
        let mut ctx = TurnContext::default();
        let mut events = Vec::new();

        expand_upgrade(
            &g,
            Pos::new(0, 0),
            &mut set,
            &mut ctx,
            &BalanceTable::default(),
            &mut events,
        );
        assert_eq!(events.len(), 4);
        assert_eq!(ctx.special_token_modifier, 1 + 4 * 2);
        assert_eq!(set.len(), 16);
    }

    #[test]
    fn test_upgrading_token_does_not_fire() {
        let mut g = grid();
        special(&mut g, Pos::new(2, 2), UpgradeType::Bomb);
        g.get_mut(Pos::new(2, 2)).unwrap().should_upgrade = true;
        let mut set = BTreeSet::from([Pos::new(2, 2)]);
        let mut ctx = TurnContext::default();

        let added = expand_upgrade(
            &g,
            Pos::new(2, 2),
            &mut set,
            &mut ctx,
            &BalanceTable::default(),
            &mut NullSink,
        );
        assert!(added.is_empty());
        assert_eq!(ctx.special_token_modifier, 1);
    }
}
