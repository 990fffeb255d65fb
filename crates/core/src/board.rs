//! Board - grid plus match bookkeeping for the current turn
//!
//! The [`Board`] owns the [`Grid`], the pending break set built up by match
//! checks, the re-check set filled by refills, and the [`TurnContext`]
//! counters that later feed the damage formula.
//!
//! # Break cycle
//!
//! 1. [`Board::check_token`] / [`Board::check_whole_board`] /
//!    [`Board::cascade`] mark tokens `matched` and add them to the pending set
//! 2. [`Board::break_and_score`] fires special tokens, flags the rest
//!    `Destroying` and updates the turn counters
//! 3. The view acknowledges ([`Grid::finish_animations`]), removing them
//! 4. [`Board::repopulate`] drops tokens into the holes and refills
//! 5. Back to 1 until nothing matches

use std::collections::BTreeSet;

use crate::cascade;
use crate::combat::{BalanceTable, TurnContext};
use crate::events::EventSink;
use crate::grid::Grid;
use crate::matcher::{self, MatchResult};
use crate::rng::{ColorSource, SimpleRng};
use crate::types::{Event, Pos, TokenState, UpgradeType, DISRUPT_ATTEMPTS};
use crate::upgrade::expand_upgrade;

#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) grid: Grid,
    /// Tokens awaiting the next break
    pub(crate) pending: BTreeSet<Pos>,
    /// Tokens moved or spawned since the last cascade pass
    pub(crate) recheck: BTreeSet<Pos>,
    pub(crate) ctx: TurnContext,
    balance: BalanceTable,
}

impl Board {
    pub fn new(grid: Grid, balance: BalanceTable) -> Self {
        Self {
            grid,
            pending: BTreeSet::new(),
            recheck: BTreeSet::new(),
            ctx: TurnContext::default(),
            balance,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn pending(&self) -> &BTreeSet<Pos> {
        &self.pending
    }

    pub fn recheck(&self) -> &BTreeSet<Pos> {
        &self.recheck
    }

    pub fn context(&self) -> &TurnContext {
        &self.ctx
    }

    pub fn balance(&self) -> &BalanceTable {
        &self.balance
    }

    pub fn reset_context(&mut self) {
        self.ctx.reset();
    }

    pub fn is_settled(&self) -> bool {
        self.grid.is_settled()
    }

    /// Check one origin and record any match it forms
    pub fn check_token(&mut self, pos: Pos) -> MatchResult {
        let result = matcher::check_token(&self.grid, pos);
        if result.is_match() {
            self.apply_match(&result);
        }
        result
    }

    /// Mark a match, designate its upgrade and queue it for breaking
    pub fn apply_match(&mut self, result: &MatchResult) {
        for &pos in &result.affected {
            if let Some(token) = self.grid.get_mut(pos) {
                token.matched = true;
            }
        }
        if let Some(primary) = self.grid.get_mut(result.primary) {
            primary.designate(result.match_type.upgrade());
        }
        self.pending.extend(result.affected.iter().copied());
    }

    /// Re-scan every token from scratch, row-major
    ///
    /// Clears stale flags and the pending set first, so calling it twice
    /// without mutation gives the same result.
    pub fn check_whole_board(&mut self) -> bool {
        self.grid.reset_flags();
        self.pending.clear();

        let mut found = false;
        let positions: Vec<Pos> = self.grid.positions().collect();
        for pos in positions {
            match self.grid.get(pos) {
                Some(token) if !token.matched => {}
                _ => continue,
            }
            if self.check_token(pos).is_match() {
                found = true;
            }
        }
        found
    }

    /// Turn the token at `pos` into a charged Turbo and queue it
    ///
    /// Used when an ultimate swipe makes no match of its own.
    pub fn force_turbo(&mut self, pos: Pos) -> bool {
        let Some(token) = self.grid.get_mut(pos) else {
            return false;
        };
        token.upgrade = UpgradeType::Turbo;
        token.should_upgrade = false;
        token.matched = true;
        self.pending.insert(pos);
        true
    }

    /// Break every pending token and score the break
    ///
    /// Special tokens in the set fire first and widen it. Designated tokens
    /// survive as specials; everything else is flagged `Destroying`.
    /// Returns the number of tokens destroyed.
    pub fn break_and_score(&mut self, sink: &mut dyn EventSink) -> u32 {
        let mut break_set = std::mem::take(&mut self.pending);

        let origins: Vec<Pos> = break_set
            .iter()
            .copied()
            .filter(|p| self.grid.get(*p).is_some_and(|t| t.is_activatable()))
            .collect();
        for origin in origins {
            expand_upgrade(
                &self.grid,
                origin,
                &mut break_set,
                &mut self.ctx,
                &self.balance,
                sink,
            );
        }

        let mut broken = 0;
        for pos in &break_set {
            let Some(token) = self.grid.get_mut(*pos) else {
                continue;
            };
            if token.should_upgrade {
                token.should_upgrade = false;
                token.matched = false;
                sink.emit(Event::TokenUpgraded {
                    id: token.id,
                    pos: *pos,
                    upgrade: token.upgrade,
                });
            } else {
                token.matched = true;
                token.state = TokenState::Destroying;
                sink.emit(Event::TokenBreaking {
                    id: token.id,
                    pos: *pos,
                    color: token.color,
                });
                broken += 1;
            }
        }

        self.ctx.special_token_modifier += self.balance.break_size_bonus(broken);
        self.ctx.match_combo += 1;
        self.ctx.token_combo_count += broken;
        log::debug!(
            "break #{}: {} tokens, modifier {}",
            self.ctx.match_combo,
            broken,
            self.ctx.special_token_modifier
        );
        sink.emit(Event::MatchCleared {
            combo: self.ctx.match_combo,
            tokens: broken,
        });
        broken
    }

    /// Drop tokens into the holes and refill; queues them for re-checking
    pub fn repopulate(&mut self, colors: &mut (impl ColorSource + ?Sized), sink: &mut dyn EventSink) {
        let touched = cascade::repopulate(&mut self.grid, colors, sink);
        self.recheck.extend(touched);
    }

    /// One chain-detection pass over the re-check set
    pub fn cascade(&mut self) -> bool {
        cascade::cascade(self)
    }

    /// True if any unmatched token currently forms a match
    pub fn any_match(&self) -> bool {
        self.grid
            .tokens()
            .filter(|t| !t.matched)
            .any(|t| matcher::check_token(&self.grid, t.pos).is_match())
    }

    /// Swap two random tokens that end up forming no match
    ///
    /// Gives up after a bounded number of attempts. Returns the swapped
    /// pair, both left `Moving`.
    pub fn disrupt(&mut self, rng: &mut SimpleRng, sink: &mut dyn EventSink) -> Option<(Pos, Pos)> {
        let width = self.grid.width() as u32;
        let height = self.grid.height() as u32;
        let random_pos =
            |rng: &mut SimpleRng| Pos::new(rng.next_range(width) as u8, rng.next_range(height) as u8);

        for _ in 0..DISRUPT_ATTEMPTS {
            let a = random_pos(rng);
            let b = random_pos(rng);
            let (Some(ca), Some(cb)) = (self.grid.color_at(a), self.grid.color_at(b)) else {
                continue;
            };
            if a == b || ca == cb {
                continue;
            }

            self.grid.swap(a, b);
            let forms_match = matcher::check_token(&self.grid, a).is_match()
                || matcher::check_token(&self.grid, b).is_match();
            if forms_match {
                self.grid.swap(a, b);
                continue;
            }

            for (from, to) in [(b, a), (a, b)] {
                if let Some(token) = self.grid.get(to) {
                    sink.emit(Event::TokenMoved {
                        id: token.id,
                        from,
                        to,
                    });
                }
                self.grid.begin_motion(to);
            }
            return Some((a, b));
        }

        log::debug!("disrupt: no harmless swap found");
        None
    }

    /// Structural consistency problems, if any
    pub fn invariant_violation(&self) -> Option<String> {
        for pos in self.grid.positions() {
            if let Some(token) = self.grid.get(pos) {
                if token.pos != pos {
                    return Some(format!("token {:?} stored at {} claims {}", token.id, pos, token.pos));
                }
                if token.should_upgrade && !token.upgrade.is_special() {
                    return Some(format!("token at {} designated without an upgrade", pos));
                }
            }
        }
        for pos in &self.pending {
            match self.grid.get(*pos) {
                Some(t) if t.matched => {}
                _ => return Some(format!("pending {} is empty or unmatched", pos)),
            }
        }
        None
    }

    /// Panic on any structural inconsistency
    pub fn assert_invariants(&self) {
        if let Some(problem) = self.invariant_violation() {
            panic!("board invariant violated: {}\n{}", problem, self.grid);
        }
    }
}
