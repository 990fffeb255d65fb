//! Greedy auto-player for headless runs.
//!
//! Picks one command per player turn: the special attack as soon as the
//! gauge is full, otherwise the best swipe on the board, otherwise a skip.

use crate::core::best_swipe;
use crate::engine::Battle;
use crate::types::{CharacterAbility, Command, Outcome};

/// Tick budget for resolving a single command.
pub const TICKS_PER_COMMAND: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub outcome: Option<Outcome>,
    pub turns: u32,
    pub levels_cleared: u32,
    pub commands: u32,
    pub ticks: usize,
    /// The battle stopped outside `Ready`/`Win` with the tick budget spent.
    pub stalled: bool,
}

pub fn choose_command(battle: &Battle) -> Command {
    let charged = battle.charge() >= battle.full_charge();
    let ultimate_armed = battle
        .party()
        .active_character()
        .is_some_and(|c| c.ability == CharacterAbility::Ultimate);
    if charged && !ultimate_armed {
        return Command::TriggerSpecialAttack;
    }

    match best_swipe(battle.grid()) {
        Some(hint) => Command::RequestSwipe {
            pos: hint.pos,
            direction: hint.direction,
        },
        None => Command::TriggerSkipTurn,
    }
}

/// Play until defeat, `max_levels` victories, or `max_turns` turns
pub fn play(battle: &mut Battle, max_turns: u32, max_levels: u32) -> Report {
    let mut report = Report::default();

    loop {
        report.ticks += battle.run_until_input(TICKS_PER_COMMAND);

        if battle.is_finished() {
            if battle.outcome() != Some(Outcome::Victory) {
                break;
            }
            report.levels_cleared += 1;
            if report.levels_cleared >= max_levels {
                break;
            }
            match battle.advance_level() {
                Ok(level) => log::info!("advancing to level {}", level),
                Err(err) => {
                    log::warn!("could not advance level: {}", err);
                    break;
                }
            }
            continue;
        }

        if !battle.awaits_input() {
            log::warn!("battle stalled in {}", battle.state().as_str());
            report.stalled = true;
            break;
        }
        if battle.turn() > max_turns {
            break;
        }

        let command = choose_command(battle);
        log::debug!("turn {}: {}", battle.turn(), command.as_str());
        battle.submit(command);
        report.commands += 1;
    }

    report.outcome = battle.outcome();
    report.turns = battle.turn();
    report
}
