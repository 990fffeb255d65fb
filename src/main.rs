//! Headless wizmatch runner (default binary).
//!
//! Plays a seeded battle with the greedy auto-player and prints a summary,
//! or the final snapshot as JSON. `RUST_LOG=debug` shows every command and
//! state transition.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use wizmatch::autoplay::{self, Report};
use wizmatch::engine::{Battle, BattleConfig};
use wizmatch::types::Outcome;

/// Deterministic match-3 battle simulation.
#[derive(Debug, Parser)]
#[command(name = "wizmatch", version, about)]
struct Args {
    /// Seed for board generation, refills and enemy behaviour.
    #[arg(short, long, default_value = "1")]
    seed: u32,

    /// Battle configuration JSON; built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many turns.
    #[arg(long, default_value = "200", value_name = "N")]
    max_turns: u32,

    /// Gauntlet levels to clear before stopping.
    #[arg(long, default_value = "1", value_name = "N")]
    levels: u32,

    /// Print the final battle snapshot as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => BattleConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BattleConfig::default(),
    };
    let mut battle = Battle::new(config, args.seed).context("setting up battle")?;
    battle.set_event_log(false);

    let report = autoplay::play(&mut battle, args.max_turns, args.levels.max(1));

    if args.json {
        let out = serde_json::json!({
            "seed": args.seed,
            "commands": report.commands,
            "ticks": report.ticks,
            "levels_cleared": report.levels_cleared,
            "snapshot": battle.snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_summary(&battle, &report, args.seed);
    }

    if report.stalled {
        anyhow::bail!("battle stalled in state {}", battle.state().as_str());
    }
    Ok(())
}

fn print_summary(battle: &Battle, report: &Report, seed: u32) {
    let result = match report.outcome {
        Some(Outcome::Victory) => "victory",
        Some(Outcome::Defeat) => "defeat",
        None => "unfinished",
    };
    println!(
        "seed {}: {} after {} turns ({} commands, {} ticks), {} levels cleared",
        seed, result, report.turns, report.commands, report.ticks, report.levels_cleared
    );
    for c in battle.characters() {
        println!(
            "  {:<12} {:<6} hp {:>3}/{:<3} {:?}",
            c.name,
            c.kind.as_str(),
            c.stats.hp,
            c.stats.max_hp,
            c.state
        );
    }
    println!(
        "  charge {}/{}, {} special tokens on the board",
        battle.charge(),
        battle.full_charge(),
        battle.grid().specials().count()
    );
    println!();
    print!("{}", battle.grid());
}
