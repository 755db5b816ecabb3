#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Switchback sessions.

mod config;
mod levels;
mod prompt;
mod session;
mod tape;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::Rng;
use switchback_core::LevelId;
use switchback_system_level_flow::LevelFlow;
use switchback_system_scoring::ScoreLedger;

use crate::levels::DirectoryLevels;
use crate::prompt::{CliPrompts, OnDeath};
use crate::tape::Tape;

/// Headless runner for deterministic, scripted Switchback sessions.
#[derive(Debug, Parser)]
#[command(name = "switchback", version, about)]
struct Args {
    /// Session configuration file; level maps load from its directory.
    #[arg(long, value_name = "FILE", required_unless_present = "high_scores")]
    config: Option<PathBuf>,

    /// Command tape scripting player actions by tick.
    #[arg(long, value_name = "FILE", conflicts_with = "random_walk")]
    tape: Option<PathBuf>,

    /// Maximum number of 10 ms ticks to simulate.
    #[arg(long, default_value_t = 6_000)]
    ticks: u64,

    /// Seed for the world and tape random streams; drawn from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Generate a tape of this many random directives instead of reading one.
    #[arg(long, value_name = "COUNT")]
    random_walk: Option<u32>,

    /// Directory the per-level score files live in.
    #[arg(long, value_name = "DIR", default_value = "scores")]
    scores_dir: PathBuf,

    /// Record qualifying scores under this name instead of prompting.
    #[arg(long, value_name = "NAME")]
    player_name: Option<String>,

    /// Answer the death prompt with this choice instead of asking.
    #[arg(long, value_enum)]
    on_death: Option<OnDeath>,

    /// Print a JSON session summary when the run ends.
    #[arg(long)]
    summary: bool,

    /// Print the recorded high scores for a level and exit.
    #[arg(long, value_name = "LEVEL")]
    high_scores: Option<String>,
}

/// Entry point for the Switchback command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let ledger = ScoreLedger::new(&args.scores_dir);
    if let Some(level) = &args.high_scores {
        return print_high_scores(&ledger, &LevelId::new(level.as_str()));
    }

    let config_path = args
        .config
        .as_deref()
        .context("--config is required to run a session")?;
    let text = fs::read_to_string(config_path)
        .with_context(|| format!("reading configuration {}", config_path.display()))?;
    let config = config::parse(&text)
        .with_context(|| format!("parsing configuration {}", config_path.display()))?;

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("session seed: {seed}");

    let tape = match (&args.tape, args.random_walk) {
        (Some(path), _) => {
            let script =
                fs::read_to_string(path).with_context(|| format!("reading tape {}", path.display()))?;
            tape::parse(&script).with_context(|| format!("parsing tape {}", path.display()))?
        }
        (None, Some(directives)) => Tape::random_walk(directives, seed),
        (None, None) => Tape::default(),
    };
    info!("tape holds {} directives", tape.len());

    let levels_root = config_path.parent().unwrap_or(Path::new("."));
    let prompts = CliPrompts::new(args.player_name.clone(), args.on_death);
    let mut flow = LevelFlow::new(
        config.clone(),
        DirectoryLevels::new(levels_root),
        prompts,
        ledger,
    );

    let summary = session::run(&config, seed, &tape, args.ticks, &mut flow)?;
    info!(
        "session {} after {} ticks with score {}",
        summary.outcome, summary.ticks, summary.score
    );
    if args.summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

/// Prints the recorded ledger for one level.
fn print_high_scores(ledger: &ScoreLedger, level: &LevelId) -> Result<()> {
    let entries = ledger
        .load(level)
        .with_context(|| format!("loading scores for {level}"))?;
    if entries.is_empty() {
        println!("No scores recorded for {level}.");
        return Ok(());
    }
    println!("High scores for {level}:");
    for (place, entry) in entries.iter().enumerate() {
        println!("{:>2}. {:>6}  {}", place + 1, entry.score(), entry.name());
    }
    Ok(())
}
