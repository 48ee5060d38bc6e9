// Re-runs the decision policy over a JSONL turn log written by the server
//
//   replay games    battlesnake_debug.jsonl
//   replay run      battlesnake_debug.jsonl --game g1 --turns 5,10
//   replay validate battlesnake_debug.jsonl --expect g1:5:up|left --expect 9:down

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use cascade_snake::config::Config;
use cascade_snake::debug_logger::DebugLogEntry;
use cascade_snake::replay::{Expectation, ReplayEngine};

#[derive(clap::Args, Debug)]
struct Run {
    /// Turn log to replay
    #[clap(value_parser)]
    log_file: PathBuf,

    /// Only report this game
    #[clap(short, long, value_parser)]
    game: Option<String>,

    /// Only report these turns (comma-separated)
    #[clap(short, long, value_parser, value_delimiter = ',')]
    turns: Vec<i32>,
}

#[derive(clap::Args, Debug)]
struct Validate {
    /// Turn log to check
    #[clap(value_parser)]
    log_file: PathBuf,

    /// Expected move as [game:]turn:move, alternatives separated by '|'
    #[clap(short, long, value_parser, required = true)]
    expect: Vec<Expectation>,
}

#[derive(clap::Args, Debug)]
struct Games {
    /// Turn log to summarise
    #[clap(value_parser)]
    log_file: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay the log and compare logged with replayed moves
    Run(Run),
    /// Check that the logged moves match expectations
    Validate(Validate),
    /// List the games in the log with their turn counts
    Games(Games),
}

/// Replay tool for cascade-snake turn logs
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Snake.toml used for the replayed decisions
    #[clap(short, long, value_parser, default_value = "Snake.toml", global = true)]
    config: PathBuf,

    /// Seed for the random last-resort step
    #[clap(short, long, value_parser, default_value_t = 0, global = true)]
    seed: u64,

    /// Log every replayed turn
    #[clap(short, long, global = true)]
    verbose: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = Config::from_file(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: {}; using built-in defaults", e);
        Config::default_hardcoded()
    });
    let engine = ReplayEngine::new(config, cli.verbose).with_seed(cli.seed);

    match cli.command {
        Commands::Run(args) => {
            let entries = load(&engine, &args.log_file)?;
            let results = if args.turns.is_empty() {
                engine
                    .replay_all(&entries)
                    .into_iter()
                    .filter(|r| args.game.as_deref().map_or(true, |g| g == r.game_id))
                    .collect()
            } else {
                engine.replay_turns(&entries, args.game.as_deref(), &args.turns)?
            };
            engine.print_report(&results);
        }
        Commands::Validate(args) => {
            let entries = load(&engine, &args.log_file)?;
            engine.validate_expected_moves(&entries, &args.expect)?;
            println!("{} expectation(s) hold", args.expect.len());
        }
        Commands::Games(args) => {
            let entries = load(&engine, &args.log_file)?;
            for game in ReplayEngine::games(&entries) {
                let turns: Vec<i32> = entries
                    .iter()
                    .filter(|e| e.game_id == game)
                    .map(|e| e.turn)
                    .collect();
                let first = turns.iter().min().copied().unwrap_or(0);
                let last = turns.iter().max().copied().unwrap_or(0);
                println!("{:<24} {:>4} entries, turns {}..={}", game, turns.len(), first, last);
            }
        }
    }

    Ok(())
}

fn load(engine: &ReplayEngine, path: &Path) -> Result<Vec<DebugLogEntry>, String> {
    let entries = engine.load_log_file(path)?;
    if entries.is_empty() {
        return Err(format!("{} holds no entries", path.display()));
    }
    Ok(entries)
}
