// Replay module for re-running the decision policy over a JSONL turn log
//
// This module provides functionality to:
// 1. Parse JSONL debug logs written by the debug logger
// 2. Replay the policy on the logged states, carrying one session per snake per game
// 3. Compare logged vs replayed moves, per game and per deciding step
// 4. Validate expected moves

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::DebugLogEntry;
use crate::policy::{self, DecisionStep, Session};
use crate::types::{Direction, TurnState};

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub game_id: String,
    pub you_id: String,
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub original_step: DecisionStep,
    pub replayed_step: DecisionStep,
    pub matches: bool,
    pub computation_time_us: u128,
}

/// Match statistics over a set of replayed turns
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
    /// How often each step decided the replayed move
    pub steps: BTreeMap<&'static str, usize>,
}

impl ReplayStats {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ReplayResult>) -> Self {
        let mut stats = ReplayStats::default();
        for result in results {
            stats.total_turns += 1;
            if result.matches {
                stats.matches += 1;
            }
            *stats.steps.entry(result.replayed_step.as_str()).or_insert(0) += 1;
        }
        stats.mismatches = stats.total_turns - stats.matches;
        if stats.total_turns > 0 {
            stats.match_rate = stats.matches as f64 / stats.total_turns as f64 * 100.0;
        }
        stats
    }
}

/// A turn the caller expects, optionally pinned to one game
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    pub game_id: Option<String>,
    pub turn: i32,
    pub acceptable: Vec<Direction>,
}

impl FromStr for Expectation {
    type Err = String;

    /// `turn:moves` or `game:turn:moves`, where moves are `|`-separated
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().rsplitn(3, ':');
        let (Some(moves), Some(turn)) = (parts.next(), parts.next()) else {
            return Err(format!("Invalid expectation '{}', expected [game:]turn:move", s));
        };
        let game_id = parts.next().map(str::to_string);

        let turn = turn
            .parse::<i32>()
            .map_err(|e| format!("Invalid turn number '{}': {}", turn, e))?;
        let acceptable = moves
            .split('|')
            .map(Direction::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Expectation {
            game_id,
            turn,
            acceptable,
        })
    }
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
    seed: u64,
}

impl ReplayEngine {
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            config,
            verbose,
            seed: 0,
        }
    }

    /// Seed for the random last-resort step
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(
        &self,
        log_path: P,
    ) -> Result<Vec<DebugLogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line_num = index + 1;
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: DebugLogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num, e))?;
            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Game ids in order of first appearance
    pub fn games(entries: &[DebugLogEntry]) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in entries {
            if !seen.contains(&entry.game_id.as_str()) {
                seen.push(&entry.game_id);
            }
        }
        seen
    }

    /// Replays one entry against the given session
    /// Returns the comparison and the session to carry into that snake's next turn
    pub fn replay_entry(
        &self,
        entry: &DebugLogEntry,
        session: Session,
        rng: &mut StdRng,
    ) -> Result<(ReplayResult, Session), String> {
        let you = entry
            .board
            .snakes
            .iter()
            .find(|s| s.id == entry.you_id)
            .ok_or_else(|| format!("Snake with id '{}' not found in board state", entry.you_id))?;

        let start_time = Instant::now();
        let state = TurnState::new(entry.turn, &entry.board, you);
        let (decision, next) = policy::decide_safely(&state, session, &self.config, rng);

        let result = ReplayResult {
            game_id: entry.game_id.clone(),
            you_id: entry.you_id.clone(),
            turn: entry.turn,
            original_move: entry.chosen_move,
            replayed_move: decision.direction,
            original_step: entry.step,
            replayed_step: decision.step,
            matches: entry.chosen_move == decision.direction,
            computation_time_us: start_time.elapsed().as_micros(),
        };

        if self.verbose {
            if result.matches {
                info!(
                    "{} turn {}: MATCH {} via {}",
                    result.game_id,
                    result.turn,
                    result.replayed_move,
                    result.replayed_step.as_str()
                );
            } else {
                warn!(
                    "{} turn {}: MISMATCH logged {} via {}, replayed {} via {}",
                    result.game_id,
                    result.turn,
                    result.original_move,
                    result.original_step.as_str(),
                    result.replayed_move,
                    result.replayed_step.as_str()
                );
            }
        }

        Ok((result, next))
    }

    /// Replays every entry in log order, one session per (game, snake)
    pub fn replay_all(&self, entries: &[DebugLogEntry]) -> Vec<ReplayResult> {
        let mut sessions: HashMap<(&str, &str), Session> = HashMap::new();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut results = Vec::new();

        for entry in entries {
            let key = (entry.game_id.as_str(), entry.you_id.as_str());
            let session = sessions.get(&key).copied().unwrap_or_default();
            match self.replay_entry(entry, session, &mut rng) {
                Ok((result, next)) => {
                    sessions.insert(key, next);
                    results.push(result);
                }
                Err(e) => warn!("Failed to replay {} turn {}: {}", entry.game_id, entry.turn, e),
            }
        }

        results
    }

    /// Replays specific turns, optionally of a single game
    /// Earlier turns are still replayed so that session state matches the live game
    pub fn replay_turns(
        &self,
        entries: &[DebugLogEntry],
        game_id: Option<&str>,
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        for turn in turn_numbers {
            if !entries.iter().any(|e| in_game(&e.game_id, game_id) && e.turn == *turn) {
                return Err(format!("Turn {} not found in {}", turn, describe(game_id)));
            }
        }

        Ok(self
            .replay_all(entries)
            .into_iter()
            .filter(|r| in_game(&r.game_id, game_id) && turn_numbers.contains(&r.turn))
            .collect())
    }

    /// Checks the logged move of every entry an expectation selects
    pub fn validate_expected_moves(
        &self,
        entries: &[DebugLogEntry],
        expected: &[Expectation],
    ) -> Result<(), String> {
        for expectation in expected {
            let game_id = expectation.game_id.as_deref();
            let mut selected = entries
                .iter()
                .filter(|e| in_game(&e.game_id, game_id) && e.turn == expectation.turn)
                .peekable();
            if selected.peek().is_none() {
                return Err(format!(
                    "Turn {} not found in {}",
                    expectation.turn,
                    describe(game_id)
                ));
            }

            for entry in selected {
                if !expectation.acceptable.contains(&entry.chosen_move) {
                    return Err(format!(
                        "{} turn {}: expected one of {:?}, but got {}",
                        entry.game_id,
                        entry.turn,
                        expectation
                            .acceptable
                            .iter()
                            .map(|d| d.as_str())
                            .collect::<Vec<_>>(),
                        entry.chosen_move
                    ));
                }
            }
        }

        Ok(())
    }

    /// Prints overall and per-game statistics plus every mismatch
    pub fn print_report(&self, results: &[ReplayResult]) {
        let overall = ReplayStats::from_results(results);

        println!();
        println!("Replayed {} turns", overall.total_turns);
        println!(
            "  matches    {} ({:.1}%)",
            overall.matches, overall.match_rate
        );
        println!("  mismatches {}", overall.mismatches);
        if !results.is_empty() {
            let total_us: u128 = results.iter().map(|r| r.computation_time_us).sum();
            println!("  avg time   {}us", total_us / results.len() as u128);
        }

        println!();
        println!("Deciding steps:");
        for (step, count) in &overall.steps {
            println!("  {:<12} {}", step, count);
        }

        let mut per_game: Vec<&str> = Vec::new();
        for result in results {
            if !per_game.contains(&result.game_id.as_str()) {
                per_game.push(&result.game_id);
            }
        }
        if per_game.len() > 1 {
            println!();
            println!("Per game:");
            for game in per_game {
                let stats =
                    ReplayStats::from_results(results.iter().filter(|r| r.game_id == game));
                println!(
                    "  {:<24} {:>4} turns {:>6.1}% match",
                    game, stats.total_turns, stats.match_rate
                );
            }
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!();
            println!("Mismatches:");
            for r in mismatches {
                println!(
                    "  {} / {} turn {}: {} ({}) -> {} ({})",
                    r.game_id,
                    r.you_id,
                    r.turn,
                    r.original_move,
                    r.original_step.as_str(),
                    r.replayed_move,
                    r.replayed_step.as_str()
                );
            }
        }
        println!();
    }
}

fn in_game(entry_game: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |id| id == entry_game)
}

fn describe(game_id: Option<&str>) -> String {
    match game_id {
        Some(id) => format!("game {}", id),
        None => "log".to_string(),
    }
}
