// Replay module for analyzing recorded games and checking decisions
//
// This module provides functionality to:
// 1. Parse JSONL game logs
// 2. Re-run an agent on every recorded position
// 3. Compare logged vs replayed moves
// 4. Generate a summary report

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::agent::build_agent;
use crate::board::GameState;
use crate::config::{AgentConfig, Config};
use crate::deadline::Countdown;
use crate::debug_logger::MoveLogEntry;
use crate::types::{describe_move, Position};

/// Result of replaying a single logged move
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub game_id: usize,
    pub ply: u32,
    pub agent: String,
    pub original_move: Option<Position>,
    pub replayed_move: Option<Position>,
    pub matches: bool,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_moves: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing game logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<MoveLogEntry>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: MoveLogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Agent settings for a logged agent name; unknown names use the main agent
    fn agent_config_for(&self, name: &str) -> &AgentConfig {
        if name == self.config.opponent.name {
            &self.config.opponent
        } else {
            &self.config.agent
        }
    }

    /// Re-runs the matching agent on one logged position
    pub fn replay_position(
        &self,
        state: &GameState,
        agent_name: &str,
    ) -> (Option<Position>, u128) {
        let mut agent = build_agent(
            self.agent_config_for(agent_name),
            &self.config.scores,
            self.config.timing.timer_threshold_ms,
            self.config.tournament.seed,
        );

        let start_time = Instant::now();
        let clock = Countdown::from_millis(self.config.timing.move_time_limit_ms);
        let chosen = agent.select_move(state, &clock);
        (chosen, start_time.elapsed().as_millis())
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &MoveLogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying game {} ply {}...", entry.game_id, entry.ply);
        }

        let state = GameState::from_snapshot(&entry.board)?;
        if state.active_player() != entry.player {
            return Err(format!(
                "Game {} ply {}: logged mover {} is not the active player",
                entry.game_id, entry.ply, entry.player
            ));
        }

        let (replayed_move, computation_time) = self.replay_position(&state, &entry.agent);
        let matches = replayed_move == entry.chosen_move;

        let result = ReplayResult {
            game_id: entry.game_id,
            ply: entry.ply,
            agent: entry.agent.clone(),
            original_move: entry.chosen_move,
            replayed_move,
            matches,
            computation_time_ms: computation_time,
        };

        if self.verbose {
            if matches {
                info!(
                    "Game {} ply {}: ✓ MATCH - {} (time: {}ms)",
                    entry.game_id,
                    entry.ply,
                    describe_move(replayed_move),
                    computation_time
                );
            } else {
                warn!(
                    "Game {} ply {}: ✗ MISMATCH - Original: {}, Replayed: {} (time: {}ms)",
                    entry.game_id,
                    entry.ply,
                    describe_move(entry.chosen_move),
                    describe_move(replayed_move),
                    computation_time
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file
    pub fn replay_all(&self, entries: &[MoveLogEntry]) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay game {} ply {}: {}", entry.game_id, entry.ply, e);
                }
            }
        }

        Ok(results)
    }

    /// Replays only the moves of the listed games
    pub fn replay_games(
        &self,
        entries: &[MoveLogEntry],
        game_ids: &[usize],
    ) -> Result<Vec<ReplayResult>, String> {
        for game_id in game_ids {
            if !entries.iter().any(|e| e.game_id == *game_id) {
                return Err(format!("Game {} not found in log file", game_id));
            }
        }

        let selected: Vec<MoveLogEntry> = entries
            .iter()
            .filter(|e| game_ids.contains(&e.game_id))
            .cloned()
            .collect();
        self.replay_all(&selected)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_moves = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_moves - matches;
        let match_rate = if total_moves > 0 {
            (matches as f64 / total_moves as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_moves,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Moves:    {}", stats.total_moves);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Game {} ply {} [{}]: {} → {} (time: {}ms)",
                    result.game_id,
                    result.ply,
                    result.agent,
                    describe_move(result.original_move),
                    describe_move(result.replayed_move),
                    result.computation_time_ms
                );
            }
            println!();
        }
    }
}
