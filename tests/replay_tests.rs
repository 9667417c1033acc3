// Tests for the replay engine
//
// Tests the core functionality of the replay engine including:
// - Loading JSONL game logs
// - Rebuilding positions from logged snapshots
// - Replaying selected games
// - Checking that a logged tournament replays move for move

use isolation_agent::board::GameState;
use isolation_agent::config::{Config, StrategyKind};
use isolation_agent::debug_logger::GameLogger;
use isolation_agent::eval::Heuristic;
use isolation_agent::replay::ReplayEngine;
use isolation_agent::tournament::Tournament;
use isolation_agent::types::{Player, Position};
use std::path::PathBuf;

/// Helper function to get the path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(filename)
}

/// Small deterministic match-up: both sides run fixed searches
fn deterministic_config() -> Config {
    let mut config = Config::default_hardcoded();
    config.board.width = 5;
    config.board.height = 5;
    config.timing.move_time_limit_ms = 5_000;
    config.agent.name = "greedy_open_move".to_string();
    config.agent.strategy = StrategyKind::Greedy;
    config.agent.heuristic = Heuristic::OpenMove;
    config.opponent.name = "minimax_improved".to_string();
    config.opponent.strategy = StrategyKind::Minimax;
    config.opponent.heuristic = Heuristic::Improved;
    config.opponent.search_depth = 2;
    config.tournament.num_matches = 3;
    config
}

#[test]
fn test_load_short_game() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .expect("Failed to load short_game.jsonl");

    assert_eq!(entries.len(), 3, "Expected 3 log entries");
    assert_eq!(entries[0].player, Player::One);
    assert_eq!(entries[0].chosen_move, Some(Position::new(2, 2)));
    assert_eq!(entries[1].board.player_one, Some(Position::new(2, 2)));
    assert_eq!(entries[2].chosen_move, None);
}

#[test]
fn test_logged_snapshots_rebuild_states() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .unwrap();

    let second = GameState::from_snapshot(&entries[1].board).unwrap();
    let expected = GameState::new(5, 5).apply_move(Position::new(2, 2)).unwrap();
    assert_eq!(second, expected);

    let stuck = GameState::from_snapshot(&entries[2].board).unwrap();
    assert!(stuck.is_loser(Player::One));
}

#[test]
fn test_malformed_line_reports_line_number() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    let err = engine
        .load_log_file(fixture_path("malformed.jsonl"))
        .unwrap_err();
    assert!(err.contains("line 3"), "unexpected error: {}", err);
}

#[test]
fn test_missing_log_file_is_an_error() {
    let engine = ReplayEngine::new(Config::default_hardcoded(), false);
    assert!(engine.load_log_file(fixture_path("does_not_exist.jsonl")).is_err());
}

#[test]
fn test_replay_selected_game() {
    let engine = ReplayEngine::new(deterministic_config(), false);
    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .unwrap();

    let results = engine.replay_games(&entries, &[1]).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].matches);
    assert_eq!(results[0].replayed_move, None);

    let stats = engine.generate_stats(&results);
    assert_eq!(stats.total_moves, 1);
    assert_eq!(stats.matches, 1);
    assert_eq!(stats.match_rate, 100.0);
}

#[test]
fn test_oversized_board_is_rejected_without_stopping_replay() {
    let engine = ReplayEngine::new(deterministic_config(), false);
    let entries = engine
        .load_log_file(fixture_path("oversized_board.jsonl"))
        .unwrap();
    assert_eq!(entries.len(), 2);

    let err = engine.replay_entry(&entries[0]).unwrap_err();
    assert!(err.contains("70000x70000"), "unexpected error: {}", err);

    // The bad line is skipped and the rest of the log still replays
    let results = engine.replay_all(&entries).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].ply, 2);
    assert!(results[0].matches);
}

#[test]
fn test_replay_unknown_game_is_an_error() {
    let engine = ReplayEngine::new(deterministic_config(), false);
    let entries = engine
        .load_log_file(fixture_path("short_game.jsonl"))
        .unwrap();

    assert!(engine.replay_games(&entries, &[7]).is_err());
}

#[test]
fn test_logged_tournament_replays_move_for_move() {
    let config = deterministic_config();
    let path = std::env::temp_dir().join(format!(
        "isolation_replay_test_{}.jsonl",
        std::process::id()
    ));
    let path_str = path.to_string_lossy().to_string();

    let tournament = Tournament::new(config.clone(), GameLogger::new(true, &path_str));
    let results = tournament.run();
    let total_moves: usize = results.iter().map(|r| r.record.history.len() + 1).sum();

    let engine = ReplayEngine::new(config, false);
    let entries = engine.load_log_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(entries.len(), total_moves, "One entry per decision, including the final stuck turn");

    let replayed = engine.replay_all(&entries).unwrap();
    let stats = engine.generate_stats(&replayed);
    assert_eq!(stats.total_moves, entries.len());
    assert_eq!(stats.mismatches, 0);
}
