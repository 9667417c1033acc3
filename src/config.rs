// Configuration module for reading Isolation.toml
// This module provides OOP-style configuration management for the agents and the match driver

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::board::check_dimensions;
use crate::eval::Heuristic;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub board: BoardConfig,
    pub timing: TimingConfig,
    pub agent: AgentConfig,
    pub opponent: AgentConfig,
    pub scores: ScoresConfig,
    pub tournament: TournamentConfig,
    pub debug: DebugConfig,
}

/// Board dimensions
#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
}

/// Timing constants
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Wall-clock budget for a single move request
    pub move_time_limit_ms: u64,
    /// Search aborts once the time left drops to this value or below
    pub timer_threshold_ms: f64,
}

/// Move-selection policy
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Fixed-depth minimax
    Minimax,
    /// Iterative-deepening alpha-beta
    AlphaBeta,
    /// One-ply lookahead
    Greedy,
    /// Uniformly random legal move
    Random,
}

/// Per-agent settings
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    pub strategy: StrategyKind,
    pub heuristic: Heuristic,
    /// Depth for fixed-depth minimax
    pub search_depth: u32,
    /// Optional cap for iterative deepening
    #[serde(default)]
    pub max_search_depth: Option<u32>,
    pub cache_scores: bool,
}

/// Heuristic weights
#[derive(Debug, Deserialize, Clone)]
pub struct ScoresConfig {
    // Mobility
    pub own_moves_weight: f64,
    pub opp_moves_weight: f64,
    pub improved_opp_weight: f64,

    // Centerness
    pub center_own_weight: f64,
    pub center_opp_weight: f64,
    /// Centerness only counts while move_count / cells is below this
    pub opening_progress_cutoff: f64,

    // Composite extras
    pub attack_bonus: f64,
    /// Knight hops explored by the reachable-cells lookahead
    pub lookahead_hops: u32,
    pub lookahead_weight: f64,
}

/// Tournament settings
#[derive(Debug, Deserialize, Clone)]
pub struct TournamentConfig {
    pub num_matches: usize,
    pub random_opening_moves: usize,
    pub seed: u64,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Isolation.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Isolation.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Isolation.toml")
    }

    /// Rejects values the agents cannot work with
    pub fn validate(&self) -> Result<(), String> {
        check_dimensions(self.board.width, self.board.height)?;
        if self.timing.timer_threshold_ms <= 0.0 {
            return Err("timer_threshold_ms must be positive".to_string());
        }
        if self.timing.timer_threshold_ms >= self.timing.move_time_limit_ms as f64 {
            return Err(format!(
                "timer_threshold_ms ({}) must be below move_time_limit_ms ({})",
                self.timing.timer_threshold_ms, self.timing.move_time_limit_ms
            ));
        }
        for agent in [&self.agent, &self.opponent].iter() {
            if agent.strategy == StrategyKind::Minimax && agent.search_depth == 0 {
                return Err(format!(
                    "Agent '{}' uses minimax and needs search_depth > 0",
                    agent.name
                ));
            }
        }
        Ok(())
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Isolation.toml
    pub fn default_hardcoded() -> Self {
        Config {
            board: BoardConfig {
                width: 7,
                height: 7,
            },
            timing: TimingConfig {
                move_time_limit_ms: 150,
                timer_threshold_ms: 10.0,
            },
            agent: AgentConfig {
                name: "alpha_beta_composite".to_string(),
                strategy: StrategyKind::AlphaBeta,
                heuristic: Heuristic::Composite,
                search_depth: 3,
                max_search_depth: None,
                cache_scores: true,
            },
            opponent: AgentConfig {
                name: "alpha_beta_improved".to_string(),
                strategy: StrategyKind::AlphaBeta,
                heuristic: Heuristic::Improved,
                search_depth: 3,
                max_search_depth: None,
                cache_scores: false,
            },
            scores: ScoresConfig {
                own_moves_weight: 0.5,
                opp_moves_weight: 0.4,
                improved_opp_weight: 1.0,
                center_own_weight: 2.0,
                center_opp_weight: 0.5,
                opening_progress_cutoff: 0.4,
                attack_bonus: 0.01,
                lookahead_hops: 3,
                lookahead_weight: 1.0,
            },
            tournament: TournamentConfig {
                num_matches: 10,
                random_opening_moves: 2,
                seed: 42,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "isolation_games.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!(
                "Could not load Isolation.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.board.width, 7);
        assert_eq!(config.agent.strategy, StrategyKind::AlphaBeta);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_isolation_toml_can_be_parsed() {
        // This test ensures Isolation.toml is valid and can be parsed
        let result = Config::from_file("Isolation.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Isolation.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config =
            Config::from_file("Isolation.toml").expect("Isolation.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.board.width, hardcoded_config.board.width);
        assert_eq!(file_config.board.height, hardcoded_config.board.height);
        assert_eq!(
            file_config.timing.move_time_limit_ms,
            hardcoded_config.timing.move_time_limit_ms
        );
        assert_eq!(
            file_config.timing.timer_threshold_ms,
            hardcoded_config.timing.timer_threshold_ms
        );

        assert_eq!(file_config.agent.strategy, hardcoded_config.agent.strategy);
        assert_eq!(file_config.agent.heuristic, hardcoded_config.agent.heuristic);
        assert_eq!(
            file_config.agent.search_depth,
            hardcoded_config.agent.search_depth
        );
        assert_eq!(
            file_config.agent.max_search_depth,
            hardcoded_config.agent.max_search_depth
        );
        assert_eq!(
            file_config.opponent.heuristic,
            hardcoded_config.opponent.heuristic
        );

        assert_eq!(
            file_config.scores.own_moves_weight,
            hardcoded_config.scores.own_moves_weight
        );
        assert_eq!(
            file_config.scores.opp_moves_weight,
            hardcoded_config.scores.opp_moves_weight
        );
        assert_eq!(
            file_config.scores.opening_progress_cutoff,
            hardcoded_config.scores.opening_progress_cutoff
        );
        assert_eq!(
            file_config.scores.lookahead_hops,
            hardcoded_config.scores.lookahead_hops
        );

        assert_eq!(
            file_config.tournament.num_matches,
            hardcoded_config.tournament.num_matches
        );
        assert_eq!(file_config.tournament.seed, hardcoded_config.tournament.seed);
        assert!(!file_config.debug.log_file_path.is_empty());
    }

    #[test]
    fn test_load_or_default_works() {
        let config = Config::load_or_default();
        assert_eq!(config.scores.attack_bonus, 0.01);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());

        let result = Config::from_toml_str("[board]\nwidth = \"seven\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_depth_minimax_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.opponent.strategy = StrategyKind::Minimax;
        config.opponent.search_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_must_leave_search_time() {
        let mut config = Config::default_hardcoded();
        config.timing.timer_threshold_ms = config.timing.move_time_limit_ms as f64;
        assert!(config.validate().is_err());

        config.timing.timer_threshold_ms = config.timing.move_time_limit_ms as f64 + 50.0;
        assert!(config.validate().is_err());

        config.timing.timer_threshold_ms = config.timing.move_time_limit_ms as f64 - 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_oversized_board_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.board.width = 70_000;
        config.board.height = 70_000;
        assert!(config.validate().is_err());
    }
}
