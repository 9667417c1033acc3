// Tournament runner: many games between the configured agent and opponent
//
// Games are independent, so they run in parallel on the rayon pool. Inside a
// game every search stays single-threaded.

use log::info;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::agent::build_agent;
use crate::arena::{EndReason, GameRecord, Match};
use crate::board::GameState;
use crate::config::Config;
use crate::debug_logger::GameLogger;
use crate::types::Player;

/// Result of one tournament game
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub game_id: usize,
    /// Side the configured agent played
    pub agent_player: Player,
    pub record: GameRecord,
}

impl MatchResult {
    pub fn agent_won(&self) -> bool {
        self.record.winner == self.agent_player
    }
}

/// Aggregate statistics for a tournament
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TournamentStats {
    pub games: usize,
    pub agent_wins: usize,
    pub opponent_wins: usize,
    pub timeouts: usize,
    pub illegal_moves: usize,
    pub agent_win_rate: f64,
}

/// Plays the configured agent against the configured opponent
pub struct Tournament {
    config: Config,
    logger: GameLogger,
}

impl Tournament {
    pub fn new(config: Config, logger: GameLogger) -> Self {
        Tournament { config, logger }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starting position for `game_id`: a few random placements so games differ
    pub fn opening(&self, game_id: usize) -> GameState {
        let mut rng = StdRng::seed_from_u64(self.config.tournament.seed.wrapping_add(game_id as u64));
        let mut state = GameState::new(self.config.board.width, self.config.board.height);

        for _ in 0..self.config.tournament.random_opening_moves {
            let next = state
                .legal_moves()
                .choose(&mut rng)
                .and_then(|&mv| state.apply_move(mv).ok());
            match next {
                Some(next) => state = next,
                None => break,
            }
        }
        state
    }

    /// Plays one game. In even games the agent takes the first move after the opening.
    pub fn play_game(&self, game_id: usize) -> MatchResult {
        let seed = self.config.tournament.seed ^ (game_id as u64).wrapping_mul(0x9E37_79B9);
        let threshold = self.config.timing.timer_threshold_ms;
        let mut agent = build_agent(&self.config.agent, &self.config.scores, threshold, seed);
        let mut opponent = build_agent(
            &self.config.opponent,
            &self.config.scores,
            threshold,
            seed.wrapping_add(1),
        );

        let opening = self.opening(game_id);
        // Openings may hand the first real move to either side
        let agent_player = if game_id % 2 == 0 {
            opening.active_player()
        } else {
            opening.inactive_player()
        };

        let game = Match::new(opening, self.config.timing.move_time_limit_ms)
            .with_game_id(game_id)
            .with_logger(&self.logger);
        let record = if agent_player == Player::One {
            game.play([&mut *agent, &mut *opponent])
        } else {
            game.play([&mut *opponent, &mut *agent])
        };

        MatchResult {
            game_id,
            agent_player,
            record,
        }
    }

    /// Plays every configured game in parallel, returned in game order
    pub fn run(&self) -> Vec<MatchResult> {
        let games = self.config.tournament.num_matches;
        info!(
            "Starting tournament: {} vs {} over {} games",
            self.config.agent.name, self.config.opponent.name, games
        );

        (0..games)
            .into_par_iter()
            .map(|game_id| self.play_game(game_id))
            .collect()
    }

    pub fn summarize(results: &[MatchResult]) -> TournamentStats {
        let games = results.len();
        let agent_wins = results.iter().filter(|r| r.agent_won()).count();
        let timeouts = results
            .iter()
            .filter(|r| r.record.reason == EndReason::Timeout)
            .count();
        let illegal_moves = results
            .iter()
            .filter(|r| matches!(r.record.reason, EndReason::IllegalMove(_)))
            .count();
        let agent_win_rate = if games > 0 {
            (agent_wins as f64 / games as f64) * 100.0
        } else {
            0.0
        };

        TournamentStats {
            games,
            agent_wins,
            opponent_wins: games - agent_wins,
            timeouts,
            illegal_moves,
            agent_win_rate,
        }
    }

    /// Prints a summary table of the tournament
    pub fn print_report(&self, results: &[MatchResult]) {
        let stats = Self::summarize(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                  TOURNAMENT REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Agent:          {}", self.config.agent.name);
        println!("Opponent:       {}", self.config.opponent.name);
        println!("Games:          {}", stats.games);
        println!(
            "Agent wins:     {} ({:.1}%)",
            stats.agent_wins, stats.agent_win_rate
        );
        println!("Opponent wins:  {}", stats.opponent_wins);
        println!("Timeouts:       {}", stats.timeouts);
        println!("Illegal moves:  {}", stats.illegal_moves);
        println!("═══════════════════════════════════════════════════════════\n");

        for result in results {
            println!(
                "Game {:>3}: agent as {:<10} -> {} wins in {} moves ({})",
                result.game_id,
                result.agent_player.as_str(),
                if result.agent_won() { "agent" } else { "opponent" },
                result.record.history.len(),
                result.record.reason
            );
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyKind;

    fn quick_config() -> Config {
        let mut config = Config::default_hardcoded();
        config.board.width = 5;
        config.board.height = 5;
        config.agent.strategy = StrategyKind::Greedy;
        config.opponent.strategy = StrategyKind::Random;
        config.tournament.num_matches = 4;
        config.timing.move_time_limit_ms = 1000;
        config
    }

    #[test]
    fn test_openings_are_reproducible() {
        let tournament = Tournament::new(quick_config(), GameLogger::disabled());
        let a = tournament.opening(3);
        let b = tournament.opening(3);
        assert_eq!(a, b);
        assert_eq!(a.move_count(), 2);
    }

    #[test]
    fn test_tournament_plays_every_game() {
        let tournament = Tournament::new(quick_config(), GameLogger::disabled());
        let results = tournament.run();
        assert_eq!(results.len(), 4);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.game_id, i);
        }

        let stats = Tournament::summarize(&results);
        assert_eq!(stats.games, 4);
        assert_eq!(stats.agent_wins + stats.opponent_wins, 4);
        assert_eq!(stats.timeouts, 0);
        assert_eq!(stats.illegal_moves, 0);
    }

    #[test]
    fn test_agent_alternates_sides() {
        let tournament = Tournament::new(quick_config(), GameLogger::disabled());
        let even = tournament.play_game(0);
        let odd = tournament.play_game(1);
        assert_eq!(even.agent_player, tournament.opening(0).active_player());
        assert_eq!(odd.agent_player, tournament.opening(1).inactive_player());
    }
}
