// Match driver: plays one game between two agents under a per-move clock

use log::{debug, info};
use std::fmt;

use crate::agent::Agent;
use crate::board::GameState;
use crate::deadline::{Countdown, Deadline};
use crate::debug_logger::GameLogger;
use crate::types::{describe_move, Player, Position};

/// Why a game ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The loser had no legal moves on their turn
    NoLegalMoves,
    /// The loser answered after their clock ran out
    Timeout,
    /// The loser answered with a move outside `legal_moves`
    IllegalMove(String),
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::NoLegalMoves => f.write_str("no legal moves"),
            EndReason::Timeout => f.write_str("timeout"),
            EndReason::IllegalMove(detail) => write!(f, "illegal move ({})", detail),
        }
    }
}

/// Outcome of a finished game
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub winner: Player,
    pub loser: Player,
    pub reason: EndReason,
    /// Every move applied, starting from the match's initial state
    pub history: Vec<Position>,
    pub final_state: GameState,
}

/// One game between two agents
pub struct Match<'a> {
    state: GameState,
    time_limit_ms: u64,
    game_id: usize,
    logger: Option<&'a GameLogger>,
}

impl<'a> Match<'a> {
    pub fn new(state: GameState, time_limit_ms: u64) -> Self {
        Match {
            state,
            time_limit_ms,
            game_id: 0,
            logger: None,
        }
    }

    pub fn with_game_id(mut self, game_id: usize) -> Self {
        self.game_id = game_id;
        self
    }

    pub fn with_logger(mut self, logger: &'a GameLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Plays until someone loses. `agents[0]` plays player one.
    pub fn play(self, mut agents: [&mut dyn Agent; 2]) -> GameRecord {
        let mut state = self.state;
        let mut history = Vec::new();

        loop {
            let player = state.active_player();
            let agent = &mut agents[player.index()];
            let legal = state.legal_moves();

            let clock = Countdown::from_millis(self.time_limit_ms);
            let chosen = agent.select_move(&state, &clock);
            let time_left = clock.time_left_ms();

            if let Some(logger) = self.logger {
                logger.log_move(self.game_id, &state, agent.name(), chosen);
            }
            debug!(
                "Game {} ply {}: {} ({}) plays {} after {}ms, {:.1}ms left",
                self.game_id,
                state.move_count(),
                agent.name(),
                player,
                describe_move(chosen),
                clock.elapsed().as_millis(),
                time_left
            );

            let forfeit = if time_left < 0.0 {
                Some(EndReason::Timeout)
            } else {
                match chosen {
                    None if legal.is_empty() => Some(EndReason::NoLegalMoves),
                    None => Some(EndReason::IllegalMove(
                        "no move while legal moves remain".to_string(),
                    )),
                    Some(mv) if !legal.contains(&mv) => Some(EndReason::IllegalMove(format!(
                        "{} is not a legal move",
                        mv
                    ))),
                    Some(_) => None,
                }
            };

            if let Some(reason) = forfeit {
                info!(
                    "Game {}: {} wins after {} moves ({} by {})",
                    self.game_id,
                    player.opponent(),
                    history.len(),
                    reason,
                    player
                );
                return GameRecord {
                    winner: player.opponent(),
                    loser: player,
                    reason,
                    history,
                    final_state: state,
                };
            }

            if let Some(mv) = chosen {
                match state.apply_move(mv) {
                    Ok(next) => {
                        state = next;
                        history.push(mv);
                    }
                    Err(e) => {
                        return GameRecord {
                            winner: player.opponent(),
                            loser: player,
                            reason: EndReason::IllegalMove(e.to_string()),
                            history,
                            final_state: state,
                        };
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RandomAgent;
    use crate::deadline::Deadline;

    /// Always answers with the same cell
    struct Stubborn(Position);

    impl Agent for Stubborn {
        fn name(&self) -> &str {
            "stubborn"
        }

        fn select_move(&mut self, _state: &GameState, _deadline: &dyn Deadline) -> Option<Position> {
            Some(self.0)
        }
    }

    #[test]
    fn test_random_game_ends_with_stuck_player() {
        let mut one = RandomAgent::new("one", 1);
        let mut two = RandomAgent::new("two", 2);
        let record = Match::new(GameState::new(5, 5), 1000).play([&mut one, &mut two]);

        assert_eq!(record.reason, EndReason::NoLegalMoves);
        assert_eq!(record.final_state.active_player(), record.loser);
        assert!(record.final_state.is_loser(record.loser));
        assert!(record.final_state.is_winner(record.winner));
        assert_eq!(record.history.len() as u32, record.final_state.move_count());
    }

    #[test]
    fn test_illegal_answer_forfeits() {
        let mut one = Stubborn(Position::new(0, 0));
        let mut two = Stubborn(Position::new(0, 0));
        let record = Match::new(GameState::new(5, 5), 1000).play([&mut one, &mut two]);

        assert_eq!(record.winner, Player::One);
        assert!(matches!(record.reason, EndReason::IllegalMove(_)));
        assert_eq!(record.history, vec![Position::new(0, 0)]);
    }
}
