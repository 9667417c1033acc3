//! Depth-limited minimax value functions with optional alpha-beta bounds.
//!
//! Cancellation is cooperative: every entry point polls the deadline and,
//! once the time left reaches the safety threshold, returns
//! `Err(Cancelled)`. Callers propagate it with `?` so the whole recursion
//! unwinds without producing a value.

use crate::board::GameState;
use crate::deadline::Deadline;
use crate::eval::Evaluator;
use crate::types::{Player, Position};

/// The search ran out of time. Never escapes an agent's `select_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

pub type SearchOutcome<T> = Result<T, Cancelled>;

/// Counters accumulated while searching
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchStats {
    /// min/max nodes entered
    pub nodes: u64,
    /// Heuristic evaluations at leaves
    pub evaluations: u64,
    /// Sibling loops cut short by a bound
    pub cutoffs: u64,
    /// A leaf was produced by the depth limit rather than a finished game
    pub depth_limited: bool,
}

/// What root-level move selection needs from the engine: value a forecasted
/// state, and check the clock.
pub trait ValueSearch {
    /// Player whose point of view every value is expressed in
    fn perspective(&self) -> Player;

    fn check_time(&self) -> SearchOutcome<()>;

    /// Value of `state` with the opponent of the perspective player to move
    fn min_value(
        &mut self,
        state: &GameState,
        depth: u32,
        alpha: Option<f64>,
        beta: Option<f64>,
    ) -> SearchOutcome<f64>;
}

/// Stateless-per-node search context for one move request
pub struct Search<'a> {
    evaluator: &'a mut Evaluator,
    deadline: &'a dyn Deadline,
    threshold_ms: f64,
    perspective: Player,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    pub fn new(
        evaluator: &'a mut Evaluator,
        deadline: &'a dyn Deadline,
        threshold_ms: f64,
        perspective: Player,
    ) -> Self {
        Search {
            evaluator,
            deadline,
            threshold_ms,
            perspective,
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Returns the counters gathered so far and starts fresh ones
    pub fn take_stats(&mut self) -> SearchStats {
        std::mem::take(&mut self.stats)
    }

    /// True when `state` should be scored instead of expanded
    pub fn terminal_test(&mut self, state: &GameState, depth: u32) -> SearchOutcome<bool> {
        self.check_time()?;
        Ok(depth == 0 || state.legal_moves().is_empty())
    }

    fn leaf(&mut self, state: &GameState, depth: u32) -> f64 {
        if depth == 0 && !state.legal_moves().is_empty() {
            self.stats.depth_limited = true;
        }
        self.stats.evaluations += 1;
        self.evaluator.evaluate(state, self.perspective)
    }

    /// Value of `state` with the perspective player to move
    pub fn max_value(
        &mut self,
        state: &GameState,
        depth: u32,
        mut alpha: Option<f64>,
        beta: Option<f64>,
    ) -> SearchOutcome<f64> {
        let terminal = self.terminal_test(state, depth)?;
        self.stats.nodes += 1;
        if terminal {
            return Ok(self.leaf(state, depth));
        }

        let mut value = f64::NEG_INFINITY;
        for mv in state.legal_moves() {
            let child = forecast(state, mv);
            value = value.max(self.min_node(&child, depth - 1, alpha, beta)?);

            if let Some(b) = beta {
                if value >= b {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            if let Some(a) = alpha {
                alpha = Some(a.max(value));
            }
        }
        Ok(value)
    }

    fn min_node(
        &mut self,
        state: &GameState,
        depth: u32,
        alpha: Option<f64>,
        mut beta: Option<f64>,
    ) -> SearchOutcome<f64> {
        let terminal = self.terminal_test(state, depth)?;
        self.stats.nodes += 1;
        if terminal {
            return Ok(self.leaf(state, depth));
        }

        let mut value = f64::INFINITY;
        for mv in state.legal_moves() {
            let child = forecast(state, mv);
            value = value.min(self.max_value(&child, depth - 1, alpha, beta)?);

            if let Some(a) = alpha {
                if value <= a {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
            if let Some(b) = beta {
                beta = Some(b.min(value));
            }
        }
        Ok(value)
    }
}

impl<'a> ValueSearch for Search<'a> {
    fn perspective(&self) -> Player {
        self.perspective
    }

    fn check_time(&self) -> SearchOutcome<()> {
        if self.deadline.time_left_ms() <= self.threshold_ms {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    fn min_value(
        &mut self,
        state: &GameState,
        depth: u32,
        alpha: Option<f64>,
        beta: Option<f64>,
    ) -> SearchOutcome<f64> {
        self.min_node(state, depth, alpha, beta)
    }
}

/// Applies a move drawn from `legal_moves`.
///
/// Failure here means move generation and move validation disagree, which
/// is a bug rather than a recoverable condition.
pub(crate) fn forecast(state: &GameState, mv: Position) -> GameState {
    match state.apply_move(mv) {
        Ok(next) => next,
        Err(e) => panic!("legal move {} rejected by the board: {}", mv, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::deadline::NoDeadline;
    use crate::eval::Heuristic;
    use std::cell::Cell;

    fn evaluator(heuristic: Heuristic) -> Evaluator {
        Evaluator::new(heuristic, Config::default_hardcoded().scores)
    }

    fn midgame() -> GameState {
        let mut state = GameState::new(5, 5);
        for &(r, c) in [(2, 2), (0, 0), (0, 1), (4, 4)].iter() {
            state = state.force_move(Position::new(r, c)).unwrap();
        }
        state
    }

    #[test]
    fn test_depth_zero_scores_immediately() {
        let mut eval = evaluator(Heuristic::OpenMove);
        let state = midgame();
        let mut search = Search::new(&mut eval, &NoDeadline, 10.0, Player::One);
        let value = search.max_value(&state, 0, None, None).unwrap();
        assert_eq!(value, state.legal_moves_for(Player::One).len() as f64);
        assert!(search.stats().depth_limited);
        assert_eq!(search.stats().evaluations, 1);
    }

    #[test]
    fn test_terminal_test() {
        let mut eval = evaluator(Heuristic::Null);
        let state = midgame();
        let mut search = Search::new(&mut eval, &NoDeadline, 10.0, Player::One);
        assert!(search.terminal_test(&state, 0).unwrap());
        assert!(!search.terminal_test(&state, 2).unwrap());
    }

    #[test]
    fn test_bounded_and_unbounded_values_agree() {
        let state = midgame();
        for depth in 1..5 {
            let mut eval = evaluator(Heuristic::Improved);
            let mut search = Search::new(&mut eval, &NoDeadline, 10.0, Player::One);
            let plain = search.max_value(&state, depth, None, None).unwrap();
            let pruned = search
                .max_value(&state, depth, Some(f64::NEG_INFINITY), Some(f64::INFINITY))
                .unwrap();
            assert_eq!(plain, pruned, "depth {}", depth);
        }
    }

    #[test]
    fn test_pruning_visits_fewer_nodes() {
        let state = midgame();
        let mut eval = evaluator(Heuristic::Improved);

        let mut search = Search::new(&mut eval, &NoDeadline, 10.0, Player::One);
        search.max_value(&state, 4, None, None).unwrap();
        let plain = search.take_stats();
        search
            .max_value(&state, 4, Some(f64::NEG_INFINITY), Some(f64::INFINITY))
            .unwrap();
        let pruned = search.take_stats();

        assert_eq!(plain.cutoffs, 0);
        assert!(pruned.nodes <= plain.nodes);
    }

    #[test]
    fn test_expired_deadline_cancels() {
        let mut eval = evaluator(Heuristic::Null);
        let expired = || 5.0;
        let mut search = Search::new(&mut eval, &expired, 10.0, Player::One);
        assert_eq!(search.max_value(&midgame(), 3, None, None), Err(Cancelled));
        assert_eq!(search.terminal_test(&midgame(), 3), Err(Cancelled));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut eval = evaluator(Heuristic::Null);
        let at_threshold = || 10.0;
        let search = Search::new(&mut eval, &at_threshold, 10.0, Player::One);
        assert_eq!(search.check_time(), Err(Cancelled));
    }

    #[test]
    fn test_cancellation_mid_recursion_unwinds() {
        let mut eval = evaluator(Heuristic::Null);
        let calls = Cell::new(0u32);
        let deadline = || {
            calls.set(calls.get() + 1);
            if calls.get() > 5 {
                0.0
            } else {
                100.0
            }
        };
        let mut search = Search::new(&mut eval, &deadline, 10.0, Player::One);
        assert_eq!(search.max_value(&midgame(), 6, None, None), Err(Cancelled));
        assert_eq!(search.stats().nodes, 5);
    }

    #[test]
    fn test_every_node_polls_the_clock_once() {
        let mut eval = evaluator(Heuristic::Improved);
        let polls = Cell::new(0u64);
        let deadline = || {
            polls.set(polls.get() + 1);
            100.0
        };
        let mut search = Search::new(&mut eval, &deadline, 10.0, Player::One);
        search.max_value(&midgame(), 3, None, None).unwrap();
        assert_eq!(polls.get(), search.stats().nodes);
    }

    #[test]
    fn test_finished_game_is_a_leaf_above_depth_zero() {
        // Player one in the corner with both exits blocked
        let mut state = GameState::new(5, 5);
        for &(r, c) in [(1, 2), (4, 4), (2, 1), (3, 3), (0, 0)].iter() {
            state = state.force_move(Position::new(r, c)).unwrap();
        }
        let state = state.force_move(Position::new(4, 0)).unwrap();
        assert!(state.legal_moves().is_empty());

        let mut eval = evaluator(Heuristic::Improved);
        let mut search = Search::new(&mut eval, &NoDeadline, 10.0, Player::One);
        assert!(search.terminal_test(&state, 3).unwrap());
        let value = search.max_value(&state, 3, None, None).unwrap();
        assert_eq!(value, f64::NEG_INFINITY);
        assert_eq!(search.stats().nodes, 1);
        assert!(!search.stats().depth_limited);
    }
}
