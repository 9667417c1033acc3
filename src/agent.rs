// Move-selection strategies built on the search engine
//
// Every agent exposes the same contract: given a state and a deadline, return
// a legal move in time, or None only when the active player has no moves.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::time::Instant;

use crate::board::GameState;
use crate::config::{AgentConfig, ScoresConfig, StrategyKind};
use crate::deadline::Deadline;
use crate::eval::Evaluator;
use crate::search::{forecast, Cancelled, Search, SearchOutcome, SearchStats, ValueSearch};
use crate::types::{describe_move, Position};

/// A game-playing agent
pub trait Agent {
    fn name(&self) -> &str;

    /// Picks a move for the active player before `deadline` runs out
    fn select_move(&mut self, state: &GameState, deadline: &dyn Deadline) -> Option<Position>;
}

/// Best root move found by a search together with its value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootChoice {
    pub best_move: Option<Position>,
    pub value: f64,
}

impl RootChoice {
    fn none() -> Self {
        RootChoice {
            best_move: None,
            value: f64::NEG_INFINITY,
        }
    }
}

/// Full-width minimax to a fixed depth.
///
/// Moves are tried in enumeration order and only a strictly better value
/// replaces the current best, so the first of several equal moves wins.
/// Returns no move at depth 0 or when the active player is stuck.
pub fn minimax<S: ValueSearch>(
    search: &mut S,
    state: &GameState,
    depth: u32,
) -> SearchOutcome<RootChoice> {
    search.check_time()?;

    let moves = state.legal_moves();
    if depth == 0 || moves.is_empty() {
        return Ok(RootChoice::none());
    }

    let mut choice = RootChoice {
        best_move: Some(moves[0]),
        value: f64::NEG_INFINITY,
    };
    for mv in moves {
        let value = search.min_value(&forecast(state, mv), depth - 1, None, None)?;
        if value > choice.value {
            choice = RootChoice {
                best_move: Some(mv),
                value,
            };
        }
    }
    Ok(choice)
}

/// Depth-limited alpha-beta from the root.
///
/// `alpha` rises whenever a strictly better move appears; the loop stops once
/// a value reaches `beta`.
pub fn alphabeta<S: ValueSearch>(
    search: &mut S,
    state: &GameState,
    depth: u32,
    mut alpha: f64,
    beta: f64,
) -> SearchOutcome<RootChoice> {
    search.check_time()?;

    let moves = state.legal_moves();
    if depth == 0 || moves.is_empty() {
        return Ok(RootChoice::none());
    }

    let mut best_move = moves[0];
    let mut best_value = f64::NEG_INFINITY;
    for mv in moves {
        let value = search.min_value(&forecast(state, mv), depth - 1, Some(alpha), Some(beta))?;

        if value > best_value {
            best_value = value;
        }
        if value > alpha {
            alpha = value;
            best_move = mv;
        }
        if value >= beta {
            break;
        }
    }

    Ok(RootChoice {
        best_move: Some(best_move),
        value: best_value,
    })
}

/// Fixed-depth minimax agent
pub struct MinimaxAgent {
    name: String,
    search_depth: u32,
    evaluator: Evaluator,
    threshold_ms: f64,
}

impl MinimaxAgent {
    pub fn new(name: &str, search_depth: u32, evaluator: Evaluator, threshold_ms: f64) -> Self {
        MinimaxAgent {
            name: name.to_string(),
            search_depth,
            evaluator,
            threshold_ms,
        }
    }

    /// Runs minimax at `depth` from the active player's point of view
    pub fn search(
        &mut self,
        state: &GameState,
        depth: u32,
        deadline: &dyn Deadline,
    ) -> SearchOutcome<RootChoice> {
        let mut search = Search::new(
            &mut self.evaluator,
            deadline,
            self.threshold_ms,
            state.active_player(),
        );
        minimax(&mut search, state, depth)
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, state: &GameState, deadline: &dyn Deadline) -> Option<Position> {
        let moves = state.legal_moves();
        let fallback = *moves.first()?;

        match self.search(state, self.search_depth, deadline) {
            Ok(choice) => {
                debug!(
                    "{}: minimax depth {} chose {} (value {})",
                    self.name,
                    self.search_depth,
                    describe_move(choice.best_move),
                    choice.value
                );
                Some(choice.best_move.unwrap_or(fallback))
            }
            Err(Cancelled) => {
                warn!(
                    "{}: minimax depth {} timed out, playing {}",
                    self.name, self.search_depth, fallback
                );
                Some(fallback)
            }
        }
    }
}

/// What happened during the last iterative-deepening move request
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    /// Move chosen by every fully completed depth, shallowest first
    pub completed: Vec<(u32, Option<Position>)>,
    pub best_move: Option<Position>,
    pub timed_out: bool,
    /// The last completed depth reached the end of every line
    pub exhausted: bool,
    pub stats: SearchStats,
    pub elapsed_ms: f64,
}

impl SearchReport {
    pub fn depth_reached(&self) -> u32 {
        self.completed.last().map(|&(depth, _)| depth).unwrap_or(0)
    }
}

/// Iterative-deepening alpha-beta agent
pub struct AlphaBetaAgent {
    name: String,
    evaluator: Evaluator,
    threshold_ms: f64,
    max_depth: Option<u32>,
    last_report: Option<SearchReport>,
}

impl AlphaBetaAgent {
    pub fn new(name: &str, evaluator: Evaluator, threshold_ms: f64) -> Self {
        AlphaBetaAgent {
            name: name.to_string(),
            evaluator,
            threshold_ms,
            max_depth: None,
            last_report: None,
        }
    }

    /// Stops deepening after `max_depth` even if time remains
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }

    /// Single alpha-beta pass at `depth` with the full window
    pub fn alphabeta(
        &mut self,
        state: &GameState,
        depth: u32,
        deadline: &dyn Deadline,
    ) -> SearchOutcome<RootChoice> {
        let mut search = Search::new(
            &mut self.evaluator,
            deadline,
            self.threshold_ms,
            state.active_player(),
        );
        alphabeta(&mut search, state, depth, f64::NEG_INFINITY, f64::INFINITY)
    }

    fn deepen(&mut self, state: &GameState, deadline: &dyn Deadline) -> SearchReport {
        let start = Instant::now();
        let mut report = SearchReport::default();
        let mut search = Search::new(
            &mut self.evaluator,
            deadline,
            self.threshold_ms,
            state.active_player(),
        );

        let mut depth = 1;
        loop {
            if let Some(max) = self.max_depth {
                if depth > max {
                    break;
                }
            }

            let outcome = search
                .check_time()
                .and_then(|_| alphabeta(&mut search, state, depth, f64::NEG_INFINITY, f64::INFINITY));
            let stats = search.take_stats();
            report.stats.nodes += stats.nodes;
            report.stats.evaluations += stats.evaluations;
            report.stats.cutoffs += stats.cutoffs;

            match outcome {
                Ok(choice) => {
                    debug!(
                        "{}: depth {} complete, best {} (value {}, {} nodes)",
                        self.name,
                        depth,
                        describe_move(choice.best_move),
                        choice.value,
                        stats.nodes
                    );
                    report.best_move = choice.best_move;
                    report.completed.push((depth, choice.best_move));

                    if !stats.depth_limited {
                        report.exhausted = true;
                        break;
                    }
                    depth += 1;
                }
                Err(Cancelled) => {
                    report.timed_out = true;
                    break;
                }
            }
        }

        report.stats.depth_limited = !report.exhausted;
        report.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        report
    }
}

impl Agent for AlphaBetaAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, state: &GameState, deadline: &dyn Deadline) -> Option<Position> {
        let moves = state.legal_moves();
        let fallback = match moves.first() {
            Some(&mv) => mv,
            None => {
                self.last_report = None;
                return None;
            }
        };

        let report = self.deepen(state, deadline);
        let chosen = report.best_move.unwrap_or(fallback);

        debug!(
            "{} [{}]: chose {} at depth {} ({} nodes, {:.1}ms{})",
            self.name,
            self.evaluator.heuristic().as_str(),
            chosen,
            report.depth_reached(),
            report.stats.nodes,
            report.elapsed_ms,
            if report.timed_out { ", timed out" } else { "" }
        );

        self.last_report = Some(report);
        Some(chosen)
    }
}

/// Picks the successor with the best immediate evaluation
pub struct GreedyAgent {
    name: String,
    evaluator: Evaluator,
}

impl GreedyAgent {
    pub fn new(name: &str, evaluator: Evaluator) -> Self {
        GreedyAgent {
            name: name.to_string(),
            evaluator,
        }
    }
}

impl Agent for GreedyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, state: &GameState, _deadline: &dyn Deadline) -> Option<Position> {
        let me = state.active_player();
        let mut best: Option<(Position, f64)> = None;
        for mv in state.legal_moves() {
            let score = self.evaluator.evaluate(&forecast(state, mv), me);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((mv, score)),
            }
        }
        best.map(|(mv, _)| mv)
    }
}

/// Plays a uniformly random legal move
pub struct RandomAgent {
    name: String,
    rng: StdRng,
}

impl RandomAgent {
    pub fn new(name: &str, seed: u64) -> Self {
        RandomAgent {
            name: name.to_string(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, state: &GameState, _deadline: &dyn Deadline) -> Option<Position> {
        state.legal_moves().choose(&mut self.rng).copied()
    }
}

/// Builds the agent described by `config`
///
/// # Arguments
/// * `config` - Strategy, heuristic and depth settings for this agent
/// * `scores` - Heuristic weights
/// * `threshold_ms` - Safety margin at which searches give up
/// * `seed` - RNG seed, only used by random agents
pub fn build_agent(
    config: &AgentConfig,
    scores: &ScoresConfig,
    threshold_ms: f64,
    seed: u64,
) -> Box<dyn Agent + Send> {
    let mut evaluator = Evaluator::new(config.heuristic, scores.clone());
    if config.cache_scores {
        evaluator = evaluator.with_cache();
    }

    match config.strategy {
        StrategyKind::Minimax => Box::new(MinimaxAgent::new(
            &config.name,
            config.search_depth,
            evaluator,
            threshold_ms,
        )),
        StrategyKind::AlphaBeta => {
            let agent = AlphaBetaAgent::new(&config.name, evaluator, threshold_ms);
            match config.max_search_depth {
                Some(max) => Box::new(agent.with_max_depth(max)),
                None => Box::new(agent),
            }
        }
        StrategyKind::Greedy => Box::new(GreedyAgent::new(&config.name, evaluator)),
        StrategyKind::Random => Box::new(RandomAgent::new(&config.name, seed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::deadline::NoDeadline;
    use crate::eval::Heuristic;

    fn evaluator(heuristic: Heuristic) -> Evaluator {
        Evaluator::new(heuristic, Config::default_hardcoded().scores)
    }

    fn opening() -> GameState {
        GameState::new(5, 5)
            .force_move(Position::new(2, 2))
            .unwrap()
            .force_move(Position::new(0, 0))
            .unwrap()
    }

    #[test]
    fn test_minimax_depth_zero_returns_no_move() {
        let mut agent = MinimaxAgent::new("m", 3, evaluator(Heuristic::Improved), 10.0);
        let choice = agent.search(&opening(), 0, &NoDeadline).unwrap();
        assert_eq!(choice.best_move, None);
    }

    #[test]
    fn test_null_heuristic_ties_go_to_first_move() {
        let state = opening();
        let first = state.legal_moves()[0];
        let mut agent = MinimaxAgent::new("m", 1, evaluator(Heuristic::Null), 10.0);
        assert_eq!(agent.select_move(&state, &NoDeadline), Some(first));

        let mut agent = AlphaBetaAgent::new("ab", evaluator(Heuristic::Null), 10.0).with_max_depth(1);
        assert_eq!(agent.select_move(&state, &NoDeadline), Some(first));
    }

    #[test]
    fn test_max_depth_caps_deepening() {
        let mut agent =
            AlphaBetaAgent::new("ab", evaluator(Heuristic::Improved), 10.0).with_max_depth(3);
        agent.select_move(&opening(), &NoDeadline);
        let report = agent.last_report().unwrap();
        assert_eq!(report.depth_reached(), 3);
        assert!(!report.timed_out);
    }

    #[test]
    fn test_random_agent_is_reproducible() {
        let state = opening();
        let mut a = RandomAgent::new("r", 7);
        let mut b = RandomAgent::new("r", 7);
        for _ in 0..5 {
            let mv = a.select_move(&state, &NoDeadline);
            assert_eq!(mv, b.select_move(&state, &NoDeadline));
            assert!(state.legal_moves().contains(&mv.unwrap()));
        }
    }

    #[test]
    fn test_greedy_prefers_mobility() {
        let state = opening();
        let mut agent = GreedyAgent::new("g", evaluator(Heuristic::OpenMove));
        let mv = agent.select_move(&state, &NoDeadline).unwrap();
        let me = state.active_player();
        let best = state
            .legal_moves()
            .iter()
            .map(|&m| state.apply_move(m).unwrap().legal_moves_for(me).len())
            .max()
            .unwrap();
        assert_eq!(state.apply_move(mv).unwrap().legal_moves_for(me).len(), best);
    }

    #[test]
    fn test_build_agent_uses_configured_name() {
        let config = Config::default_hardcoded();
        let agent = build_agent(
            &config.agent,
            &config.scores,
            config.timing.timer_threshold_ms,
            1,
        );
        assert_eq!(agent.name(), config.agent.name);
    }
}
