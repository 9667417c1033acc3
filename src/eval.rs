//! Position evaluation.
//!
//! Every heuristic honours the same terminal contract: a player that has lost
//! (or can never move again) scores negative infinity, a player whose opponent
//! is in that situation scores positive infinity. Everything else gets a
//! finite score from the selected [`Heuristic`].

use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::board::{Fingerprint, GameState};
use crate::config::ScoresConfig;
use crate::types::{Player, Position};

/// The enumerated set of evaluation functions an agent can be built with
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Zero for every non-terminal state
    Null,
    /// Own mobility
    OpenMove,
    /// Own mobility minus weighted opponent mobility
    Improved,
    /// Weighted centerness differential
    Centerness,
    /// Euclidean distance between the players
    Distance,
    /// Mobility, fading centerness, attack bonus and reachable-cell lookahead
    Composite,
}

impl Heuristic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Heuristic::Null => "null",
            Heuristic::OpenMove => "open_move",
            Heuristic::Improved => "improved",
            Heuristic::Centerness => "centerness",
            Heuristic::Distance => "distance",
            Heuristic::Composite => "composite",
        }
    }
}

/// Memoized scores, owned by a single evaluator
#[derive(Debug, Default)]
pub struct ScoreCache {
    scores: HashMap<(Fingerprint, Player), f64>,
    hits: u64,
    misses: u64,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&mut self, key: &(Fingerprint, Player)) -> Option<f64> {
        match self.scores.get(key) {
            Some(&score) => {
                self.hits += 1;
                Some(score)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

/// Scores states from a given player's point of view
#[derive(Debug)]
pub struct Evaluator {
    heuristic: Heuristic,
    weights: ScoresConfig,
    cache: Option<ScoreCache>,
}

impl Evaluator {
    pub fn new(heuristic: Heuristic, weights: ScoresConfig) -> Self {
        Evaluator {
            heuristic,
            weights,
            cache: None,
        }
    }

    /// Enables memoization of non-terminal scores
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(ScoreCache::new());
        self
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    pub fn cache(&self) -> Option<&ScoreCache> {
        self.cache.as_ref()
    }

    /// Scores `state` for `player`
    pub fn evaluate(&mut self, state: &GameState, player: Player) -> f64 {
        if let Some(score) = terminal_score(state, player) {
            return score;
        }

        let heuristic = self.heuristic;
        let weights = &self.weights;
        match self.cache.as_mut() {
            Some(cache) => {
                let key = (state.fingerprint(), player);
                if let Some(score) = cache.lookup(&key) {
                    return score;
                }
                let score = score_with(heuristic, weights, state, player);
                cache.scores.insert(key, score);
                score
            }
            None => score_with(heuristic, weights, state, player),
        }
    }
}

/// Infinite score when the game is decided for `player`, None otherwise.
///
/// Cells never unblock, so a player with no moves now will have none on
/// their turn either; when both players are stuck the one to move loses.
pub fn terminal_score(state: &GameState, player: Player) -> Option<f64> {
    if state.is_loser(player) {
        return Some(f64::NEG_INFINITY);
    }
    if state.is_winner(player) {
        return Some(f64::INFINITY);
    }
    if state.legal_moves_for(player).is_empty() {
        return Some(f64::NEG_INFINITY);
    }
    if state.legal_moves_for(player.opponent()).is_empty() {
        return Some(f64::INFINITY);
    }
    None
}

fn score_with(
    heuristic: Heuristic,
    weights: &ScoresConfig,
    state: &GameState,
    player: Player,
) -> f64 {
    match heuristic {
        Heuristic::Null => 0.0,
        Heuristic::OpenMove => open_move_score(state, player),
        Heuristic::Improved => improved_score(state, player, weights),
        Heuristic::Centerness => centerness_score(state, player, weights),
        Heuristic::Distance => distance_score(state, player),
        Heuristic::Composite => composite_score(state, player, weights),
    }
}

pub fn open_move_score(state: &GameState, player: Player) -> f64 {
    state.legal_moves_for(player).len() as f64
}

pub fn improved_score(state: &GameState, player: Player, weights: &ScoresConfig) -> f64 {
    let own = state.legal_moves_for(player).len() as f64;
    let opp = state.legal_moves_for(player.opponent()).len() as f64;
    own - weights.improved_opp_weight * opp
}

pub fn centerness_score(state: &GameState, player: Player, weights: &ScoresConfig) -> f64 {
    let own = centerness(state, state.location(player));
    let opp = centerness(state, state.location(player.opponent()));
    own * weights.center_own_weight - opp * weights.center_opp_weight
}

pub fn distance_score(state: &GameState, player: Player) -> f64 {
    match (state.location(player), state.location(player.opponent())) {
        (Some(own), Some(opp)) => distance_between(
            (own.row as f64, own.col as f64),
            (opp.row as f64, opp.col as f64),
        ),
        _ => 0.0,
    }
}

/// Weighted mobility, opening centerness, attack bonus and lookahead mobility
pub fn composite_score(state: &GameState, player: Player, weights: &ScoresConfig) -> f64 {
    let opponent = player.opponent();

    let own_moves = state.legal_moves_for(player).len() as f64;
    let opp_moves = state.legal_moves_for(opponent).len() as f64;
    let moves_score = own_moves * weights.own_moves_weight - opp_moves * weights.opp_moves_weight;

    let mut centerness_term = 0.0;
    if game_progress(state) < weights.opening_progress_cutoff {
        let own = centerness(state, state.location(player));
        let opp = centerness(state, state.location(opponent));
        centerness_term = (own - opp) * centerness_weight(state);
    }

    let attack_term = match (state.location(player), state.location(opponent)) {
        (Some(own), Some(opp)) if own.is_knight_jump_from(&opp) => weights.attack_bonus,
        _ => 0.0,
    };

    let own_reach = reachable_within(state, player, weights.lookahead_hops) as f64;
    let opp_reach = reachable_within(state, opponent, weights.lookahead_hops) as f64;
    let lookahead_term = (own_reach - opp_reach) * weights.lookahead_weight;

    moves_score + centerness_term + attack_term + lookahead_term
}

/// Share of the board already consumed, in [0, 1]
pub fn game_progress(state: &GameState) -> f64 {
    let cells = (state.width() * state.height()) as f64;
    if cells <= 0.0 {
        return 1.0;
    }
    state.move_count() as f64 / cells
}

/// Centerness counts most in the opening and fades as 1/ply
pub fn centerness_weight(state: &GameState) -> f64 {
    1.0 / state.move_count().max(1) as f64
}

/// 1.0 at the geometric center, inverse distance elsewhere, 0 when unplaced
pub fn centerness(state: &GameState, location: Option<Position>) -> f64 {
    let pos = match location {
        Some(pos) => pos,
        None => return 0.0,
    };
    let center = (
        state.height() as f64 / 2.0 - 0.5,
        state.width() as f64 / 2.0 - 0.5,
    );
    let distance = distance_between(center, (pos.row as f64, pos.col as f64));
    if distance == 0.0 {
        1.0
    } else {
        1.0 / distance
    }
}

pub fn distance_between(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Number of distinct open cells `player` could reach in up to `hops` knight
/// jumps, with the board frozen as it is now.
pub fn reachable_within(state: &GameState, player: Player, hops: u32) -> usize {
    if hops == 0 {
        return 0;
    }

    let mut seen: HashSet<Position> = HashSet::new();
    let mut frontier = state.legal_moves_for(player);
    seen.extend(frontier.iter().copied());

    for _ in 1..hops {
        let mut next = Vec::new();
        for pos in &frontier {
            for target in state.moves_from(Some(*pos)) {
                if seen.insert(target) {
                    next.push(target);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    seen.len()
}
