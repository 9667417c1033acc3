// Board state for knight's-move Isolation
//
// A GameState is never mutated after construction: applying a move forecasts
// a brand new state, so search can explore sibling branches freely.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::types::{Player, Position, KNIGHT_OFFSETS};

/// Reasons a move cannot be applied
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("{pos} is outside the {width}x{height} board")]
    OutOfBounds { pos: Position, width: i32, height: i32 },
    #[error("{pos} is already blocked")]
    Blocked { pos: Position },
    #[error("{pos} is not a knight jump away for {player}")]
    Unreachable { pos: Position, player: Player },
}

/// Exact, hashable encoding of a state's blocked cells, locations and turn.
/// Two states share a fingerprint only if they are the same position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    blocked: Vec<u64>,
    locations: [Option<Position>; 2],
    active: Player,
}

/// Serializable form of a state, used in game logs
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    pub blocked: Vec<Position>,
    pub player_one: Option<Position>,
    pub player_two: Option<Position>,
    pub active: Player,
}

/// Immutable snapshot of an Isolation game
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameState {
    width: i32,
    height: i32,
    blocked: Vec<bool>,
    locations: [Option<Position>; 2],
    active: Player,
    move_count: u32,
}

/// Largest board, in cells, a state may be built with
pub const MAX_CELLS: usize = 1 << 16;

/// Checks board dimensions before any cell storage is sized from them
pub fn check_dimensions(width: i32, height: i32) -> Result<usize, String> {
    if width <= 0 || height <= 0 {
        return Err(format!("Invalid board dimensions {}x{}", width, height));
    }
    match (width as usize).checked_mul(height as usize) {
        Some(cells) if cells <= MAX_CELLS => Ok(cells),
        _ => Err(format!(
            "Board {}x{} exceeds the {} cell limit",
            width, height, MAX_CELLS
        )),
    }
}

impl GameState {
    /// Creates an empty board with player one to move.
    ///
    /// Callers with untrusted dimensions go through `check_dimensions` first;
    /// `width * height` must not exceed `MAX_CELLS`.
    pub fn new(width: i32, height: i32) -> Self {
        let cells = (width.max(0) as usize) * (height.max(0) as usize);
        GameState {
            width,
            height,
            blocked: vec![false; cells],
            locations: [None, None],
            active: Player::One,
            move_count: 0,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn active_player(&self) -> Player {
        self.active
    }

    pub fn inactive_player(&self) -> Player {
        self.active.opponent()
    }

    /// Number of moves applied so far (one per blocked cell)
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Current cell of `player`, or None before their first move
    pub fn location(&self, player: Player) -> Option<Position> {
        self.locations[player.index()]
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.row >= 0 && pos.row < self.height && pos.col >= 0 && pos.col < self.width
    }

    fn cell_index(&self, pos: &Position) -> usize {
        (pos.row * self.width + pos.col) as usize
    }

    pub fn is_blocked(&self, pos: &Position) -> bool {
        !self.in_bounds(pos) || self.blocked[self.cell_index(pos)]
    }

    /// True when `pos` is on the board and unoccupied
    pub fn is_open(&self, pos: &Position) -> bool {
        !self.is_blocked(pos)
    }

    /// All open cells, column-major (column outer, row inner)
    pub fn open_cells(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for col in 0..self.width {
            for row in 0..self.height {
                let pos = Position::new(row, col);
                if self.is_open(&pos) {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    /// Open cells one knight jump from `from`.
    ///
    /// A player who has not moved yet may go anywhere, so `None` yields every
    /// open cell.
    pub fn moves_from(&self, from: Option<Position>) -> Vec<Position> {
        match from {
            None => self.open_cells(),
            Some(origin) => KNIGHT_OFFSETS
                .iter()
                .map(|&offset| origin.offset(offset))
                .filter(|target| self.is_open(target))
                .collect(),
        }
    }

    /// Legal moves for the active player, in stable enumeration order
    pub fn legal_moves(&self) -> Vec<Position> {
        self.legal_moves_for(self.active)
    }

    /// Legal moves `player` would have if it were their turn
    pub fn legal_moves_for(&self, player: Player) -> Vec<Position> {
        self.moves_from(self.location(player))
    }

    /// Checks whether the active player may move to `pos`
    pub fn check_move(&self, pos: &Position) -> Result<(), IllegalMove> {
        self.check_placement(pos)?;
        if let Some(origin) = self.location(self.active) {
            if !pos.is_knight_jump_from(&origin) {
                return Err(IllegalMove::Unreachable {
                    pos: *pos,
                    player: self.active,
                });
            }
        }
        Ok(())
    }

    fn check_placement(&self, pos: &Position) -> Result<(), IllegalMove> {
        if !self.in_bounds(pos) {
            return Err(IllegalMove::OutOfBounds {
                pos: *pos,
                width: self.width,
                height: self.height,
            });
        }
        if self.is_blocked(pos) {
            return Err(IllegalMove::Blocked { pos: *pos });
        }
        Ok(())
    }

    /// Forecasts the state after the active player moves to `pos`
    pub fn apply_move(&self, pos: Position) -> Result<GameState, IllegalMove> {
        self.check_move(&pos)?;
        Ok(self.advance(pos))
    }

    /// Places the active player on `pos` without the knight-jump check.
    ///
    /// Meant for building positions; bounds and blocking are still enforced
    /// so the state invariants hold.
    pub fn force_move(&self, pos: Position) -> Result<GameState, IllegalMove> {
        self.check_placement(&pos)?;
        Ok(self.advance(pos))
    }

    fn advance(&self, pos: Position) -> GameState {
        let mut next = self.clone();
        let idx = next.cell_index(&pos);
        next.blocked[idx] = true;
        next.locations[self.active.index()] = Some(pos);
        next.active = self.active.opponent();
        next.move_count += 1;
        next
    }

    /// True if `player` is to move and has no legal moves
    pub fn is_loser(&self, player: Player) -> bool {
        player == self.active && self.legal_moves().is_empty()
    }

    /// True if the opponent of `player` is to move and has no legal moves
    pub fn is_winner(&self, player: Player) -> bool {
        player != self.active && self.legal_moves().is_empty()
    }

    /// +inf for the winner, -inf for the loser, 0 while the game is running
    pub fn utility(&self, player: Player) -> f64 {
        if self.is_winner(player) {
            f64::INFINITY
        } else if self.is_loser(player) {
            f64::NEG_INFINITY
        } else {
            0.0
        }
    }

    pub fn fingerprint(&self) -> Fingerprint {
        let mut words = vec![0u64; (self.blocked.len() + 63) / 64];
        for (i, &blocked) in self.blocked.iter().enumerate() {
            if blocked {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        Fingerprint {
            blocked: words,
            locations: self.locations,
            active: self.active,
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut blocked = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let pos = Position::new(row, col);
                if self.is_blocked(&pos) {
                    blocked.push(pos);
                }
            }
        }
        BoardSnapshot {
            width: self.width,
            height: self.height,
            blocked,
            player_one: self.locations[0],
            player_two: self.locations[1],
            active: self.active,
        }
    }

    /// Rebuilds a state from a logged snapshot, rejecting inconsistent ones
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<GameState, String> {
        check_dimensions(snapshot.width, snapshot.height)?;

        let mut state = GameState::new(snapshot.width, snapshot.height);
        for pos in &snapshot.blocked {
            if !state.in_bounds(pos) {
                return Err(format!("Blocked cell {} is off the board", pos));
            }
            let idx = state.cell_index(pos);
            if state.blocked[idx] {
                return Err(format!("Blocked cell {} listed twice", pos));
            }
            state.blocked[idx] = true;
        }

        for (player, location) in [
            (Player::One, snapshot.player_one),
            (Player::Two, snapshot.player_two),
        ]
        .iter()
        {
            if let Some(pos) = location {
                if !state.in_bounds(pos) || !state.blocked[state.cell_index(pos)] {
                    return Err(format!("{} stands on unblocked cell {}", player, pos));
                }
            }
            state.locations[player.index()] = *location;
        }

        if snapshot.player_one.is_some() && snapshot.player_one == snapshot.player_two {
            return Err("Both players share one cell".to_string());
        }

        state.active = snapshot.active;
        state.move_count = snapshot.blocked.len() as u32;
        Ok(state)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for col in 0..self.width {
            write!(f, " {:>2} ", col)?;
        }
        writeln!(f)?;

        for row in 0..self.height {
            write!(f, "{:>2}  |", row)?;
            for col in 0..self.width {
                let pos = Position::new(row, col);
                let symbol = if self.locations[0] == Some(pos) {
                    '1'
                } else if self.locations[1] == Some(pos) {
                    '2'
                } else if self.is_blocked(&pos) {
                    '-'
                } else {
                    ' '
                };
                write!(f, " {} |", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
