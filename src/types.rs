// Core value types shared by the board, the evaluators and the search

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight knight jumps, in legal-move enumeration order.
///
/// This order drives tie-breaking: when two moves score the same, the one
/// produced first by this table wins.
pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// One of the two players
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Returns both players in turn order
    pub fn all() -> [Player; 2] {
        [Player::One, Player::Two]
    }

    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Slot of this player in per-player arrays
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::One => "player one",
            Player::Two => "player two",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grid cell. Moves are expressed as the cell the mover wants to occupy.
///
/// "No move" is represented as `None` in an `Option<Position>`, so the
/// sentinel can never be mistaken for a board coordinate.
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// Cell reached by jumping `offset` from here (may be off the board)
    pub fn offset(&self, offset: (i32, i32)) -> Position {
        Position {
            row: self.row + offset.0,
            col: self.col + offset.1,
        }
    }

    /// True when `other` is exactly one knight jump away, ignoring blocking
    pub fn is_knight_jump_from(&self, other: &Position) -> bool {
        KNIGHT_OFFSETS
            .iter()
            .any(|&offset| other.offset(offset) == *self)
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Formats an optional move, spelling out the sentinel
pub fn describe_move(mv: Option<Position>) -> String {
    match mv {
        Some(pos) => pos.to_string(),
        None => "no move".to_string(),
    }
}
