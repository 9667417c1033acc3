// Debug logging module for recording every move of every game
//
// Each move is written as one JSON line holding the position the agent saw
// and the move it picked. Games running on different rayon workers share one
// file handle behind a mutex.

use log::error;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Arc;

use crate::board::{BoardSnapshot, GameState};
use crate::types::{Player, Position};

/// A single debug log entry
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MoveLogEntry {
    pub game_id: usize,
    pub ply: u32,
    pub player: Player,
    pub agent: String,
    pub chosen_move: Option<Position>,
    pub board: BoardSnapshot,
    pub timestamp: String,
}

/// Shared debug logger state
#[derive(Clone)]
pub struct GameLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl GameLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                log::info!("Game logging enabled: {}", log_file_path);
                GameLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create game log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled logger (no-op)
    pub fn disabled() -> Self {
        GameLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records the move `agent` chose in `state`
    pub fn log_move(
        &self,
        game_id: usize,
        state: &GameState,
        agent: &str,
        chosen_move: Option<Position>,
    ) {
        if !self.enabled {
            return;
        }

        let entry = MoveLogEntry {
            game_id,
            ply: state.move_count(),
            player: state.active_player(),
            agent: agent.to_string(),
            chosen_move,
            board: state.snapshot(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let json_line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize game log entry: {}", e);
                return;
            }
        };

        let mut file_guard = self.file.lock();
        if let Some(file) = file_guard.as_mut() {
            if let Err(e) = writeln!(file, "{}", json_line) {
                error!("Failed to write game log entry: {}", e);
            } else if let Err(e) = file.flush() {
                error!("Failed to flush game log: {}", e);
            }
        }
    }
}
