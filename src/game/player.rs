use serde::{Deserialize, Serialize};

use crate::game::evaluator::{TileState, WORD_LENGTH};

pub const MAX_GUESSES: usize = 6;
pub const GRID_CELLS: usize = MAX_GUESSES * WORD_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Won,
    Lost,
}

/// Per-round guess texts. Private to the owning player: pushed only to their
/// connection, never part of the synchronized room state.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessHistory {
    pub round_number: u32,
    pub rows: [String; MAX_GUESSES],
}

impl GuessHistory {
    pub fn for_round(round_number: u32) -> Self {
        Self {
            round_number,
            rows: std::array::from_fn(|_| String::new()),
        }
    }
}

/// A connected player's live state within a room.
pub struct Player {
    pub session_id: String,
    pub name: String,
    pub current_row: usize,
    pub status: GameStatus,
    pub ready: bool,
    /// Elapsed ms from round start to win.
    pub completion_time: Option<u64>,
    pub total_score: u32,
    /// Flat 6x5 tile grid, row-major: cell = row * 5 + col.
    pub progress: [TileState; GRID_CELLS],
    pub guesses: GuessHistory,
}

impl Player {
    pub fn new(session_id: &str, name: &str, round_number: u32) -> Self {
        Self {
            session_id: session_id.to_string(),
            name: name.to_string(),
            current_row: 0,
            status: GameStatus::Waiting,
            ready: false,
            completion_time: None,
            total_score: 0,
            progress: [TileState::Empty; GRID_CELLS],
            guesses: GuessHistory::for_round(round_number),
        }
    }

    /// Reset in-round state at round start. Cumulative score and ready flag
    /// are deliberately untouched.
    pub fn reset_for_round(&mut self, round_number: u32) {
        self.status = GameStatus::Playing;
        self.current_row = 0;
        self.completion_time = None;
        self.progress = [TileState::Empty; GRID_CELLS];
        self.guesses = GuessHistory::for_round(round_number);
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.session_id.clone(),
            name: self.name.clone(),
            current_row: self.current_row,
            status: self.status,
            ready: self.ready,
            completion_time: self.completion_time,
            total_score: self.total_score,
            progress: self.progress.to_vec(),
        }
    }
}

/// The public fields synchronized to every client in the room. Guess texts
/// are absent by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub current_row: usize,
    pub status: GameStatus,
    pub ready: bool,
    pub completion_time: Option<u64>,
    pub total_score: u32,
    pub progress: Vec<TileState>,
}
