use serde::{Deserialize, Serialize};

pub use crate::game::evaluator::TileState;
pub use crate::game::player::{GameStatus, PlayerView};
pub use crate::game::state::{RoomPhase, RoomStateView};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message on a connection: claim a seat in a room.
    JoinRoom {
        room_code: String,
        player_name: String,
        #[serde(default)]
        persistent_id: Option<String>,
    },
    Guess {
        guess: String,
    },
    Ready {
        ready: bool,
    },
    StartRound,
    NextRound,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    // Targeted (one connection)
    JoinedRoom {
        persistent_id: String,
    },
    JoinRejected {
        reason: String,
    },
    RoomNotFound,
    /// The player's own guess texts, never broadcast.
    PlayerGuesses {
        guesses: Vec<String>,
        round_number: u32,
    },
    InvalidWord {
        word: String,
        row: usize,
    },

    // Broadcast to the whole room after every mutation
    RoomState {
        state: RoomStateView,
    },
}
