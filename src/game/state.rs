use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::game::evaluator::{self, TileState, WORD_LENGTH};
use crate::game::player::{GameStatus, Player, PlayerView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomPhase {
    Waiting,
    Playing,
    Finished,
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Server-authoritative state of one room: the phase machine, the secret
/// word, and every connected player (pure state, no I/O).
pub struct RoomState {
    pub phase: RoomPhase,
    pub current_round: u32,
    secret_word: String,
    pub round_start_time: Option<u64>,
    pub round_end_time: Option<u64>,
    pub winner: Option<String>,
    pub language: String,
    players: HashMap<String, Player>, // session_id -> player
}

impl RoomState {
    pub fn new(language: &str) -> Self {
        Self {
            phase: RoomPhase::Waiting,
            current_round: 0,
            secret_word: String::new(),
            round_start_time: None,
            round_end_time: None,
            winner: None,
            language: language.to_string(),
            players: HashMap::new(),
        }
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.session_id.clone(), player);
    }

    pub fn remove_player(&mut self, session_id: &str) -> Option<Player> {
        self.players.remove(session_id)
    }

    pub fn player(&self, session_id: &str) -> Option<&Player> {
        self.players.get(session_id)
    }

    pub fn player_mut(&mut self, session_id: &str) -> Option<&mut Player> {
        self.players.get_mut(session_id)
    }

    pub fn contains_session(&self, session_id: &str) -> bool {
        self.players.contains_key(session_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.players.keys().cloned().collect()
    }

    pub fn all_ready(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|p| p.ready)
    }

    pub fn can_start_next_round(&self) -> bool {
        matches!(self.phase, RoomPhase::Waiting | RoomPhase::Finished)
    }

    /// Advance the round counter and begin play with the given secret word.
    /// No-op unless the phase allows it.
    pub fn start_next_round(&mut self, word: &str) {
        if !self.can_start_next_round() {
            return;
        }
        self.current_round += 1;
        self.phase = RoomPhase::Playing;
        self.secret_word = word.to_uppercase();
        self.round_start_time = Some(now_ms());
        self.round_end_time = None;
        self.winner = None;
        let round = self.current_round;
        for player in self.players.values_mut() {
            player.reset_for_round(round);
        }
    }

    /// True once every participating player is done. Players still `waiting`
    /// never guessed this round and neither block nor trigger the end.
    pub fn round_should_end(&self) -> bool {
        let mut participated = false;
        for player in self.players.values() {
            match player.status {
                GameStatus::Playing => return false,
                GameStatus::Won | GameStatus::Lost => participated = true,
                GameStatus::Waiting => {}
            }
        }
        participated
    }

    pub fn finish_round(&mut self) {
        self.phase = RoomPhase::Finished;
        self.round_end_time = Some(now_ms());
        self.winner = self.overall_winner();
        for player in self.players.values_mut() {
            player.status = GameStatus::Waiting;
        }
    }

    /// Session id of the highest cumulative scorer.
    pub fn overall_winner(&self) -> Option<String> {
        let mut best: Option<&Player> = None;
        for player in self.players.values() {
            if best.is_none_or(|b| player.total_score > b.total_score) {
                best = Some(player);
            }
        }
        best.map(|p| p.session_id.clone())
    }

    pub fn evaluate(&self, guess: &str) -> [TileState; WORD_LENGTH] {
        evaluator::evaluate_guess(&self.secret_word, guess)
    }

    /// Round score for a player, computed at the win instant: base points by
    /// the row they solved on, plus 2 if no other participant has won yet.
    pub fn calculate_score(&self, session_id: &str) -> u32 {
        let Some(player) = self.players.get(session_id) else {
            return 0;
        };
        if player.status != GameStatus::Won {
            return 0;
        }

        let others: Vec<&Player> = self
            .players
            .values()
            .filter(|p| p.session_id != session_id)
            .filter(|p| {
                matches!(
                    p.status,
                    GameStatus::Playing | GameStatus::Won | GameStatus::Lost
                )
            })
            .collect();
        let first_to_solve = !others.is_empty()
            && others
                .iter()
                .all(|p| matches!(p.status, GameStatus::Playing | GameStatus::Lost));
        let bonus = if first_to_solve { 2 } else { 0 };

        let base = match player.current_row {
            0 => 10,
            1 => 9,
            2 => 8,
            3 => 7,
            4 => 6,
            5 => 5,
            _ => 1,
        };
        base + bonus
    }

    pub fn view(&self) -> RoomStateView {
        RoomStateView {
            phase: self.phase,
            current_round: self.current_round,
            winner: self.winner.clone(),
            round_start_time: self.round_start_time,
            round_end_time: self.round_end_time,
            language: self.language.clone(),
            players: self
                .players
                .iter()
                .map(|(id, p)| (id.clone(), p.view()))
                .collect(),
        }
    }
}

/// The serialized room state broadcast to clients. Built from [`RoomState`]
/// by [`RoomState::view`]; the secret word has no field here, so it cannot
/// leak through the synchronized channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomStateView {
    pub phase: RoomPhase,
    pub current_round: u32,
    pub winner: Option<String>,
    pub round_start_time: Option<u64>,
    pub round_end_time: Option<u64>,
    pub language: String,
    pub players: HashMap<String, PlayerView>,
}
