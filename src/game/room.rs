use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::game::evaluator::{TileState, WORD_LENGTH};
use crate::game::messages::{ClientMessage, ServerMessage};
use crate::game::player::{GameStatus, Player, MAX_GUESSES};
use crate::game::snapshot::{PlayerSnapshot, SnapshotStore};
use crate::game::state::{now_ms, RoomPhase, RoomState};
use crate::words::{WordProvider, DEFAULT_LANGUAGE};

/// Last-resort secret when the provider has nothing, so round start never fails.
const FALLBACK_WORD: &str = "HELLO";

/// Tuning knobs shared by every room in a registry.
#[derive(Clone)]
pub struct RoomConfig {
    pub max_players: usize,
    pub snapshot_retention: Duration,
    pub sweep_interval: Duration,
    pub default_language: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 6,
            snapshot_retention: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Everything that can happen to a room. Commands are processed one at a
/// time by the room's task, in arrival order, so room state never sees
/// concurrent mutation.
pub enum RoomCommand {
    Join {
        session_id: String,
        player_name: String,
        persistent_id: Option<String>,
        tx: broadcast::Sender<ServerMessage>,
        reply: oneshot::Sender<JoinOutcome>,
    },
    Leave {
        session_id: String,
    },
    Message {
        session_id: String,
        message: ClientMessage,
    },
    Summary(oneshot::Sender<RoomSummary>),
}

#[derive(Debug, PartialEq)]
pub enum JoinOutcome {
    Joined { persistent_id: String },
    Rejected { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub room_code: String,
    pub players: usize,
    pub phase: RoomPhase,
    pub language: String,
}

/// Callback used by a room to deregister itself when it disposes.
pub trait DisposeRoom: Send + Sync + 'static {
    fn dispose(&self, room_code: &str);
}

impl<F> DisposeRoom for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn dispose(&self, room_code: &str) {
        self(room_code)
    }
}

/// Client-side handle to a running room task.
#[derive(Clone)]
pub struct RoomHandle {
    code: String,
    tx: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Fire-and-forget. Returns false if the room task has already stopped.
    pub fn send(&self, command: RoomCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub async fn summary(&self) -> Option<RoomSummary> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if !self.send(RoomCommand::Summary(reply_tx)) {
            return None;
        }
        reply_rx.await.ok()
    }
}

/// Spawn a room's processing task and return the handle to feed it.
pub fn spawn_room(
    code: String,
    language: &str,
    words: Arc<dyn WordProvider>,
    config: RoomConfig,
    on_dispose: Arc<dyn DisposeRoom>,
) -> RoomHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let room = Room::new(code.clone(), language, words, config);
    tokio::spawn(room.run(rx, on_dispose));
    RoomHandle { code, tx }
}

/// One game room: owns the authoritative state, the snapshot store, and the
/// outbound channel of every connected client.
struct Room {
    code: String,
    state: RoomState,
    snapshots: SnapshotStore,
    words: Arc<dyn WordProvider>,
    config: RoomConfig,
    sessions: HashMap<String, String>, // session_id -> persistent_id
    connections: HashMap<String, broadcast::Sender<ServerMessage>>,
    created_at: Instant,
    had_players: bool,
}

impl Room {
    fn new(code: String, language: &str, words: Arc<dyn WordProvider>, config: RoomConfig) -> Self {
        Self {
            code,
            state: RoomState::new(language),
            snapshots: SnapshotStore::new(config.snapshot_retention),
            words,
            config,
            sessions: HashMap::new(),
            connections: HashMap::new(),
            created_at: Instant::now(),
            had_players: false,
        }
    }

    async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<RoomCommand>,
        on_dispose: Arc<dyn DisposeRoom>,
    ) {
        let mut sweep = tokio::time::interval(self.config.sweep_interval);
        loop {
            tokio::select! {
                command = rx.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command);
                    if self.had_players && self.state.player_count() == 0 {
                        info!(room = %self.code, "Last player left, disposing room");
                        break;
                    }
                }
                _ = sweep.tick() => {
                    let removed = self.snapshots.sweep(Instant::now());
                    if removed > 0 {
                        debug!(room = %self.code, removed, "Swept expired snapshots");
                    }
                    if !self.had_players
                        && self.created_at.elapsed() >= self.config.snapshot_retention
                    {
                        info!(room = %self.code, "Room never joined, disposing");
                        break;
                    }
                }
            }
        }
        on_dispose.dispose(&self.code);
    }

    fn handle_command(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Join {
                session_id,
                player_name,
                persistent_id,
                tx,
                reply,
            } => self.handle_join(session_id, player_name, persistent_id, tx, reply),
            RoomCommand::Leave { session_id } => self.handle_leave(&session_id),
            RoomCommand::Message {
                session_id,
                message,
            } => self.handle_message(&session_id, message),
            RoomCommand::Summary(reply) => {
                let _ = reply.send(RoomSummary {
                    room_code: self.code.clone(),
                    players: self.state.player_count(),
                    phase: self.state.phase,
                    language: self.state.language.clone(),
                });
            }
        }
    }

    fn handle_join(
        &mut self,
        session_id: String,
        player_name: String,
        persistent_id: Option<String>,
        tx: broadcast::Sender<ServerMessage>,
        reply: oneshot::Sender<JoinOutcome>,
    ) {
        if self.state.player_count() >= self.config.max_players {
            let _ = reply.send(JoinOutcome::Rejected {
                reason: "room is full".to_string(),
            });
            return;
        }
        if self.state.contains_session(&session_id) {
            let _ = reply.send(JoinOutcome::Rejected {
                reason: "session already seated".to_string(),
            });
            return;
        }

        let persistent_id =
            persistent_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        // One seat per identity: a second connection presenting an active
        // persistent id is refused, never silently replaces the first.
        if self.sessions.values().any(|pid| *pid == persistent_id) {
            warn!(room = %self.code, persistent_id, "Duplicate identity join rejected");
            let _ = reply.send(JoinOutcome::Rejected {
                reason: "identity already connected".to_string(),
            });
            return;
        }

        let mut player = Player::new(&session_id, &player_name, self.state.current_round);

        if self.state.phase != RoomPhase::Finished
            && let Some(snapshot) = self
                .snapshots
                .take_restorable(&persistent_id, self.state.current_round)
        {
            info!(room = %self.code, persistent_id, "Restoring player from snapshot");
            snapshot.restore(&mut player);
        } else if let Some(score) = self.snapshots.carried_score(&persistent_id) {
            // Snapshot from an earlier round: only the score survives
            debug!(room = %self.code, persistent_id, score, "Carrying score from stale snapshot");
            player.total_score = score;
        }

        info!(room = %self.code, session_id, player_name, "Player joined");
        self.sessions.insert(session_id.clone(), persistent_id.clone());
        self.connections.insert(session_id.clone(), tx.clone());
        self.had_players = true;
        self.state.add_player(player);

        let _ = reply.send(JoinOutcome::Joined {
            persistent_id: persistent_id.clone(),
        });
        let _ = tx.send(ServerMessage::JoinedRoom { persistent_id });
        self.send_private_guesses(&session_id);
        self.broadcast_state();
    }

    fn handle_leave(&mut self, session_id: &str) {
        let Some(persistent_id) = self.sessions.remove(session_id) else {
            return;
        };
        self.connections.remove(session_id);
        let Some(player) = self.state.remove_player(session_id) else {
            return;
        };

        info!(room = %self.code, session_id, name = %player.name, "Player left");
        self.snapshots.store(PlayerSnapshot::capture(
            &player,
            &persistent_id,
            self.state.current_round,
        ));

        // A departing player must not keep the round open for the rest
        if self.state.phase == RoomPhase::Playing {
            self.check_round_end();
        }
        self.broadcast_state();
    }

    fn handle_message(&mut self, session_id: &str, message: ClientMessage) {
        match message {
            ClientMessage::Guess { guess } => self.handle_guess(session_id, &guess),
            ClientMessage::Ready { ready } => self.handle_ready(session_id, ready),
            ClientMessage::StartRound => self.handle_start_round(),
            ClientMessage::NextRound => self.handle_next_round(),
            ClientMessage::JoinRoom { .. } => {
                debug!(room = %self.code, session_id, "join_room from seated session, ignoring");
            }
        }
    }

    fn handle_guess(&mut self, session_id: &str, guess: &str) {
        let guess = guess.to_uppercase();

        // Stale, duplicate, or out-of-order client messages: drop silently
        {
            let Some(player) = self.state.player(session_id) else {
                return;
            };
            if player.status != GameStatus::Playing || self.state.phase != RoomPhase::Playing {
                return;
            }
            if guess.chars().count() != WORD_LENGTH || player.current_row >= MAX_GUESSES {
                return;
            }
        }

        if !self.words.is_valid_word(&guess, &self.state.language) {
            debug!(room = %self.code, session_id, guess, "Guess not in dictionary");
            let row = self
                .state
                .player(session_id)
                .map(|p| p.current_row)
                .unwrap_or(0);
            self.send_to(session_id, ServerMessage::InvalidWord { word: guess, row });
            return;
        }

        let verdicts = self.state.evaluate(&guess);
        let won = verdicts.iter().all(|t| *t == TileState::Correct);
        let round_start = self.state.round_start_time.unwrap_or(0);

        let mut won_now = false;
        let mut finished = false;
        {
            let Some(player) = self.state.player_mut(session_id) else {
                return;
            };
            let row = player.current_row;
            player.guesses.rows[row] = guess.clone();
            player.progress[row * WORD_LENGTH..(row + 1) * WORD_LENGTH]
                .copy_from_slice(&verdicts);

            if won {
                player.status = GameStatus::Won;
                player.completion_time = Some(now_ms().saturating_sub(round_start));
                player.ready = false;
                won_now = true;
                finished = true;
            } else if row == MAX_GUESSES - 1 {
                player.status = GameStatus::Lost;
                player.ready = false;
                finished = true;
                info!(room = %self.code, session_id, "Player out of guesses");
            } else {
                player.current_row += 1;
            }
        }

        if won_now {
            // Scored once, at the win instant; never recomputed later
            let score = self.state.calculate_score(session_id);
            if let Some(player) = self.state.player_mut(session_id) {
                player.total_score += score;
                info!(
                    room = %self.code,
                    session_id,
                    score,
                    total = player.total_score,
                    "Player solved the word"
                );
            }
        }

        self.send_private_guesses(session_id);
        if finished {
            self.check_round_end();
        }
        self.broadcast_state();
    }

    fn handle_ready(&mut self, session_id: &str, ready: bool) {
        {
            let Some(player) = self.state.player_mut(session_id) else {
                return;
            };
            player.ready = ready;
        }
        debug!(room = %self.code, session_id, ready, "Ready flag changed");

        if self.state.can_start_next_round() && self.state.all_ready() {
            self.start_next_round();
        } else {
            self.broadcast_state();
        }
    }

    fn handle_start_round(&mut self) {
        if self.state.phase != RoomPhase::Waiting {
            return;
        }
        self.start_next_round();
    }

    fn handle_next_round(&mut self) {
        if !self.state.can_start_next_round() || !self.state.all_ready() {
            return;
        }
        self.start_next_round();
    }

    fn start_next_round(&mut self) {
        let word = self.pick_secret_word();
        self.state.start_next_round(&word);
        info!(room = %self.code, round = self.state.current_round, "Round started");

        // Everyone gets a fresh (empty) private grid for the new round
        for session_id in self.state.session_ids() {
            self.send_private_guesses(&session_id);
        }
        self.broadcast_state();
    }

    /// Requested language, then the default language, then a literal word.
    fn pick_secret_word(&self) -> String {
        if let Some(word) = self.words.random_word(&self.state.language) {
            return word;
        }
        warn!(
            room = %self.code,
            language = %self.state.language,
            "No words for room language, falling back to default"
        );
        if let Some(word) = self.words.random_word(&self.config.default_language) {
            return word;
        }
        warn!(room = %self.code, "Word provider is empty, using built-in fallback word");
        FALLBACK_WORD.to_string()
    }

    fn check_round_end(&mut self) {
        if self.state.phase != RoomPhase::Playing {
            return;
        }
        if !self.state.round_should_end() {
            return;
        }
        self.state.finish_round();
        info!(room = %self.code, round = self.state.current_round, "Round finished");
    }

    fn send_to(&self, session_id: &str, message: ServerMessage) {
        if let Some(tx) = self.connections.get(session_id) {
            let _ = tx.send(message);
        }
    }

    fn send_private_guesses(&self, session_id: &str) {
        let Some(player) = self.state.player(session_id) else {
            return;
        };
        self.send_to(
            session_id,
            ServerMessage::PlayerGuesses {
                guesses: player.guesses.rows.to_vec(),
                round_number: player.guesses.round_number,
            },
        );
    }

    fn broadcast_state(&self) {
        let message = ServerMessage::RoomState {
            state: self.state.view(),
        };
        for tx in self.connections.values() {
            let _ = tx.send(message.clone());
        }
    }
}
