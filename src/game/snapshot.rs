use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::game::evaluator::TileState;
use crate::game::player::{GameStatus, GuessHistory, Player, GRID_CELLS};

/// Player state captured at disconnect, keyed by persistent id so a later
/// connection from the same identity can pick the round back up.
pub struct PlayerSnapshot {
    pub persistent_id: String,
    pub name: String,
    pub round_number: u32,
    pub current_row: usize,
    pub status: GameStatus,
    pub ready: bool,
    pub completion_time: Option<u64>,
    pub total_score: u32,
    pub progress: [TileState; GRID_CELLS],
    pub guesses: GuessHistory,
    pub disconnected_at: Instant,
}

impl PlayerSnapshot {
    pub fn capture(player: &Player, persistent_id: &str, round_number: u32) -> Self {
        Self {
            persistent_id: persistent_id.to_string(),
            name: player.name.clone(),
            round_number,
            current_row: player.current_row,
            status: player.status,
            ready: player.ready,
            completion_time: player.completion_time,
            total_score: player.total_score,
            progress: player.progress,
            guesses: player.guesses.clone(),
            disconnected_at: Instant::now(),
        }
    }

    /// Repopulate a freshly created player from this snapshot.
    pub fn restore(self, player: &mut Player) {
        player.name = self.name;
        player.current_row = self.current_row;
        player.status = self.status;
        player.ready = self.ready;
        player.completion_time = self.completion_time;
        player.total_score = self.total_score;
        player.progress = self.progress;
        player.guesses = self.guesses;
    }
}

/// In-memory cache of disconnect snapshots with bounded retention.
pub struct SnapshotStore {
    snapshots: HashMap<String, PlayerSnapshot>, // persistent_id -> snapshot
    retention: Duration,
}

impl SnapshotStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            snapshots: HashMap::new(),
            retention,
        }
    }

    pub fn store(&mut self, snapshot: PlayerSnapshot) {
        self.snapshots
            .insert(snapshot.persistent_id.clone(), snapshot);
    }

    /// Remove and return the snapshot if it belongs to the given round.
    /// Snapshots from other rounds stay put until swept; only their score
    /// is worth carrying forward.
    pub fn take_restorable(&mut self, persistent_id: &str, round: u32) -> Option<PlayerSnapshot> {
        if self.snapshots.get(persistent_id)?.round_number != round {
            return None;
        }
        self.snapshots.remove(persistent_id)
    }

    /// Cumulative score held by a stale snapshot for this identity.
    pub fn carried_score(&self, persistent_id: &str) -> Option<u32> {
        self.snapshots.get(persistent_id).map(|s| s.total_score)
    }

    /// Drop snapshots older than the retention window. Returns how many
    /// were removed.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let before = self.snapshots.len();
        let retention = self.retention;
        self.snapshots
            .retain(|_, snap| now.duration_since(snap.disconnected_at) < retention);
        before - self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
