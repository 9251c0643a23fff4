use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::{info, warn};

use crate::game::room::{spawn_room, RoomConfig, RoomHandle, RoomSummary};
use crate::game::room_code::generate_unique_room_code;
use crate::words::WordProvider;

/// Live rooms keyed by their join code. Rooms remove themselves from the
/// registry when their task stops.
pub struct RoomRegistry {
    rooms: DashMap<String, RoomHandle>,
    words: Arc<dyn WordProvider>,
    config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(words: Arc<dyn WordProvider>, config: RoomConfig) -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            words,
            config,
        })
    }

    /// Create a room for the given language and return its handle. Falls back
    /// to the default language when the requested one has no dictionary.
    pub fn create_room(self: &Arc<Self>, language: &str) -> RoomHandle {
        let language = if self.words.is_supported(language) {
            language.to_string()
        } else {
            warn!(
                language,
                default = %self.config.default_language,
                "Unsupported language requested, using default"
            );
            self.config.default_language.clone()
        };

        let code = generate_unique_room_code(|code| self.rooms.contains_key(code));

        // The dispose callback must not keep the registry alive
        let registry: Weak<Self> = Arc::downgrade(self);
        let on_dispose = Arc::new(move |room_code: &str| {
            if let Some(registry) = registry.upgrade() {
                registry.rooms.remove(room_code);
                info!(room = room_code, "Room removed from registry");
            }
        });

        let handle = spawn_room(
            code.clone(),
            &language,
            Arc::clone(&self.words),
            self.config.clone(),
            on_dispose,
        );
        info!(room = %code, language, "Room created");
        self.rooms.insert(code, handle.clone());
        handle
    }

    pub fn get(&self, room_code: &str) -> Option<RoomHandle> {
        self.rooms.get(room_code).map(|entry| entry.value().clone())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Snapshot of every live room, for the lobby listing.
    pub async fn summaries(&self) -> Vec<RoomSummary> {
        let handles: Vec<RoomHandle> = self
            .rooms
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Some(summary) = handle.summary().await {
                summaries.push(summary);
            }
        }
        summaries
    }
}
