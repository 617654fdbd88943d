use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    room::{ClientHandle, MusicRoom},
    room_code::{RoomCode, RoomCodeGenerator},
};
use crate::error::RoomError;

#[derive(Debug)]
struct Registry {
    rooms: HashMap<RoomCode, Arc<MusicRoom>>,
    code_generator: RoomCodeGenerator,
}

/// [RoomManager] maps room codes to the active rooms and decides when rooms are created and destroyed.
///
/// The registry lock is always taken before a room lock, never the other way around.
#[derive(Debug)]
pub struct RoomManager {
    registry: Mutex<Registry>,
}

impl RoomManager {
    pub(super) fn new(code_generator: RoomCodeGenerator) -> RoomManager {
        RoomManager {
            registry: Mutex::new(Registry {
                rooms: HashMap::new(),
                code_generator,
            }),
        }
    }

    /// Create an empty room under a code no active room uses
    pub async fn create_room(&self) -> Arc<MusicRoom> {
        let mut registry = self.registry.lock().await;

        let code = loop {
            let code = registry.code_generator.generate();
            if !registry.rooms.contains_key(&code) {
                break code;
            }
            debug!(room = %code, "room code collision, retrying");
        };

        let room = Arc::new(MusicRoom::new(code.clone()));
        registry.rooms.insert(code, Arc::clone(&room));
        info!(room = %room.code(), rooms = registry.rooms.len(), "room created");

        room
    }

    /// Look up an active room. Does not register anything in the room.
    pub async fn join_room(&self, code: &str) -> Result<Arc<MusicRoom>, RoomError> {
        self.registry
            .lock()
            .await
            .rooms
            .get(&RoomCode::from(code))
            .cloned()
            .ok_or_else(|| RoomError::NotFound(String::from(code)))
    }

    /// Destroy the room if nobody is connected to it anymore.
    /// Leaving an unknown room is a no-op.
    pub async fn leave_room(&self, code: &RoomCode) {
        let mut registry = self.registry.lock().await;

        let Some(room) = registry.rooms.get(code) else {
            return;
        };

        if room.close_if_empty().await {
            registry.rooms.remove(code);
            info!(room = %code, rooms = registry.rooms.len(), "room destroyed");
        }
    }

    /// Unregister the connection behind `handle` and destroy its room if it was the last one
    pub async fn drop_client_handle(&self, handle: ClientHandle) {
        let remaining = handle.room().remove_client(handle.client_id()).await;

        if remaining == 0 {
            self.leave_room(handle.room().code()).await;
        }
    }

    /// Destroy rooms that nobody joined within `max_age` of their creation.
    /// Returns how many rooms were removed.
    pub async fn reap_abandoned(&self, max_age: Duration) -> usize {
        // an age beyond chrono's range can never be reached
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return 0;
        };
        let now = Utc::now();
        let mut registry = self.registry.lock().await;

        let mut abandoned = Vec::new();
        for (code, room) in &registry.rooms {
            if now - room.created_at() >= max_age && room.close_if_empty().await {
                abandoned.push(code.clone());
            }
        }

        for code in &abandoned {
            registry.rooms.remove(code);
            info!(room = %code, "abandoned room reaped");
        }

        abandoned.len()
    }

    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.rooms.len()
    }
}
