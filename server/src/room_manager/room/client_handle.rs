use std::sync::Arc;

use super::{broadcast_hub::ClientId, music_room::MusicRoom};

#[derive(Debug)]
/// [ClientHandle] ties one connection to the room it registered in.
///
/// It is created when a connection joins a room and is handed back to the
/// [crate::room_manager::RoomManager] when the connection goes away.
pub struct ClientHandle {
    /// The room this connection is registered in
    room: Arc<MusicRoom>,
    /// Identity of the connection inside the room
    client_id: ClientId,
}

impl ClientHandle {
    pub(super) fn new(room: Arc<MusicRoom>, client_id: ClientId) -> Self {
        ClientHandle { room, client_id }
    }

    pub fn room(&self) -> &Arc<MusicRoom> {
        &self.room
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }
}
