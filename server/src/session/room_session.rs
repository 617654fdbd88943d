use comms::{command::UserCommand, event::Event};
use tokio::sync::mpsc;
use tracing::debug;

use crate::room_manager::{ClientHandle, RoomCode, RoomManager};

/// [RoomSession] bridges the commands of one connection to the room it joined
pub(super) struct RoomSession {
    handle: ClientHandle,
    outbound_rx: mpsc::Receiver<Event>,
}

impl RoomSession {
    pub fn new(handle: ClientHandle, outbound_rx: mpsc::Receiver<Event>) -> Self {
        RoomSession {
            handle,
            outbound_rx,
        }
    }

    pub fn room_code(&self) -> &RoomCode {
        self.handle.room().code()
    }

    /// Apply a user command to the room. The room broadcasts the outcome to every client.
    pub async fn handle_user_command(&self, cmd: UserCommand) {
        let room = self.handle.room();

        match cmd {
            UserCommand::QueueAdd(cmd) => {
                if !cmd.track_id.is_empty() {
                    room.add_to_queue(&cmd.track_id).await;
                }
            }
            UserCommand::QueueRemove(cmd) => {
                if !cmd.track_id.is_empty() {
                    room.remove_from_queue(&cmd.track_id).await;
                }
            }
            UserCommand::Play(cmd) => {
                room.play(cmd.track_id.as_deref()).await;
            }
            UserCommand::Pause => {
                room.pause().await;
            }
            UserCommand::Next => {
                room.next_track().await;
            }
            UserCommand::Prev => {
                room.previous_track().await;
            }
            UserCommand::Unrecognized(kind) => {
                debug!(room = %room.code(), kind = %kind, "ignoring unrecognized command");
            }
        }
    }

    /// Receive the next event broadcast in the room.
    /// Returns `None` once the room has dropped this client.
    pub async fn recv(&mut self) -> Option<Event> {
        self.outbound_rx.recv().await
    }

    /// Unregister from the room, destroying it if this was the last client
    pub async fn leave(self, room_manager: &RoomManager) {
        room_manager.drop_client_handle(self.handle).await;
    }
}
