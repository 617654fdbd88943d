pub use self::room::{
    BroadcastHub, ClientHandle, ClientId, MusicRoom, OutboundSender, PlaybackQueue,
    PlaybackSnapshot, PlaybackState, RoomWelcome, TrackId,
};
pub use self::room_code::{RoomCode, RoomCodeGenerator, ROOM_CODE_ALPHABET, ROOM_CODE_LENGTH};
pub use self::room_manager::RoomManager;

mod room;
mod room_code;
#[allow(clippy::module_inception)]
mod room_manager;

#[derive(Debug)]
pub struct RoomManagerBuilder {
    code_generator: Option<RoomCodeGenerator>,
}

impl Default for RoomManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomManagerBuilder {
    pub fn new() -> Self {
        RoomManagerBuilder {
            code_generator: None,
        }
    }

    /// Use the given generator for room codes instead of an entropy seeded one
    pub fn code_generator(mut self, code_generator: RoomCodeGenerator) -> Self {
        self.code_generator = Some(code_generator);

        self
    }

    pub fn build(self) -> RoomManager {
        RoomManager::new(
            self.code_generator
                .unwrap_or_else(RoomCodeGenerator::from_entropy),
        )
    }
}
