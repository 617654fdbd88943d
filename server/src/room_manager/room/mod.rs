mod broadcast_hub;
mod client_handle;
mod music_room;
mod playback_queue;

pub use self::broadcast_hub::{BroadcastHub, ClientId, OutboundSender};
pub use self::client_handle::ClientHandle;
pub use self::music_room::{MusicRoom, RoomWelcome};
pub use self::playback_queue::{PlaybackQueue, PlaybackSnapshot, PlaybackState, TrackId};
