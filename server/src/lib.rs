//! Room server: clients join a short lived room by code, share a track queue
//! and control playback together over a WebSocket.

use std::{num::NonZeroUsize, sync::Arc};

use tokio::sync::broadcast;

pub mod api;
pub mod config;
pub mod error;
pub mod room_manager;
pub mod session;

pub use api::build_router;

use room_manager::RoomManager;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub room_manager: Arc<RoomManager>,
    /// Capacity of each connection's outbound event queue
    pub outbound_capacity: NonZeroUsize,
    /// Fired once when the server shuts down, every open session subscribes to it
    pub quit_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(room_manager: Arc<RoomManager>, outbound_capacity: NonZeroUsize) -> Self {
        let (quit_tx, _) = broadcast::channel(1);

        AppState {
            room_manager,
            outbound_capacity,
            quit_tx,
        }
    }
}
