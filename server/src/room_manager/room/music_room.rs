use std::sync::Arc;

use chrono::{DateTime, Utc};
use comms::event::{self, Event};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    broadcast_hub::{BroadcastHub, ClientId, OutboundSender},
    client_handle::ClientHandle,
    playback_queue::{PlaybackQueue, PlaybackSnapshot, TrackId},
};
use crate::{error::RoomError, room_manager::RoomCode};

/// What a connection learns about the room at the moment it registers
#[derive(Debug, Clone, PartialEq)]
pub struct RoomWelcome {
    pub queue: Vec<TrackId>,
    /// Client count including the new connection
    pub users: usize,
}

#[derive(Debug)]
struct RoomState {
    hub: BroadcastHub,
    playback: PlaybackQueue,
    /// Set once the room is removed from the registry, no client may register afterwards
    closed: bool,
}

#[derive(Debug)]
/// [MusicRoom] holds the connected clients, the shared queue and the playback state of one room.
///
/// Every operation takes the room lock once: a mutation and the broadcast of its
/// result happen atomically, so clients observe changes in the order they were made.
pub struct MusicRoom {
    code: RoomCode,
    created_at: DateTime<Utc>,
    state: Mutex<RoomState>,
}

impl MusicRoom {
    pub fn new(code: RoomCode) -> Self {
        MusicRoom {
            code,
            created_at: Utc::now(),
            state: Mutex::new(RoomState {
                hub: BroadcastHub::new(),
                playback: PlaybackQueue::new(),
                closed: false,
            }),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Register a connection whose events are delivered through `sender`
    ///
    /// # Returns
    ///
    /// - A [ClientHandle] for the connection to act on the room and to leave it later
    /// - A [RoomWelcome] with the queue and client count taken atomically with the registration
    pub async fn add_client(
        self: &Arc<Self>,
        sender: OutboundSender,
    ) -> Result<(ClientHandle, RoomWelcome), RoomError> {
        let mut state = self.state.lock().await;

        if state.closed {
            return Err(RoomError::NotFound(self.code.to_string()));
        }

        let client_id = ClientId::generate();
        state.hub.insert(client_id.clone(), sender);

        let welcome = RoomWelcome {
            queue: state.playback.queue(),
            users: state.hub.len(),
        };
        info!(room = %self.code, client = client_id.as_str(), users = welcome.users, "client joined");

        Ok((ClientHandle::new(Arc::clone(self), client_id), welcome))
    }

    /// Unregister a connection and return how many remain
    pub async fn remove_client(&self, client_id: &ClientId) -> usize {
        let mut state = self.state.lock().await;

        state.hub.remove(client_id);
        info!(room = %self.code, client = client_id.as_str(), users = state.hub.len(), "client left");

        state.hub.len()
    }

    pub async fn user_count(&self) -> usize {
        self.state.lock().await.hub.len()
    }

    /// Close the room if it has no clients. Returns whether the room is closed.
    pub(in crate::room_manager) async fn close_if_empty(&self) -> bool {
        let mut state = self.state.lock().await;

        if state.hub.is_empty() {
            state.closed = true;
        }

        state.closed
    }

    pub async fn broadcast(&self, exclude: Option<&ClientId>, event: Event) -> usize {
        self.state.lock().await.hub.broadcast(exclude, &event)
    }

    /// Append a track, announce it and publish the new queue
    pub async fn add_to_queue(&self, track_id: &str) -> Vec<TrackId> {
        let mut state = self.state.lock().await;
        let queue = state.playback.add(track_id);
        debug!(room = %self.code, track = track_id, "track queued");

        publish_queue_change(
            &mut state.hub,
            Event::QueueAdd(event::TrackEvent {
                track_id: String::from(track_id),
            }),
            &queue,
        );

        queue
    }

    /// Remove every occurrence of a track, announce it and publish the new queue
    pub async fn remove_from_queue(&self, track_id: &str) -> Vec<TrackId> {
        let mut state = self.state.lock().await;
        let queue = state.playback.remove_all(track_id);
        debug!(room = %self.code, track = track_id, "track removed");

        publish_queue_change(
            &mut state.hub,
            Event::QueueRemove(event::TrackEvent {
                track_id: String::from(track_id),
            }),
            &queue,
        );

        queue
    }

    pub async fn play(&self, track_id: Option<&str>) -> PlaybackSnapshot {
        let mut state = self.state.lock().await;
        let snapshot = state.playback.play(track_id);

        let announcement = Event::Play(event::PlayEvent {
            current_track: snapshot.current_track.clone().unwrap_or_default(),
        });
        self.publish_playback(&mut state.hub, announcement, &snapshot);

        snapshot
    }

    pub async fn pause(&self) -> PlaybackSnapshot {
        let mut state = self.state.lock().await;
        let snapshot = state.playback.pause();
        self.publish_playback(&mut state.hub, Event::Pause, &snapshot);

        snapshot
    }

    pub async fn next_track(&self) -> PlaybackSnapshot {
        let mut state = self.state.lock().await;
        let snapshot = state.playback.next_track();
        self.publish_playback(&mut state.hub, Event::Next, &snapshot);

        snapshot
    }

    pub async fn previous_track(&self) -> PlaybackSnapshot {
        let mut state = self.state.lock().await;
        let snapshot = state.playback.previous_track();
        self.publish_playback(&mut state.hub, Event::Prev, &snapshot);

        snapshot
    }

    fn publish_playback(&self, hub: &mut BroadcastHub, announcement: Event, snapshot: &PlaybackSnapshot) {
        debug!(
            room = %self.code,
            state = ?snapshot.state(),
            track = snapshot.current_track.as_deref().unwrap_or(""),
            "playback changed"
        );

        hub.broadcast(None, &announcement);
        hub.broadcast(None, &Event::Playback(snapshot.clone().into()));
    }
}

// every client, the sender included, gets the announcement followed by the authoritative queue
fn publish_queue_change(hub: &mut BroadcastHub, announcement: Event, queue: &[TrackId]) {
    hub.broadcast(None, &announcement);
    hub.broadcast(
        None,
        &Event::Queue(event::QueueEvent {
            queue: queue.to_vec(),
        }),
    );
}
