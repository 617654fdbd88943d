use serde::{Deserialize, Serialize};

use crate::envelope::{Envelope, EnvelopeError};

/// Acknowledges a connection joining a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedEvent {
    /// Number of clients connected to the room, including the new one
    pub users: usize,
}

/// The authoritative queue of a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEvent {
    pub queue: Vec<String>,
}

/// A track was added to or removed from the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEvent {
    pub track_id: String,
}

/// Playback was started on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    /// The resolved current track, empty when nothing could be played
    pub current_track: String,
}

/// The authoritative playback state of a room
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackEvent {
    pub is_playing: bool,
    /// Empty when the room has no current track
    pub current_track: String,
}

/// Events that can be sent to the client.
/// Lightweight events (`queue_add`, `play`, `next`, ...) announce what happened,
/// `queue` and `playback` carry the state clients should converge to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Envelope", into = "Envelope")]
pub enum Event {
    Joined(JoinedEvent),
    Queue(QueueEvent),
    QueueAdd(TrackEvent),
    QueueRemove(TrackEvent),
    Play(PlayEvent),
    Pause,
    Next,
    Prev,
    Playback(PlaybackEvent),
}

impl From<Event> for Envelope {
    fn from(event: Event) -> Self {
        match event {
            Event::Joined(e) => Envelope::with_payload("joined", &e),
            Event::Queue(e) => Envelope::with_payload("queue", &e),
            Event::QueueAdd(e) => Envelope::with_payload("queue_add", &e),
            Event::QueueRemove(e) => Envelope::with_payload("queue_remove", &e),
            Event::Play(e) => Envelope::with_payload("play", &e),
            Event::Pause => Envelope::bare("pause"),
            Event::Next => Envelope::bare("next"),
            Event::Prev => Envelope::bare("prev"),
            Event::Playback(e) => Envelope::with_payload("playback", &e),
        }
    }
}

impl TryFrom<Envelope> for Event {
    type Error = EnvelopeError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        // events always carry their payload, unlike commands
        if envelope.payload.is_none() && !matches!(envelope.kind.as_str(), "pause" | "next" | "prev")
        {
            return Err(EnvelopeError::MissingPayload {
                kind: envelope.kind,
            });
        }

        let event = match envelope.kind.as_str() {
            "joined" => Event::Joined(envelope.payload_as()?),
            "queue" => Event::Queue(envelope.payload_as()?),
            "queue_add" => Event::QueueAdd(envelope.payload_as()?),
            "queue_remove" => Event::QueueRemove(envelope.payload_as()?),
            "play" => Event::Play(envelope.payload_as()?),
            "pause" => Event::Pause,
            "next" => Event::Next,
            "prev" => Event::Prev,
            "playback" => Event::Playback(envelope.payload_as()?),
            _ => return Err(EnvelopeError::UnknownType(envelope.kind)),
        };

        Ok(event)
    }
}
