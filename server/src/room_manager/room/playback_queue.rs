use comms::event::PlaybackEvent;

/// Opaque reference into the external track catalog
pub type TrackId = String;

/// Playback state of a room as observed by its clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No current track
    Stopped,
    /// A current track is set but not playing
    Paused,
    Playing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub current_track: Option<TrackId>,
}

impl PlaybackSnapshot {
    pub fn state(&self) -> PlaybackState {
        match (&self.current_track, self.is_playing) {
            (None, _) => PlaybackState::Stopped,
            (Some(_), false) => PlaybackState::Paused,
            (Some(_), true) => PlaybackState::Playing,
        }
    }
}

impl From<PlaybackSnapshot> for PlaybackEvent {
    fn from(snapshot: PlaybackSnapshot) -> Self {
        PlaybackEvent {
            is_playing: snapshot.is_playing,
            current_track: snapshot.current_track.unwrap_or_default(),
        }
    }
}

/// [PlaybackQueue] is the shared queue of a room together with its transport state.
///
/// The queue permits duplicates and keeps insertion order. `current_track` may
/// point at a track that has since been removed from the queue; navigation
/// falls back to the queue head in that case. `is_playing` is never true
/// without a current track.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    queue: Vec<TrackId>,
    current_track: Option<TrackId>,
    is_playing: bool,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the queue
    pub fn queue(&self) -> Vec<TrackId> {
        self.queue.clone()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            is_playing: self.is_playing,
            current_track: self.current_track.clone(),
        }
    }

    /// Append a track, duplicates included, and return the new queue
    pub fn add(&mut self, track_id: &str) -> Vec<TrackId> {
        self.queue.push(String::from(track_id));
        self.queue()
    }

    /// Remove every occurrence of `track_id` and return the new queue.
    /// An empty id leaves the queue untouched.
    pub fn remove_all(&mut self, track_id: &str) -> Vec<TrackId> {
        if !track_id.is_empty() {
            self.queue.retain(|id| id != track_id);
        }

        self.queue()
    }

    /// Start playback.
    ///
    /// A given track becomes current even if it is not queued. Without one the
    /// current track is kept, or taken from the queue head when there is none.
    /// With nothing to play the room stops.
    pub fn play(&mut self, track_id: Option<&str>) -> PlaybackSnapshot {
        match track_id.filter(|id| !id.is_empty()) {
            Some(id) => self.current_track = Some(String::from(id)),
            None => {
                if self.current_track.is_none() {
                    self.current_track = self.queue.first().cloned();
                }
            }
        }

        self.is_playing = self.current_track.is_some();
        self.snapshot()
    }

    pub fn pause(&mut self) -> PlaybackSnapshot {
        self.is_playing = false;
        self.snapshot()
    }

    /// Move to the entry after the current track, staying on the last entry
    pub fn next_track(&mut self) -> PlaybackSnapshot {
        self.step(|position, last| (position + 1).min(last))
    }

    /// Move to the entry before the current track, staying on the first entry
    pub fn previous_track(&mut self) -> PlaybackSnapshot {
        self.step(|position, _| position.saturating_sub(1))
    }

    fn step(&mut self, advance: impl FnOnce(usize, usize) -> usize) -> PlaybackSnapshot {
        if self.queue.is_empty() {
            self.current_track = None;
            self.is_playing = false;
            return self.snapshot();
        }

        // first occurrence wins when the current track is queued more than once
        let index = self
            .current_track
            .as_ref()
            .and_then(|current| self.queue.iter().position(|id| id == current))
            .map_or(0, |position| advance(position, self.queue.len() - 1));

        self.current_track = Some(self.queue[index].clone());
        self.is_playing = true;
        self.snapshot()
    }
}
