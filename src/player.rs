//! The surface this crate needs from a video player.

use crate::config::TrackConfig;
use crate::cue::Cue;

/// Handle for one time-update subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A native caption track, seeded once when the player becomes ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub label: String,
    pub language: String,
    pub showing: bool,
    pub cues: Vec<Cue>,
}

impl CaptionTrack {
    pub fn new(config: &TrackConfig, cues: Vec<Cue>) -> Self {
        CaptionTrack {
            label: config.label.clone(),
            language: config.language.clone(),
            showing: config.showing,
            cues,
        }
    }
}

pub trait Player {
    /// Playback position in seconds.
    fn current_time(&self) -> f64;

    fn add_caption_track(&mut self, track: CaptionTrack);

    fn subscribe_time_updates(&mut self) -> ListenerId;

    fn unsubscribe_time_updates(&mut self, listener: ListenerId);
}

/// A player driven by hand: the clock only moves when told to.
#[derive(Debug, Default)]
pub struct SimulatedPlayer {
    time: f64,
    playing: bool,
    next_listener: u64,
    listeners: Vec<ListenerId>,
    tracks: Vec<CaptionTrack>,
}

impl SimulatedPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Jumps the clock. Listeners are only notified if playing.
    pub fn seek(&mut self, secs: f64) -> Vec<ListenerId> {
        self.time = secs;
        self.notifications()
    }

    /// Moves the clock forward while playing and returns the listeners to
    /// notify. A paused player neither moves nor notifies.
    pub fn advance(&mut self, secs: f64) -> Vec<ListenerId> {
        if self.playing {
            self.time += secs;
        }
        self.notifications()
    }

    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    pub fn tracks(&self) -> &[CaptionTrack] {
        &self.tracks
    }

    fn notifications(&self) -> Vec<ListenerId> {
        if self.playing {
            self.listeners.clone()
        } else {
            Vec::new()
        }
    }
}

impl Player for SimulatedPlayer {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn add_caption_track(&mut self, track: CaptionTrack) {
        self.tracks.push(track);
    }

    fn subscribe_time_updates(&mut self) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push(id);
        id
    }

    fn unsubscribe_time_updates(&mut self, listener: ListenerId) {
        self.listeners.retain(|l| *l != listener);
    }
}
