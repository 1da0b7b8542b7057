//! Connects a player's clock to cue resolution and caption display.

use crate::config::TrackConfig;
use crate::cue::{Cue, Timestamp};
use crate::player::{CaptionTrack, ListenerId, Player};
use crate::resolver::resolve_index;
use crate::store::CueStore;

use log::{debug, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// The caption to show from now on. An empty `text` clears the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionUpdate {
    pub text: String,
    /// Store position of the cue now shown, if any.
    pub index: Option<usize>,
}

/// Owns a player and turns its time updates into [`CaptionUpdate`]s.
///
/// Resolution reads the store on every tick, so edits made between ticks
/// are visible immediately. The native caption track, however, is only
/// seeded once in [`on_ready`](Self::on_ready); cues added later reach the
/// derived display but not the player's own track.
pub struct PlaybackBridge<P: Player> {
    player: P,
    track: TrackConfig,
    listener: Option<ListenerId>,
    seeded: bool,
    displayed: Option<(usize, Cue)>,
    updates: UnboundedSender<CaptionUpdate>,
}

impl<P: Player> PlaybackBridge<P> {
    pub fn new(player: P, track: TrackConfig) -> (Self, UnboundedReceiver<CaptionUpdate>) {
        let (updates, rx) = unbounded_channel();
        let bridge = PlaybackBridge {
            player,
            track,
            listener: None,
            seeded: false,
            displayed: None,
            updates,
        };
        (bridge, rx)
    }

    /// Registers the caption track with the cues present right now and
    /// starts listening for time updates. Each player gets its track once;
    /// a ready event after [`detach`](Self::detach) only resubscribes.
    pub fn on_ready(&mut self, store: &CueStore) {
        if self.listener.is_some() {
            debug!("player reported ready twice; keeping existing subscription");
            return;
        }
        if !self.seeded {
            let track = CaptionTrack::new(&self.track, store.snapshot().to_vec());
            debug!("seeding caption track with {} cues", track.cues.len());
            self.player.add_caption_track(track);
            self.seeded = true;
        }
        self.listener = Some(self.player.subscribe_time_updates());
    }

    pub fn on_time_update(&mut self, listener: ListenerId, store: &CueStore) {
        if self.listener != Some(listener) {
            debug!("ignoring time update for stale listener {:?}", listener);
            return;
        }
        let now = self.clock();
        let active = resolve_index(store.snapshot(), now)
            .and_then(|index| store.get(index).map(|cue| (index, cue)));

        let unchanged = match (&self.displayed, active) {
            (Some((shown, shown_cue)), Some((index, cue))) => {
                *shown == index && shown_cue == cue
            }
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        match active {
            Some((index, cue)) => {
                debug!("caption at {}: cue {}", now, index);
                self.displayed = Some((index, cue.clone()));
                self.emit(cue.text().to_string(), Some(index));
            }
            None => {
                debug!("caption at {}: none", now);
                self.displayed = None;
                self.emit(String::new(), None);
            }
        }
    }

    /// Stops listening to the player. Safe to call more than once; the
    /// player is only asked to unsubscribe the first time.
    pub fn detach(&mut self) {
        if let Some(listener) = self.listener.take() {
            debug!("unsubscribing {:?}", listener);
            self.player.unsubscribe_time_updates(listener);
        }
    }

    /// Tears down the current player and hands it back. The new player is
    /// attached on its own ready event.
    pub fn switch_player(&mut self, player: P) -> P {
        self.detach();
        if self.displayed.take().is_some() {
            self.emit(String::new(), None);
        }
        self.seeded = false;
        std::mem::replace(&mut self.player, player)
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    pub fn displayed_text(&self) -> &str {
        self.displayed.as_ref().map_or("", |(_, cue)| cue.text())
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    fn clock(&self) -> Timestamp {
        let secs = self.player.current_time();
        Timestamp::from_secs_f64(secs).unwrap_or_else(|| {
            warn!("player reported unusable clock value {}; treating as 0", secs);
            Timestamp::ZERO
        })
    }

    fn emit(&self, text: String, index: Option<usize>) {
        if self.updates.send(CaptionUpdate { text, index }).is_err() {
            debug!("caption receiver dropped; update discarded");
        }
    }
}

impl<P: Player> Drop for PlaybackBridge<P> {
    fn drop(&mut self) {
        self.detach();
    }
}
