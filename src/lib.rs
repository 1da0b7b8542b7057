//! Time-coded captions for video: a strict `HH:MM:SS,mmm` timestamp codec,
//! an authoring store, resolution of the active cue at a playback instant,
//! and a bridge that turns a player's clock into caption updates.

pub mod bridge;
pub mod config;
pub mod cue;
pub mod error;
pub mod library;
pub mod parser;
pub mod player;
pub mod repository;
pub mod resolver;
pub mod serialiser;
pub mod session;
pub mod store;
pub mod wire;

pub use bridge::{CaptionUpdate, PlaybackBridge};
pub use config::{Config, TrackConfig};
pub use cue::{Cue, CueDraft, CueEdit, DraftField, Timestamp};
pub use error::{CaptionError, FetchError, PublishError};
pub use library::{LibraryCommand, LibraryState, Video, VideoLibrary};
pub use parser::parse_timestamp;
pub use player::{CaptionTrack, ListenerId, Player, SimulatedPlayer};
pub use repository::{CueRepository, JsonFileRepository, VideoId};
pub use resolver::{resolve, resolve_index};
pub use serialiser::format_timestamp;
pub use session::{EditSession, PublishTicket};
pub use store::{CueCommand, CueStore};
