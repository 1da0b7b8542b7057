use thiserror::Error;

use crate::cue::Timestamp;

/// Problems with cue content or store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptionError {
    #[error("malformed timestamp '{0}', expected HH:MM:SS,mmm")]
    MalformedTimestamp(String),

    #[error("cue must start before it ends (start {start}, end {end})")]
    InvalidInterval { start: Timestamp, end: Timestamp },

    #[error("cue index {index} is out of range (store holds {len} cues)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A failed attempt to hand the cue list to persistent storage.
///
/// Local state is left untouched whenever one of these is returned.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("cue {index} cannot be published")]
    Invalid {
        index: usize,
        #[source]
        source: CaptionError,
    },

    #[error("invalid video id '{0}'")]
    InvalidVideoId(String),

    #[error("storage rejected the cue list: {0}")]
    Rejected(String),

    #[error("I/O error while publishing")]
    Io(#[from] std::io::Error),

    #[error("could not encode the cue list")]
    Serialization(#[from] serde_json::Error),
}

/// A failed attempt to load persisted data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("persisted cue {index} is malformed")]
    Malformed {
        index: usize,
        #[source]
        source: CaptionError,
    },

    #[error("invalid video id '{0}'")]
    InvalidVideoId(String),

    #[error("I/O error while fetching")]
    Io(#[from] std::io::Error),

    #[error("could not decode persisted data")]
    Serialization(#[from] serde_json::Error),
}
