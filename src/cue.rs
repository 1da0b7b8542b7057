use std::fmt;
use std::time::Duration;

use crate::error::CaptionError;

/// An offset from the start of the media.
///
/// Cue boundaries carry millisecond resolution. Clock readings may be finer,
/// which is why the value is kept as a [`Duration`] rather than rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    pub const fn from_millis(millis: u64) -> Self {
        Timestamp(Duration::from_millis(millis))
    }

    /// Converts a clock reading in seconds. Negative, NaN and infinite
    /// readings map to `None`.
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        Duration::try_from_secs_f64(secs).ok().map(Timestamp)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Whole milliseconds; anything finer is truncated.
    pub fn as_millis(self) -> u128 {
        self.0.as_millis()
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl From<Duration> for Timestamp {
    fn from(duration: Duration) -> Self {
        Timestamp(duration)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::serialiser::format_timestamp(*self))
    }
}

/// A single time-coded caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub(crate) start: Timestamp,
    pub(crate) end: Timestamp,
    pub(crate) text: String,
}

impl Cue {
    /// Builds a cue, rejecting intervals where `start` is not strictly before `end`.
    pub fn new(
        start: Timestamp,
        end: Timestamp,
        text: impl Into<String>,
    ) -> Result<Self, CaptionError> {
        if start >= end {
            return Err(CaptionError::InvalidInterval { start, end });
        }
        Ok(Cue {
            start,
            end,
            text: text.into(),
        })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, now: Timestamp) -> bool {
        self.start <= now && now <= self.end
    }

    /// Empty cues may be stored and published but are never shown.
    pub fn is_displayable(&self) -> bool {
        !self.text.is_empty()
    }

    /// In-place edits can leave a cue inverted; this re-checks the invariant.
    pub fn validate(&self) -> Result<(), CaptionError> {
        if self.start >= self.end {
            return Err(CaptionError::InvalidInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// One field of a stored cue, replaced as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueEdit {
    Start(Timestamp),
    End(Timestamp),
    Text(String),
}

impl CueEdit {
    pub(crate) fn apply_to(self, cue: &mut Cue) {
        match self {
            CueEdit::Start(start) => cue.start = start,
            CueEdit::End(end) => cue.end = end,
            CueEdit::Text(text) => cue.text = text,
        }
    }
}

/// Which field of a [`CueDraft`] to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Start,
    End,
    Text,
}

/// The cue being composed, as typed by the user.
///
/// Timestamps stay raw until the draft is committed, so a rejected commit
/// leaves the user's input exactly as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueDraft {
    pub start: String,
    pub end: String,
    pub text: String,
}

impl CueDraft {
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Start => self.start = value,
            DraftField::End => self.end = value,
            DraftField::Text => self.text = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_empty() && self.end.is_empty() && self.text.is_empty()
    }

    /// Parses both timestamps and checks the interval.
    pub fn to_cue(&self) -> Result<Cue, CaptionError> {
        let start = crate::parser::parse_timestamp(&self.start)?;
        let end = crate::parser::parse_timestamp(&self.end)?;
        Cue::new(start, end, self.text.clone())
    }
}
