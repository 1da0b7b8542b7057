use crate::cue::{Cue, Timestamp};
use crate::error::PublishError;
use crate::wire::{SubtitlesDocument, WireCue};

/// Formats a timestamp as `HH:MM:SS,mmm`. Sub-millisecond precision is
/// truncated, never rounded.
pub fn format_timestamp(timestamp: Timestamp) -> String {
    let duration = timestamp.as_duration();
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = duration.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Validates every cue and encodes the list for storage.
pub fn encode_cues(cues: &[Cue]) -> Result<SubtitlesDocument, PublishError> {
    let subtitles = cues
        .iter()
        .enumerate()
        .map(|(index, cue)| {
            cue.validate()
                .map_err(|source| PublishError::Invalid { index, source })?;
            Ok(WireCue {
                start_time: format_timestamp(cue.start()),
                end_time: format_timestamp(cue.end()),
                text: cue.text().to_string(),
            })
        })
        .collect::<Result<Vec<_>, PublishError>>()?;
    Ok(SubtitlesDocument {
        subtitles: Some(subtitles),
    })
}
