use crate::cue::{Cue, Timestamp};
use crate::error::{CaptionError, FetchError};
use crate::wire::WireCue;

use log::debug;
use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::digit1;
use nom::combinator::{all_consuming, map_res, verify};
use nom::error::{ErrorKind, ParseError, VerboseError};
use nom::{Err, IResult};

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Parses a canonical `HH:MM:SS,mmm` timestamp.
///
/// Nothing is repaired: short fields, stray whitespace, out-of-range minutes
/// or seconds and over-long milliseconds are all rejected.
pub fn parse_timestamp(input: &str) -> Result<Timestamp, CaptionError> {
    match all_consuming(timestamp)(input) {
        Ok((_, ts)) => Ok(ts),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => {
            debug!("rejected timestamp {:?}: {:?}", input, err.errors);
            Err(CaptionError::MalformedTimestamp(input.to_string()))
        }
        Err(Err::Incomplete(_)) => Err(CaptionError::MalformedTimestamp(input.to_string())),
    }
}

/// Turns persisted cues back into validated [`Cue`]s, keeping their order.
pub fn decode_cues(wire: Vec<WireCue>) -> Result<Vec<Cue>, FetchError> {
    wire.into_iter()
        .enumerate()
        .map(|(index, cue)| {
            decode_cue(cue).map_err(|source| FetchError::Malformed { index, source })
        })
        .collect()
}

fn decode_cue(wire: WireCue) -> Result<Cue, CaptionError> {
    let start = parse_timestamp(&wire.start_time)?;
    let end = parse_timestamp(&wire.end_time)?;
    Cue::new(start, end, wire.text)
}

fn timestamp(input: &str) -> ParseResult<Timestamp> {
    let (input, hours) = hours(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = sexagesimal(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = sexagesimal(input)?;
    let (input, _) = tag(",")(input)?;
    let (input, millis) = fixed_digits(3)(input)?;

    let total = hours
        .checked_mul(60 * 60 * 1000)
        .and_then(|h| h.checked_add(millis + seconds * 1000 + minutes * 60 * 1000));
    match total {
        Some(total) => Ok((input, Timestamp::from_millis(total))),
        None => Err(Err::Failure(VerboseError::from_error_kind(input, ErrorKind::TooLarge))),
    }
}

/// At least two digits. Wider hour fields are only canonical without a
/// leading zero, since that is what formatting produces.
fn hours(input: &str) -> ParseResult<u64> {
    map_res(
        verify(digit1, |s: &str| {
            s.len() == 2 || (s.len() > 2 && !s.starts_with('0'))
        }),
        |s: &str| s.parse::<u64>(),
    )(input)
}

fn sexagesimal(input: &str) -> ParseResult<u64> {
    verify(fixed_digits(2), |v: &u64| *v < 60)(input)
}

fn fixed_digits<'a>(count: usize) -> impl FnMut(&'a str) -> ParseResult<'a, u64> {
    map_res(
        take_while_m_n(count, count, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u64>(),
    )
}
