use crate::cue::{Cue, Timestamp};

/// Finds the cue to display at `now`.
///
/// Returns the first displayable cue in store order whose inclusive
/// `[start, end]` interval holds `now`. When overlapping cues both match,
/// the one with the lowest index wins.
pub fn resolve(cues: &[Cue], now: Timestamp) -> Option<&Cue> {
    resolve_index(cues, now).map(|index| &cues[index])
}

/// Like [`resolve`], but yields the cue's position in the store.
pub fn resolve_index(cues: &[Cue], now: Timestamp) -> Option<usize> {
    cues.iter()
        .position(|cue| cue.is_displayable() && cue.contains(now))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start: u64, end: u64, text: &str) -> Cue {
        Cue::new(Timestamp::from_millis(start), Timestamp::from_millis(end), text).unwrap()
    }

    fn at(secs: f64) -> Timestamp {
        Timestamp::from_secs_f64(secs).unwrap()
    }

    #[test]
    fn shared_boundary_goes_to_lowest_index() {
        let cues = [cue(0, 5000, "a"), cue(5000, 10_000, "b")];
        assert_eq!(resolve(&cues, at(5.0)).map(Cue::text), Some("a"));
        assert_eq!(resolve(&cues, at(5.001)).map(Cue::text), Some("b"));
    }

    #[test]
    fn nothing_past_the_end() {
        let cues = [cue(0, 5000, "a")];
        assert_eq!(resolve(&cues, at(5.001)), None);
    }

    #[test]
    fn overlap_prefers_earliest_appended() {
        let cues = [cue(4000, 9000, "late-start"), cue(0, 10_000, "wide")];
        assert_eq!(resolve(&cues, at(2.0)).map(Cue::text), Some("wide"));
        assert_eq!(resolve(&cues, at(6.0)).map(Cue::text), Some("late-start"));
    }

    #[test]
    fn empty_text_is_never_shown() {
        let cues = [cue(0, 5000, ""), cue(1000, 3000, "under")];
        assert_eq!(resolve_index(&cues, at(0.5)), None);
        assert_eq!(resolve_index(&cues, at(2.0)), Some(1));
    }

    #[test]
    fn empty_store_resolves_to_none() {
        assert_eq!(resolve(&[], Timestamp::ZERO), None);
    }

    #[test]
    fn start_bound_is_inclusive() {
        let cues = [cue(1000, 3500, "Hello")];
        assert_eq!(resolve(&cues, at(1.0)).map(Cue::text), Some("Hello"));
        assert_eq!(resolve(&cues, at(0.999)), None);
    }
}
