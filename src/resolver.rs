use crate::cue::Cue;

use std::time::Duration;

/// Returns the first cue whose interval contains `timestamp`.
pub fn find_active(cues: &[Cue], timestamp: Duration) -> Option<&Cue> {
    cues.iter().find(|cue| cue.contains(timestamp))
}

/// Speeds up repeated lookups while the pointer sweeps along the bar by
/// starting from the previous hit. Answers are always identical to
/// [`find_active`].
#[derive(Debug)]
pub struct CueCursor {
    last: Option<usize>,
    ordered: bool,
}

impl CueCursor {
    pub fn new(cues: &[Cue]) -> Self {
        Self {
            last: None,
            ordered: is_ordered(cues),
        }
    }

    pub fn find<'a>(&mut self, cues: &'a [Cue], timestamp: Duration) -> Option<&'a Cue> {
        if !self.ordered {
            return find_active(cues, timestamp);
        }

        let hint = self.last.filter(|&i| i < cues.len()).unwrap_or(0);
        let hit = if cues.get(hint).map_or(false, |c| timestamp < c.start_time) {
            (0..hint).rev().find(|&i| cues[i].contains(timestamp))
        } else {
            (hint..cues.len())
                .take_while(|&i| cues[i].start_time <= timestamp)
                .find(|&i| cues[i].contains(timestamp))
        };

        // A cue sharing a boundary with its predecessor loses to it.
        let first = hit.map(|mut i| {
            while i > 0 && cues[i - 1].contains(timestamp) {
                i -= 1;
            }
            i
        });
        if first.is_some() {
            self.last = first;
        }
        first.map(|i| &cues[i])
    }
}

/// Sorted by start and non-overlapping, apart from shared boundaries.
fn is_ordered(cues: &[Cue]) -> bool {
    cues.iter().all(|c| c.start_time <= c.end_time)
        && cues
            .windows(2)
            .all(|pair| pair[0].end_time <= pair[1].start_time)
}
