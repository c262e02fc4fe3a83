use std::time::Duration;

use clap::ValueEnum;

/// A time-ranged entry of a metadata track. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start_time: Duration,
    pub end_time: Duration,
    pub text: String,
}

impl Cue {
    pub fn new(start_time: Duration, end_time: Duration, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
        }
    }

    pub fn contains(&self, timestamp: Duration) -> bool {
        self.start_time <= timestamp && timestamp <= self.end_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrackKind {
    Metadata,
    Subtitles,
    Captions,
    Chapters,
    Descriptions,
}

#[derive(Debug, Clone)]
pub struct TextTrack {
    pub kind: TrackKind,
    pub label: Option<String>,
    pub cues: Vec<Cue>,
}

impl TextTrack {
    pub fn new(kind: TrackKind, label: Option<String>, cues: Vec<Cue>) -> Self {
        Self { kind, label, cues }
    }
}
