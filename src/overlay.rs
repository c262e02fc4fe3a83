use crate::config::Settings;
use crate::cue::{Cue, TextTrack, TrackKind};
use crate::geometry::{self, PointerPosition, ProgressBar, HIDDEN_LEFT};
use crate::resolver::CueCursor;
use crate::sprite::{self, ClipRect};

use std::time::Duration;

use tracing::{debug, info};

/// Everything the host player reports to the preview.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    TrackAdded(TextTrack),
    SourceChange(String),
    DurationChange(f64),
    LoadedMetadata(f64),
    PointerMove {
        bar: ProgressBar,
        pointer: PointerPosition,
    },
    PointerOut,
    TouchCancel,
    TouchEnd,
    UserInactive,
}

/// The host's preview element: a holder that is sized and positioned, with
/// a cropped image inside.
pub trait PreviewSurface {
    fn set_image_src(&mut self, src: &str);
    fn set_size(&mut self, width: f64, height: f64);
    fn set_crop(&mut self, image_left: f64, image_top: f64, clip: ClipRect);
    fn set_left(&mut self, left: f64);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub timestamp: Duration,
    pub src: String,
    pub width: f64,
    pub height: f64,
    pub clip: ClipRect,
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No track yet, or the pointer position couldn't be mapped to a time.
    Ignored,
    /// Nothing covers this time; whatever was shown stays.
    NoCue(Duration),
    Shown(Preview),
    Hidden,
}

struct ActiveTrack {
    cues: Vec<Cue>,
    cursor: CueCursor,
}

pub struct Sneakpeek {
    settings: Settings,
    media_src: String,
    duration: Option<f64>,
    track: Option<ActiveTrack>,
    image_src: Option<String>,
    size: Option<(f64, f64)>,
}

impl Sneakpeek {
    pub fn new(settings: Settings, media_src: impl Into<String>) -> Self {
        Self {
            settings,
            media_src: media_src.into(),
            duration: None,
            track: None,
            image_src: None,
            size: None,
        }
    }

    pub fn handle<S: PreviewSurface>(&mut self, event: PlayerEvent, surface: &mut S) -> Outcome {
        match event {
            PlayerEvent::TrackAdded(track) => {
                self.add_track(track);
                Outcome::Ignored
            }
            PlayerEvent::SourceChange(src) => {
                self.media_src = src;
                Outcome::Ignored
            }
            PlayerEvent::DurationChange(duration) | PlayerEvent::LoadedMetadata(duration) => {
                debug!(duration, "duration updated");
                self.duration = Some(duration);
                Outcome::Ignored
            }
            PlayerEvent::PointerMove { bar, pointer } => self.show(&bar, &pointer, surface),
            PlayerEvent::PointerOut
            | PlayerEvent::TouchCancel
            | PlayerEvent::TouchEnd
            | PlayerEvent::UserInactive => {
                surface.set_left(HIDDEN_LEFT);
                Outcome::Hidden
            }
        }
    }

    fn add_track(&mut self, track: TextTrack) {
        if self.track.is_some() || track.kind != TrackKind::Metadata {
            return;
        }
        if let Some(wanted) = &self.settings.track_label {
            if track.label.as_deref() != Some(wanted.as_str()) {
                debug!(label = ?track.label, "skipping metadata track with another label");
                return;
            }
        }
        info!(cues = track.cues.len(), label = ?track.label, "using metadata track");
        let cursor = CueCursor::new(&track.cues);
        self.track = Some(ActiveTrack {
            cues: track.cues,
            cursor,
        });
    }

    fn show<S: PreviewSurface>(
        &mut self,
        bar: &ProgressBar,
        pointer: &PointerPosition,
        surface: &mut S,
    ) -> Outcome {
        let track = match &mut self.track {
            Some(track) => track,
            None => return Outcome::Ignored,
        };

        let offset = geometry::pointer_offset(bar, pointer);
        let timestamp = match geometry::media_timestamp(offset, bar.width, self.duration) {
            Some(timestamp) => timestamp,
            None => {
                debug!(offset, duration = ?self.duration, "pointer position has no media time");
                return Outcome::Ignored;
            }
        };

        let cue = match track.cursor.find(&track.cues, timestamp) {
            Some(cue) => cue,
            None => {
                debug!(?timestamp, "no cue covers pointer time");
                return Outcome::NoCue(timestamp);
            }
        };

        let region = sprite::parse_image_link(&cue.text, &self.settings.base_path)
            .with_defaults(&self.settings);

        let src = if region.src.is_empty() {
            self.image_src.clone().unwrap_or_default()
        } else {
            resolve_image_url(&region.src, &self.media_src, &self.settings.query_string())
        };
        if !region.src.is_empty() && self.image_src.as_deref() != Some(src.as_str()) {
            debug!(%src, "switching sprite sheet");
            surface.set_image_src(&src);
            self.image_src = Some(src.clone());
        }

        if self.size != Some((region.w, region.h)) {
            surface.set_size(region.w, region.h);
            self.size = Some((region.w, region.h));
        }

        let clip = region.clip_rect();
        // Subtracting from zero keeps an unset offset at 0 rather than -0.
        surface.set_crop(0.0 - region.x, 0.0 - region.y, clip);

        let left = geometry::preview_left(offset, region.w, bar.width);
        surface.set_left(left);

        Outcome::Shown(Preview {
            timestamp,
            src,
            width: region.w,
            height: region.h,
            clip,
            left,
        })
    }
}

/// Root-relative paths resolve against the directory of the media source.
fn resolve_image_url(src: &str, media_src: &str, query: &str) -> String {
    let base = if src.starts_with('/') {
        media_src.rfind('/').map_or("", |i| &media_src[..i])
    } else {
        ""
    };
    format!("{}{}{}", base, src, query)
}
