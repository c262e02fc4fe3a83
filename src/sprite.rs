use crate::config::Settings;

const REGION_KEY: &str = "xywh=";

/// A rectangle within a sprite sheet. Zero width or height means the
/// configured default applies.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRegion {
    pub src: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Crop rectangle in CSS `rect(top, right, bottom, left)` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl SpriteRegion {
    fn whole(src: String) -> Self {
        Self {
            src,
            x: 0.0,
            y: 0.0,
            w: 0.0,
            h: 0.0,
        }
    }

    pub fn with_defaults(mut self, settings: &Settings) -> Self {
        if self.w == 0.0 {
            self.w = settings.width;
        }
        if self.h == 0.0 {
            self.h = settings.height;
        }
        self
    }

    pub fn clip_rect(&self) -> ClipRect {
        ClipRect {
            top: self.y,
            right: self.x + self.w,
            bottom: self.y + self.h,
            left: self.x,
        }
    }
}

/// Decodes `<image-path>[#xywh=<x>,<y>,<w>,<h>]`.
///
/// Only a link carrying a fragment gets `base_path` prepended. Malformed
/// regions never fail; they decode to a zero region.
pub fn parse_image_link(link: &str, base_path: &str) -> SpriteRegion {
    let (path, fragment) = match link.find('#') {
        Some(index) => (&link[..index], &link[index + 1..]),
        None => return SpriteRegion::whole(link.to_string()),
    };

    let src = format!("{}{}", base_path, path);
    let fields = match fragment.strip_prefix(REGION_KEY) {
        Some(fields) => fields,
        None => return SpriteRegion::whole(src),
    };

    let mut fields = fields.split(',').map(coerce);
    let mut next = || fields.next().unwrap_or(0.0);
    let (x, y, w, h) = (next(), next(), next(), next());

    SpriteRegion { src, x, y, w, h }
}

/// Blank reads as zero; anything unparseable or non-finite is clamped to zero.
/// Only decimal notation is read, so `0x10` is zero rather than 16.
fn coerce(field: &str) -> f64 {
    let field = field.trim();
    if field.is_empty() {
        return 0.0;
    }
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}
