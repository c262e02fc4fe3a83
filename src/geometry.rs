//! Pointer-to-media-time mapping and preview placement along the progress bar.

use std::time::Duration;

/// Offset applied to the preview holder to park it off-screen. Moving it
/// avoids the reflow a visibility toggle would cost.
pub const HIDDEN_LEFT: f64 = -1000.0;

/// The progress bar as measured by the host. `left` is the viewport
/// coordinate of the bar's left edge, already resolved through its
/// positioned ancestors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressBar {
    pub left: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub page_x: f64,
    pub scroll_x: f64,
}

/// Horizontal pointer position relative to the bar's left edge.
pub fn pointer_offset(bar: &ProgressBar, pointer: &PointerPosition) -> f64 {
    pointer.page_x - bar.left - pointer.scroll_x
}

/// Media time under the pointer, in whole seconds.
///
/// Returns `None` while the duration is unknown or the bar has no width,
/// and for positions left of the bar.
pub fn media_timestamp(offset: f64, bar_width: f64, duration: Option<f64>) -> Option<Duration> {
    let duration = duration.filter(|d| d.is_finite() && *d > 0.0)?;
    if !bar_width.is_finite() || bar_width <= 0.0 || !offset.is_finite() {
        return None;
    }
    let seconds = (offset / bar_width * duration).floor();
    if seconds < 0.0 {
        return None;
    }
    Some(Duration::from_secs(seconds as u64))
}

/// Left offset for a preview of `width`, centered on the pointer but kept
/// between the bar's left edge and `right`.
pub fn preview_left(offset: f64, width: f64, right: f64) -> f64 {
    let half_width = width / 2.0;
    if offset + half_width > right {
        right - width
    } else if offset < half_width {
        0.0
    } else {
        offset - half_width
    }
}
