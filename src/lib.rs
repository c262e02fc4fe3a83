//! Progress bar thumbnail previews.
//!
//! Resolves which region of a sprite sheet a player should show while the
//! pointer hovers over its progress bar, from a WebVTT metadata track.

pub mod config;
pub mod cue;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod parser;
pub mod resolver;
pub mod serialiser;
pub mod sprite;
