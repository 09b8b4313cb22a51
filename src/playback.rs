//! Per-track playback controllers.
//!
//! Each track gets a [`TrackController`] mirroring what its audio sink is
//! doing. Controllers are plain state; the audio thread does the work.

mod controller;

pub use controller::*;
