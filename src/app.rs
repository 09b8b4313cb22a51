//! Application module: the view model driven by the event loop.
//!
//! `App` in `app::model` owns the track list, the per-track playback
//! controllers, the vote tally and the single "now playing" selector.

mod model;

pub use model::*;
