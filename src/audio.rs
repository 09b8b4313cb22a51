//! Audio transport: one rodio sink per track, driven from a dedicated thread.
//!
//! The UI sends [`AudioCmd`]s and receives [`AudioEvent`]s; neither side
//! blocks the other.

mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::*;

#[cfg(test)]
mod tests;
