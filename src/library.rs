//! Track library: the static set of tracks offered for voting.
//!
//! Tracks come either from the `[[tracks]]` config entries or from scanning a
//! directory passed on the command line.

mod model;
mod scan;

pub use model::*;
pub use scan::{from_settings, scan};
