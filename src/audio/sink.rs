//! Utilities for creating `rodio` sinks from `Track` values.
//!
//! The helpers here encapsulate opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::library::Track;

use super::types::AudioError;

pub(super) fn open_decoder(track: &Track) -> Result<Decoder<BufReader<File>>, AudioError> {
    let file = File::open(&track.path).map_err(|source| AudioError::Open {
        path: track.path.clone(),
        source,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
        path: track.path.clone(),
        source,
    })
}

/// Track duration: from the scanned tags when present, otherwise from the decoder.
pub(super) fn resolve_duration(track: &Track) -> Result<Duration, AudioError> {
    if let Some(d) = track.duration.filter(|d| !d.is_zero()) {
        return Ok(d);
    }
    open_decoder(track)?
        .total_duration()
        .ok_or_else(|| AudioError::UnknownDuration(track.path.clone()))
}

/// Create a paused `Sink` for `track` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    track: &Track,
    start_at: Duration,
) -> Result<Sink, AudioError> {
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = open_decoder(track)?.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}
