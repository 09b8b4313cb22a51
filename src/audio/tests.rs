use super::sink::{open_decoder, resolve_duration};
use super::types::AudioError;
use crate::library::Track;
use std::path::PathBuf;
use std::time::Duration;

fn track_at(path: PathBuf, duration: Option<Duration>) -> Track {
    Track {
        ordinal: 1,
        title: "Test".to_string(),
        path,
        duration,
    }
}

#[test]
fn missing_file_reports_open_error() {
    let t = track_at(PathBuf::from("/nonexistent/track1.mp3"), None);
    assert!(matches!(open_decoder(&t), Err(AudioError::Open { .. })));
    assert!(matches!(resolve_duration(&t), Err(AudioError::Open { .. })));
}

#[test]
fn undecodable_file_reports_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.mp3");
    std::fs::write(&path, b"definitely not audio").unwrap();

    let t = track_at(path, None);
    assert!(matches!(open_decoder(&t), Err(AudioError::Decode { .. })));
}

#[test]
fn scanned_duration_is_preferred() {
    let t = track_at(
        PathBuf::from("/nonexistent/track1.mp3"),
        Some(Duration::from_secs(42)),
    );
    assert_eq!(resolve_duration(&t).unwrap(), Duration::from_secs(42));
}

#[test]
fn zero_scanned_duration_falls_back_to_the_decoder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.mp3");
    std::fs::write(&path, b"definitely not audio").unwrap();

    let t = track_at(path, Some(Duration::ZERO));
    assert!(matches!(resolve_duration(&t), Err(AudioError::Decode { .. })));
}
