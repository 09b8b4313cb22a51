use std::path::Path;
use std::time::Duration;

use lofty::file::TaggedFile;
use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::{LibrarySettings, TrackSettings};

use super::model::{Track, TrackOrdinal};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a title from the file tags: "Artist - Title" when both exist,
/// the tag title alone, or `None` when the file has no usable title tag.
fn title_from_tags(tagged: &TaggedFile) -> Option<String> {
    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;

    let title = tag.title().map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
    match tag.artist().map(|a| a.trim().to_string()).filter(|a| !a.is_empty()) {
        Some(artist) => Some(format!("{artist} - {title}")),
        None => Some(title),
    }
}

/// lofty reports zero when it cannot work out a length.
fn known_duration(d: Duration) -> Option<Duration> {
    (!d.is_zero()).then_some(d)
}

/// Title and duration from one read of the file's tags and properties.
fn read_tags(path: &Path) -> (Option<String>, Option<Duration>) {
    match lofty::read_from_path(path) {
        Ok(tagged) => (
            title_from_tags(&tagged),
            known_duration(tagged.properties().duration()),
        ),
        Err(_) => (None, None),
    }
}

/// Build the track list from configured `[[tracks]]` entries, ordered by number.
pub fn from_settings(entries: &[TrackSettings]) -> Vec<Track> {
    let mut tracks: Vec<Track> = entries
        .iter()
        .map(|e| Track {
            ordinal: e.number,
            title: e.title.clone(),
            path: e.path.clone(),
            duration: read_tags(&e.path).1,
        })
        .collect();

    tracks.sort_by_key(|t| t.ordinal);
    tracks
}

/// Scan `dir` for audio files and number them 1..N by case-insensitive title.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut found: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        let (title, duration) = read_tags(path);
        found.push(Track {
            ordinal: 0,
            title: title.unwrap_or(stem),
            path: path.to_path_buf(),
            duration,
        });
    }

    found.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    for (i, track) in found.iter_mut().enumerate() {
        track.ordinal = (i + 1) as TrackOrdinal;
    }
    found
}
