use super::*;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

fn make_track() -> Track {
    Track {
        ordinal: 7,
        title: "Summer Track 7".to_string(),
        path: PathBuf::from("/tmp/audio/track7.mp3"),
        duration: Some(Duration::from_micros(1_234_567)),
    }
}

fn handle_and_iface() -> (MprisHandle, PlayerIface, mpsc::Receiver<ControlCmd>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let handle = MprisHandle {
        state: state.clone(),
    };
    (handle, PlayerIface { tx, state }, rx)
}

#[test]
fn set_track_metadata_sets_and_clears_shared_state() {
    let (handle, iface, _rx) = handle_and_iface();

    let track = make_track();
    handle.set_track_metadata(Some(&track), None);

    {
        let s = iface.state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Summer Track 7"));
        assert!(s.url.as_deref().unwrap().contains("/tmp/audio/track7.mp3"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(
            s.track_id.as_ref().map(|p| p.as_str()),
            Some("/org/mpris/MediaPlayer2/track/7")
        );
    }

    handle.set_track_metadata(None, None);
    {
        let s = iface.state.lock().unwrap();
        assert_eq!(s.title, None);
        assert_eq!(s.url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.track_id.is_none());
    }
}

#[test]
fn decoded_length_wins_over_scanned_duration() {
    let (handle, iface, _rx) = handle_and_iface();
    handle.set_track_metadata(Some(&make_track()), Some(Duration::from_secs(2)));
    assert_eq!(iface.state.lock().unwrap().length_micros, Some(2_000_000));
}

#[test]
fn playback_status_maps_state_to_mpris_strings() {
    let (handle, iface, _rx) = handle_and_iface();

    assert_eq!(iface.playback_status(), "Stopped");

    handle.set_playback(PlaybackState::Playing);
    assert_eq!(iface.playback_status(), "Playing");

    handle.set_playback(PlaybackState::Paused);
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (handle, iface, _rx) = handle_and_iface();
    handle.set_track_metadata(Some(&make_track()), None);

    let map = iface.metadata();
    for k in ["mpris:trackid", "xesam:title", "xesam:url", "mpris:length"] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn metadata_without_a_track_only_carries_an_empty_title() {
    let (_handle, iface, _rx) = handle_and_iface();
    let map = iface.metadata();
    assert_eq!(map.len(), 1);
    assert!(map.contains_key("xesam:title"));
}

#[test]
fn player_methods_forward_control_commands() {
    let (_handle, iface, rx) = handle_and_iface();
    iface.play_pause();
    iface.next();
    iface.stop();

    let got: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![ControlCmd::PlayPause, ControlCmd::Next, ControlCmd::Stop]
    );
}
