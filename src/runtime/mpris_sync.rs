use crate::app::App;
use crate::mpris::MprisHandle;

pub fn update_mpris(mpris: &MprisHandle, app: &App) {
    let track = app.now_playing_track();
    let length = track
        .and_then(|t| app.controller(t.ordinal))
        .and_then(|c| c.duration());

    mpris.set_track_metadata(track, length);
    mpris.set_playback(app.playback_state());
}
