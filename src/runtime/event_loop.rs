use std::sync::mpsc;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, PlaybackState, TallyFollowUp};
use crate::audio::{AudioCmd, AudioPlayer};
use crate::config;
use crate::library::TrackOrdinal;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;
use crate::votes::{TallyEvent, VoteClient};

/// Everything the loop talks to besides the app model.
pub struct Channels<'a> {
    pub audio_player: &'a AudioPlayer,
    pub client: &'a VoteClient,
    pub mpris: &'a MprisHandle,
    pub control_rx: &'a mpsc::Receiver<ControlCmd>,
    pub tally_rx: &'a mpsc::Receiver<TallyEvent>,
}

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Last-known playing track as emitted to MPRIS.
    pub last_mpris_track: Option<TrackOrdinal>,
    /// Last-known playback state as emitted to MPRIS.
    pub last_mpris_playback: PlaybackState,
}

impl EventLoopState {
    pub fn new(app: &App) -> Self {
        Self {
            last_mpris_track: app.now_playing(),
            last_mpris_playback: app.playback_state(),
        }
    }
}

fn send_all(audio_player: &AudioPlayer, cmds: Vec<AudioCmd>) {
    for cmd in cmds {
        let _ = audio_player.send(cmd);
    }
}

fn follow_up(client: &VoteClient, next: Option<TallyFollowUp>) {
    match next {
        Some(TallyFollowUp::Fetch) => client.fetch(),
        Some(TallyFollowUp::ScheduleRefresh) => client.schedule_refresh(),
        None => {}
    }
}

/// Main terminal event loop: handles input, UI drawing, transport and store
/// results, and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    io: &Channels<'_>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Some(ev) = io.audio_player.try_event() {
            let cmds = app.on_audio_event(ev);
            send_all(io.audio_player, cmds);
        }

        while let Ok(ev) = io.tally_rx.try_recv() {
            let next = app.on_tally_event(ev, Local::now());
            follow_up(io.client, next);
        }

        // Keep MPRIS in sync even when playback changes come from media keys or end of track.
        let playing = app.now_playing();
        let playback = app.playback_state();
        if playing != state.last_mpris_track || playback != state.last_mpris_playback {
            update_mpris(io.mpris, app);
            state.last_mpris_track = playing;
            state.last_mpris_playback = playback;
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = io.control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, io) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, io) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn quit(settings: &config::Settings, io: &Channels<'_>) -> bool {
    io.audio_player
        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
    true
}

/// Move the cursor and carry playback along if something was playing.
fn move_selection(app: &mut App, io: &Channels<'_>, forward: bool) {
    let was_playing = app.now_playing().is_some();
    if forward {
        app.next();
    } else {
        app.prev();
    }
    if was_playing && app.now_playing() != app.selected_ordinal() {
        let cmds = app.toggle_selected();
        send_all(io.audio_player, cmds);
    }
}

fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &config::Settings,
    app: &mut App,
    io: &Channels<'_>,
) -> bool {
    match cmd {
        ControlCmd::Quit => return quit(settings, io),
        ControlCmd::Play => {
            if app.now_playing().is_none() {
                let cmds = app.toggle_selected();
                send_all(io.audio_player, cmds);
            }
        }
        ControlCmd::PlayPause => {
            let cmds = match app.now_playing() {
                Some(_) => app.stop(),
                None => app.toggle_selected(),
            };
            send_all(io.audio_player, cmds);
        }
        ControlCmd::Pause | ControlCmd::Stop => {
            let cmds = app.stop();
            send_all(io.audio_player, cmds);
        }
        ControlCmd::Next => move_selection(app, io, true),
        ControlCmd::Prev => move_selection(app, io, false),
    }

    false
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    io: &Channels<'_>,
) -> bool {
    // The alert is modal: nothing else reacts until it is dismissed.
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.dismiss_alert();
        }
        return false;
    }

    let step = i32::from(settings.controls.seek_step_percent);
    match key.code {
        KeyCode::Char('q') => return quit(settings, io),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Char('p') | KeyCode::Char(' ') | KeyCode::Enter => {
            let cmds = app.toggle_selected();
            send_all(io.audio_player, cmds);
        }
        KeyCode::Char('v') => {
            if let Some(ordinal) = app.vote_selected() {
                io.client.submit(ordinal);
            }
        }
        KeyCode::Char('r') => {
            let next = app.request_refresh(true);
            follow_up(io.client, next);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if let Some(cmd) = app.seek_selected_by(step) {
                let _ = io.audio_player.send(cmd);
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            if let Some(cmd) = app.seek_selected_by(-step) {
                let _ = io.audio_player.send(cmd);
            }
        }
        KeyCode::Char(c @ '0'..='9') => {
            let tenths = c.to_digit(10).unwrap_or(0);
            if let Some(cmd) = app.seek_selected(f64::from(tenths) / 10.0) {
                let _ = io.audio_player.send(cmd);
            }
        }
        _ => {}
    }

    false
}
