use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use chrono::Local;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::mpris::ControlCmd;
use crate::votes::{TallyEvent, VoteClient};

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    if let Err(e) = startup::init_logging(&settings.log) {
        eprintln!(
            "tunevote: cannot write log file {}: {e}",
            settings.log.file.display()
        );
    }
    if dotenvy::dotenv().is_err() {
        info!("No .env file found");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let store = runtime.block_on(startup::connect_store(&settings.store));

    let dir = env::args().nth(1).map(PathBuf::from);
    let tracks = startup::load_tracks(dir.as_deref(), &settings);
    if tracks.is_empty() {
        warn!("No tracks to vote on");
    }

    let audio_player = AudioPlayer::new(tracks.clone(), settings.audio.clone());
    let mut app = App::new(tracks, Local::now());

    let (tally_tx, tally_rx) = mpsc::channel::<TallyEvent>();
    let client = VoteClient::new(
        store,
        runtime.handle().clone(),
        tally_tx,
        Duration::from_millis(settings.votes.reconcile_delay_ms),
    );
    startup::initial_refresh(&mut app, &client);
    let poller = client.start_poller(Duration::from_secs(settings.votes.refresh_interval_secs));

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, &app);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new(&app);
        let io = event_loop::Channels {
            audio_player: &audio_player,
            client: &client,
            mpris: &mpris,
            control_rx: &control_rx,
            tally_rx: &tally_rx,
        };

        event_loop::run(&mut terminal, &settings, &mut app, &io, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    poller.cancel();
    info!("Shutting down");
    runtime.shutdown_timeout(Duration::from_secs(1));

    run_result
}
