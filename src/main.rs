mod app;
mod audio;
mod config;
mod library;
mod mpris;
mod playback;
mod runtime;
mod ui;
mod votes;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
