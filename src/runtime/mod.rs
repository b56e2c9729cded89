use std::sync::Arc;
use std::sync::mpsc;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::download::FsDownloader;
use crate::generate::SimulatedGenerator;
use crate::media::{MediaSignal, RodioBackend};
use crate::shell::Shell;
use crate::track::TrackRecord;

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();

    match logging::init(&settings.log) {
        Ok(path) => eprintln!("songforge log: {}", path.display()),
        Err(e) => eprintln!("songforge: logging disabled: {e}"),
    }
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }
    info!("songforge starting");

    let mut backend = RodioBackend::spawn();
    let (signal_tx, signal_rx) = mpsc::channel::<MediaSignal>();

    let generator = SimulatedGenerator::new(&settings.generator);
    info!(samples = generator.pool().len(), "generator ready");
    let downloader = FsDownloader::new(settings.download_dir());
    let mut shell = Shell::new(
        Arc::new(generator),
        Arc::new(downloader),
        settings.player.clone(),
        signal_tx,
    );

    if settings.ui.show_demo_player {
        let demo = &settings.ui.demo;
        let track = TrackRecord {
            id: "demo".to_string(),
            title: demo.title.clone(),
            artist: demo.artist.clone(),
            genre: String::new(),
            url: demo.url.clone(),
            lyrics: None,
        };
        shell.attach_demo(track, &mut backend);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let run_result = event_loop::run(&mut terminal, &settings, &mut shell, &mut backend, &signal_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    // Controllers release their handles before the audio thread stops.
    drop(shell);
    backend.shutdown();
    info!("songforge stopped");

    run_result
}
