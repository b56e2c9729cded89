use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::config;
use crate::media::{MediaBackend, MediaSignal};
use crate::shell::{Focus, Shell};
use crate::ui::{self, HitMap};

const SPINNER_INTERVAL: Duration = Duration::from_millis(120);

/// Main terminal event loop: drains media signals and generation results,
/// draws, then handles one input event. Returns `Ok(())` when shutdown is
/// requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    shell: &mut Shell,
    backend: &mut dyn MediaBackend,
    signals: &mpsc::Receiver<MediaSignal>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tick: u64 = 0;
    let mut last_tick = Instant::now();
    let mut hits = HitMap::default();

    loop {
        while let Ok(signal) = signals.try_recv() {
            shell.dispatch_signal(signal);
        }
        shell.poll_generation(backend);

        if last_tick.elapsed() >= SPINNER_INTERVAL {
            tick = tick.wrapping_add(1);
            last_tick = Instant::now();
        }

        terminal.draw(|f| {
            hits = ui::draw(f, shell, &settings.ui, &settings.player, tick);
        })?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(key, settings, shell) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse_event(mouse, shell, &hits),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Apply a key press. Returns true when the user asked to quit.
fn handle_key_event(key: KeyEvent, settings: &config::Settings, shell: &mut Shell) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => return true,
        KeyCode::Tab => {
            shell.cycle_focus();
            return false;
        }
        KeyCode::F(2) => {
            shell.toggle_custom_mode();
            return false;
        }
        KeyCode::Esc => {
            if shell.lyrics_window {
                shell.lyrics_window = false;
            } else {
                shell.focus = Focus::Tracks;
            }
            return false;
        }
        _ => {}
    }

    if shell.focus != Focus::Tracks {
        match key.code {
            KeyCode::Enter => {
                if let Err(e) = shell.generate() {
                    debug!("generate rejected: {e}");
                }
            }
            KeyCode::Backspace => shell.pop_char(),
            KeyCode::Char(c) if !ctrl && !c.is_control() => shell.push_char(c),
            _ => {}
        }
        return false;
    }

    let scrub = settings.player.scrub_seconds as f64;
    let step = settings.player.volume_step;

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => shell.next(),
        KeyCode::Char('k') | KeyCode::Up => shell.prev(),
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Enter => {
            if let Some(c) = shell.selected_entry_mut() {
                c.toggle_play();
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            if let Some(c) = shell.selected_entry_mut() {
                c.seek_by(-scrub);
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if let Some(c) = shell.selected_entry_mut() {
                c.seek_by(scrub);
            }
        }
        KeyCode::Char(d) if d.is_ascii_digit() => {
            let fraction = f64::from(d as u8 - b'0') / 10.0;
            if let Some(c) = shell.selected_entry_mut() {
                c.seek(fraction);
            }
        }
        KeyCode::Char('m') => {
            if let Some(c) = shell.selected_entry_mut() {
                c.toggle_mute();
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            if let Some(c) = shell.selected_entry_mut() {
                c.step_volume(step);
            }
        }
        KeyCode::Char('-') => {
            if let Some(c) = shell.selected_entry_mut() {
                c.step_volume(-step);
            }
        }
        KeyCode::Char('d') => {
            let enabled = shell
                .selected_entry()
                .map(|c| c.view().controls_enabled)
                .unwrap_or(false);
            if enabled {
                shell.download_selected();
            }
        }
        KeyCode::Char('x') => {
            shell.remove_selected();
        }
        KeyCode::Char('K') => shell.toggle_lyrics_window(),
        KeyCode::Char('c') => shell.toggle_custom_mode(),
        KeyCode::Char('i') | KeyCode::Char('/') => shell.focus = Focus::Prompt,
        _ => {}
    }

    false
}

/// A left click on a progress bar selects that entry and seeks to the
/// clicked point.
fn handle_mouse_event(mouse: MouseEvent, shell: &mut Shell, hits: &HitMap) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    let Some((entry, fraction)) = hits.bar_at(mouse.column, mouse.row) else {
        return;
    };
    shell.focus = Focus::Tracks;
    shell.select(entry);
    if let Some(c) = shell.entry_mut(entry) {
        c.seek(fraction);
    }
}
