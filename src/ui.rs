//! UI rendering for the terminal user interface.
//!
//! `draw` renders the shell into a frame and returns a `HitMap` of the
//! progress bars it drew, so mouse clicks can be turned into seeks.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::config::{PlayerSettings, UiSettings};
use crate::player::{PlaybackController, TransportIcon, TransportView, pointer_fraction};
use crate::shell::{Focus, Shell};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("tab".to_string(), "switch focus".to_string());
    map.insert("enter".to_string(), "generate / play".to_string());
    map.insert("F2".to_string(), "custom mode".to_string());
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    // h/l and +/- are filled from config.
    map.insert("0-9".to_string(), "jump to 0-90%".to_string());
    map.insert("m".to_string(), "mute".to_string());
    map.insert("d".to_string(), "download".to_string());
    map.insert("x".to_string(), "remove".to_string());
    map.insert("K".to_string(), "lyrics".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Rows used by one player entry in the list.
const ENTRY_HEIGHT: u16 = 4;

/// Render the controls help text, incorporating scrub seconds and the volume step.
fn controls_text(scrub_seconds: u64, volume_step: f32) -> String {
    let order = [
        "tab", "enter", "F2", "j/k", "space/p", "h/l", "0-9", "+/-", "m", "d", "x", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| match *k {
            "h/l" => Some(format!("[h/l] scrub -/+{}s", scrub_seconds)),
            "+/-" => Some(format!(
                "[+/-] volume {}%",
                (volume_step * 100.0).round() as u32
            )),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Screen regions of the progress bars drawn in the last frame, keyed by
/// list entry index.
#[derive(Debug, Default, Clone)]
pub struct HitMap {
    bars: Vec<(usize, Rect)>,
}

impl HitMap {
    fn push(&mut self, entry: usize, rect: Rect) {
        self.bars.push((entry, rect));
    }

    /// The entry whose progress bar is under (`column`, `row`), and the
    /// fraction along the bar the pointer sits at.
    pub fn bar_at(&self, column: u16, row: u16) -> Option<(usize, f64)> {
        self.bars
            .iter()
            .find(|(_, r)| {
                row >= r.y && row < r.y + r.height && column >= r.x && column < r.x + r.width
            })
            .map(|(entry, r)| (*entry, pointer_fraction(column, r.x, r.width)))
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn icon_text(icon: TransportIcon, tick: u64) -> &'static str {
    match icon {
        TransportIcon::Spinner => SPINNER[(tick as usize) % SPINNER.len()],
        TransportIcon::Error => "!",
        TransportIcon::Pause => "⏸",
        TransportIcon::Play => "▶",
    }
}

fn bar_text(fraction: f64, width: u16, filled: char, empty: char) -> String {
    let width = width as usize;
    let n = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    let mut s = String::with_capacity(width * 3);
    s.extend(std::iter::repeat_n(filled, n));
    s.extend(std::iter::repeat_n(empty, width - n));
    s
}

fn input_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn input_text(value: &str, focused: bool, placeholder: &str) -> Line<'static> {
    if value.is_empty() && !focused {
        return Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let mut text = value.to_string();
    if focused {
        text.push('▏');
    }
    Line::from(text)
}

/// Render one controller into a 4-row slot and record its progress bar.
fn draw_entry(
    frame: &mut Frame,
    area: Rect,
    entry: usize,
    controller: &PlaybackController,
    selected: bool,
    tick: u64,
    hits: &mut HitMap,
) {
    let view: TransportView = controller.view();
    let track = controller.track();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let marker = if selected { "> " } else { "  " };
    let mut title = Line::from(vec![
        Span::raw(marker),
        Span::styled(track.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(track.artist.clone(), Style::default().fg(Color::Gray)),
    ]);
    if selected {
        title = title.patch_style(Style::default().add_modifier(Modifier::REVERSED));
    }
    frame.render_widget(Paragraph::new(title), rows[0]);

    let transport = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(4),
            Constraint::Length(14),
        ])
        .split(rows[1]);

    let icon_style = match view.icon {
        TransportIcon::Error => Style::default().fg(Color::Red),
        _ if !view.controls_enabled => Style::default().fg(Color::DarkGray),
        _ => Style::default().fg(Color::Cyan),
    };
    frame.render_widget(
        Paragraph::new(format!("  {}", icon_text(view.icon, tick))).style(icon_style),
        transport[0],
    );

    let bar = transport[1];
    frame.render_widget(
        Paragraph::new(bar_text(view.progress, bar.width, '━', '─')).fg(Color::Magenta),
        bar,
    );
    hits.push(entry, bar);

    frame.render_widget(
        Paragraph::new(format!("{} / {}", view.elapsed, view.total)).alignment(Alignment::Right),
        transport[2],
    );

    let speaker = if view.muted_icon { "🔇" } else { "🔊" };
    let mut volume = vec![
        Span::raw(format!("    {} ", speaker)),
        Span::raw(bar_text(view.volume_level as f64, 10, '█', '░')),
        Span::raw(format!(" {:>3}%", (view.volume_level * 100.0).round() as u32)),
    ];
    if let Some(err) = view.error.as_deref() {
        volume.push(Span::raw("   "));
        volume.push(Span::styled(err.to_string(), Style::default().fg(Color::Red)));
    }
    frame.render_widget(Paragraph::new(Line::from(volume)), rows[2]);
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    shell: &Shell,
    ui: &UiSettings,
    player: &PlayerSettings,
    tick: u64,
) -> HitMap {
    let mut hits = HitMap::default();
    let custom = shell.custom_mode();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(if custom { 6 } else { 3 }),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" songforge ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Inputs
    {
        let (prompt_area, extra) = if custom {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Length(3)])
                .split(chunks[1]);
            (rows[0], Some(rows[1]))
        } else {
            (chunks[1], None)
        };

        let (title, placeholder) = if custom {
            (" lyrics ", "Write your lyrics...")
        } else {
            (" prompt ", "Describe the song you want to create...")
        };
        let focused = shell.focus == Focus::Prompt;
        frame.render_widget(
            Paragraph::new(input_text(&shell.prompt, focused, placeholder))
                .block(input_block(title, focused)),
            prompt_area,
        );

        if let Some(extra) = extra {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(extra);
            let focused = shell.focus == Focus::Title;
            frame.render_widget(
                Paragraph::new(input_text(&shell.title_input, focused, "Song title"))
                    .block(input_block(" title ", focused)),
                cols[0],
            );
            let focused = shell.focus == Focus::Tags;
            frame.render_widget(
                Paragraph::new(input_text(&shell.tags_input, focused, "pop, upbeat, synth"))
                    .block(input_block(" tags ", focused)),
                cols[1],
            );
        }
    }

    // Status line: error, busy indicator, or the generate hint.
    let status = if let Some(err) = shell.error() {
        Line::from(Span::styled(format!(" {}", err), Style::default().fg(Color::Red)))
    } else if shell.is_submitting() {
        Line::from(format!(
            " {} Generating...",
            SPINNER[(tick as usize) % SPINNER.len()]
        ))
        .fg(Color::Yellow)
    } else {
        Line::from(" [enter] Generate Song").fg(Color::Green)
    };
    frame.render_widget(Paragraph::new(status), chunks[2]);

    // Song list
    let list_area = chunks[3];
    let block = Block::default().borders(Borders::ALL).title(" songs ");
    let mut inner = block.inner(list_area);
    frame.render_widget(block, list_area);

    if shell.is_empty_state() {
        let notice = Paragraph::new("No songs yet. Enter a prompt to create your first one.")
            .alignment(Alignment::Center)
            .fg(Color::DarkGray);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);
        frame.render_widget(notice, rows[0]);
        inner = rows[1];
    }

    // Keep the selected entry in view.
    let per_view = (inner.height / ENTRY_HEIGHT).max(1) as usize;
    let total = shell.entry_count();
    let start = shell.selected().saturating_sub(per_view - 1);
    let end = (start + per_view).min(total);
    let tracks_focused = shell.focus == Focus::Tracks;
    for (slot, entry) in (start..end).enumerate() {
        let Some(controller) = shell.entry(entry) else {
            continue;
        };
        let area = Rect {
            x: inner.x,
            y: inner.y + slot as u16 * ENTRY_HEIGHT,
            width: inner.width,
            height: ENTRY_HEIGHT.min(inner.height.saturating_sub(slot as u16 * ENTRY_HEIGHT)),
        };
        if area.height < 3 {
            break;
        }
        let selected = tracks_focused && entry == shell.selected();
        draw_entry(frame, area, entry, controller, selected, tick, &mut hits);
    }

    // Overlay lyrics popup (keeps list visible under it)
    if shell.lyrics_window {
        let popup_area = centered_rect_sized(60, 14, list_area);
        frame.render_widget(Clear, popup_area);

        let (title, body) = match shell.selected_entry() {
            Some(c) => (
                format!(" {} (K closes) ", c.track().title),
                c.track()
                    .lyrics()
                    .unwrap_or("No lyrics for this song")
                    .to_string(),
            ),
            None => (" lyrics (K closes) ".to_string(), "No song selected".to_string()),
        };
        let lyrics = Paragraph::new(body)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(title),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(lyrics, popup_area);
    }

    let footer = Paragraph::new(controls_text(player.scrub_seconds, player.volume_step))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_text_includes_configured_steps() {
        let text = controls_text(7, 0.1);
        assert!(text.contains("[h/l] scrub -/+7s"));
        assert!(text.contains("[+/-] volume 10%"));
        assert!(text.starts_with("[tab] switch focus"));
        assert!(text.ends_with("[q] quit"));
    }

    #[test]
    fn bar_text_fills_proportionally() {
        assert_eq!(bar_text(0.5, 4, '#', '.'), "##..");
        assert_eq!(bar_text(2.0, 3, '#', '.'), "###");
        assert_eq!(bar_text(-1.0, 3, '#', '.'), "...");
    }

    #[test]
    fn hit_map_reports_entry_and_fraction() {
        let mut hits = HitMap::default();
        hits.push(0, Rect::new(10, 5, 20, 1));
        hits.push(1, Rect::new(10, 9, 20, 1));

        assert_eq!(hits.bar_at(10, 5), Some((0, 0.0)));
        assert_eq!(hits.bar_at(20, 9), Some((1, 0.5)));
        assert_eq!(hits.bar_at(30, 9), None);
        assert_eq!(hits.bar_at(15, 6), None);
    }

    #[test]
    fn spinner_icon_animates() {
        assert_ne!(
            icon_text(TransportIcon::Spinner, 0),
            icon_text(TransportIcon::Spinner, 1)
        );
        assert_eq!(icon_text(TransportIcon::Error, 3), "!");
    }
}
