//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the voting screen using `ratatui`:
//! a header, the tally summary, one card per track and a blocking alert popup.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::App;
use crate::config::{ControlsSettings, UiSettings};
use crate::library::Track;
use crate::playback::{TrackController, TransportState};

/// Rows taken by one track card, borders included.
const CARD_HEIGHT: u16 = 4;

const INSTRUCTIONS: &str = "Listen to each track, then vote for your favourite. \
You can vote as many times as you like.";

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "select track".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("v".to_string(), "vote".to_string());
    map.insert("0-9".to_string(), "seek to 0-90%".to_string());
    map.insert("r".to_string(), "refresh votes".to_string());
    map.insert("q".to_string(), "quit".to_string());
    // h/l is filled dynamically from config.
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_step_percent: u8) -> String {
    let order = ["j/k", "space/p", "v", "h/l", "0-9", "r", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "h/l" {
                Some(format!("[h/l] seek -/+{}%", seek_step_percent))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `M:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn votes_label(count: u64) -> String {
    if count == 1 {
        "1 vote".to_string()
    } else {
        format!("{} votes", count)
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

/// First and one-past-last card index that fit in `rows`, keeping `selected` visible.
fn visible_window(total: usize, selected: usize, rows: usize) -> (usize, usize) {
    if total <= rows || rows == 0 {
        return (0, total);
    }
    let start = selected.saturating_sub(rows - 1);
    (start, start + rows)
}

fn summary_line(app: &App) -> Line<'static> {
    let mut spans = vec![
        Span::raw(format!("Total votes: {}", app.tally.total())).bold(),
        Span::raw(" • "),
        Span::raw(format!(
            "Last updated {}",
            app.tally.last_refresh().format("%H:%M:%S")
        )),
        Span::raw(" • "),
    ];
    if app.tally.is_busy() {
        spans.push(Span::raw("Refreshing...").italic());
    } else {
        spans.push(Span::raw("[r] refresh"));
    }
    Line::from(spans)
}

fn transport_glyph(c: Option<&TrackController>) -> &'static str {
    match c.map(TrackController::state) {
        None | Some(TransportState::Unloaded) => "✕",
        Some(TransportState::Playing) => "⏸",
        Some(_) => "▶",
    }
}

fn time_text(c: Option<&TrackController>) -> String {
    match c.and_then(|c| c.duration().map(|d| (c.elapsed(), d))) {
        Some((elapsed, total)) => format!("{} / {}", format_mmss(elapsed), format_mmss(total)),
        None => "unavailable".to_string(),
    }
}

fn draw_card(frame: &mut Frame, area: Rect, app: &App, track: &Track, selected: bool) {
    let controller = app.controller(track.ordinal);
    let border_style = if selected {
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow)
    } else {
        Style::default()
    };

    let badge = format!(" {} ", votes_label(app.tally.count(track.ordinal)));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", track.title))
        .title_bottom(Line::from(badge).right_aligned())
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let status = Line::from(vec![
        Span::raw(format!("{} ", transport_glyph(controller))).bold(),
        Span::raw(time_text(controller)),
    ]);
    frame.render_widget(Paragraph::new(status), rows[0]);

    let ratio = controller.map_or(0.0, TrackController::progress);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio)
        .label(format!("{:.0}%", ratio * 100.0));
    frame.render_widget(gauge, rows[1]);
}

fn draw_alert(frame: &mut Frame, message: &str) {
    let popup_area = centered_rect_sized(60, 7, frame.area());
    frame.render_widget(Clear, popup_area);

    let text = format!("{}\n\n[enter/esc] dismiss", message);
    let alert = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" error "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(alert, popup_area);
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.subtitle.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(ui_settings.header_text.as_str())
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let summary = Paragraph::new(summary_line(app)).block(
        Block::bordered()
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            })
            .title(" votes "),
    );
    frame.render_widget(summary, chunks[1]);

    let instructions = Paragraph::new(INSTRUCTIONS)
        .wrap(Wrap { trim: true })
        .block(Block::bordered().title(" how it works "));
    frame.render_widget(instructions, chunks[2]);

    // Track cards
    let list_area = chunks[3];
    if app.has_tracks() {
        let fit = (list_area.height / CARD_HEIGHT) as usize;
        let (start, end) = visible_window(app.tracks.len(), app.selected, fit);
        let constraints = vec![Constraint::Length(CARD_HEIGHT); end - start];
        let slots = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(list_area);

        for (slot, i) in slots.iter().zip(start..end) {
            draw_card(frame, *slot, app, &app.tracks[i], i == app.selected);
        }
    } else {
        let empty = Paragraph::new("No tracks to vote on.")
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" tracks "));
        frame.render_widget(empty, list_area);
    }

    let footer_text = format!(
        "{}\n{}",
        ui_settings.footer_text,
        controls_text(controls_settings.seek_step_percent)
    );
    let footer = Paragraph::new(footer_text)
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

    if let Some(message) = app.alert.as_deref() {
        draw_alert(frame, message);
    }
}
