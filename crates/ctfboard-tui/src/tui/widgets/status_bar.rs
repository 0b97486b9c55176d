// Status bar widget: poll state, last update time, cycle count, proxy.

use chrono::{DateTime, Local, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use ctfboard_core::poller::{BoardView, PollState};

use crate::protocol::ProxyStatus;
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [state dot] [state label] | [last update] | [cycle] | [proxy]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let board = &state.board;
    let separator = || Span::styled(" | ", Style::default().fg(Color::Gray));

    let (dot, dot_color) = poll_indicator(board);
    let spans = vec![
        Span::styled(format!(" {} ", dot), Style::default().fg(dot_color)),
        Span::styled(
            state_label(board.state),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled(
            format_last_update(board.snapshot.fetched_at),
            Style::default().fg(Color::White),
        ),
        separator(),
        Span::styled(
            format!("Cycle {}", board.cycles),
            Style::default().fg(Color::White),
        ),
        separator(),
        Span::styled(
            proxy_label(&state.proxy_status),
            Style::default().fg(proxy_color(&state.proxy_status)),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Dot and color for the poller: red after a failed cycle, yellow while
/// fetching, green otherwise.
pub fn poll_indicator(board: &BoardView) -> (&'static str, Color) {
    if board.error.is_some() {
        ("●", Color::Red)
    } else if board.state == PollState::Fetching {
        ("●", Color::Yellow)
    } else {
        ("●", Color::Green)
    }
}

pub fn state_label(state: PollState) -> &'static str {
    match state {
        PollState::Idle => "Live",
        PollState::Fetching => "Updating",
    }
}

/// Local wall-clock time of the last successful cycle.
pub fn format_last_update(fetched_at: Option<DateTime<Utc>>) -> String {
    match fetched_at {
        Some(at) => format!("Updated {}", at.with_timezone(&Local).format("%H:%M:%S")),
        None => "Waiting for first update".to_string(),
    }
}

pub fn proxy_label(status: &ProxyStatus) -> String {
    match status {
        ProxyStatus::Disabled => "Proxy off".to_string(),
        ProxyStatus::Listening { port } => format!("Proxy :{}", port),
        ProxyStatus::Failed { message } => format!("Proxy failed: {}", message),
    }
}

fn proxy_color(status: &ProxyStatus) -> Color {
    match status {
        ProxyStatus::Disabled => Color::DarkGray,
        ProxyStatus::Listening { .. } => Color::Green,
        ProxyStatus::Failed { .. } => Color::Red,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
