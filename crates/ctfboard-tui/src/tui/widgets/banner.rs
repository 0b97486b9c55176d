// Error banner widget: shown while the most recent poll cycle failed.
//
// The layout gives this widget a zero-height area when there is no error,
// so rendering then is a no-op.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the error banner into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(message) = state.board.error.as_deref() else {
        return;
    };

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(
            " ERROR: ",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(message.to_string(), Style::default().fg(Color::White)),
    ]))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Poll failed")
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
