// Standings widget: teams ranked 4 through 13.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use ctfboard_core::ranking::display_name;

use crate::tui::ViewState;

/// Render the standings table into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Team"),
        Cell::from("Score"),
        Cell::from("Solves"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let mid = &state.board.snapshot.mid;
    let rows: Vec<Row> = if mid.is_empty() {
        vec![Row::new(vec![
            Cell::from(""),
            Cell::from("No teams below the podium yet"),
        ])
        .style(Style::default().fg(Color::DarkGray))]
    } else {
        mid.iter()
            .map(|team| {
                Row::new(vec![
                    Cell::from(format!("{}", team.place)),
                    Cell::from(display_name(&team.name).to_string()),
                    Cell::from(format!("{}", team.score)),
                    Cell::from(format!("{}", team.solves)),
                ])
            })
            .collect()
    };

    let widths = [
        Constraint::Length(4),
        Constraint::Min(16),
        Constraint::Length(8),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Standings"),
    );
    frame.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ctfboard_core::model::Team;
    use ctfboard_core::poller::BoardView;

    fn render_to_string(state: &ViewState) -> String {
        let backend = ratatui::backend::TestBackend::new(60, 16);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), state))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn render_does_not_panic_with_empty_state() {
        let screen = render_to_string(&ViewState::default());
        assert!(screen.contains("No teams below the podium yet"));
    }

    #[test]
    fn render_lists_mid_band_with_places() {
        let mut view = BoardView::default();
        view.snapshot.mid = (4..=13)
            .map(|place| Team {
                id: place,
                name: format!("Team {place}"),
                score: 1000 - place as i64 * 10,
                solves: 1,
                place,
                members: Vec::new(),
            })
            .collect();
        let state = ViewState {
            board: Arc::new(view),
            ..ViewState::default()
        };

        let screen = render_to_string(&state);
        assert!(screen.contains("Team 4"));
        assert!(screen.contains("Team 13"));
        assert!(screen.contains("960"));
        assert!(!screen.contains("No teams below"));
    }
}
