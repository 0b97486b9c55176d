// Podium widget: the top three teams, second / first / third left to right.
//
// Each slot shows the team name, score, and solves. Places without a team
// render a dim placeholder so the podium keeps its shape.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use ctfboard_core::model::Team;
use ctfboard_core::ranking::{display_name, podium_slots};

use crate::tui::ViewState;

/// Podium indices (0 = first place) for the left, center, and right areas.
pub const DISPLAY_ORDER: [usize; 3] = [1, 0, 2];

/// Render the podium into the three slot areas.
pub fn render(frame: &mut Frame, areas: [Rect; 3], state: &ViewState) {
    let slots = podium_slots(&state.board.snapshot.top);

    for (area, index) in areas.into_iter().zip(DISPLAY_ORDER) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" #{} ", index + 1))
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(medal_color(index)));

        let lines = match slots[index] {
            Some(team) => team_lines(team),
            None => placeholder_lines(),
        };

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
    }
}

/// Border color for a podium index: gold, silver, bronze.
pub fn medal_color(index: usize) -> Color {
    match index {
        0 => Color::Yellow,
        1 => Color::Gray,
        _ => Color::Rgb(205, 127, 50),
    }
}

fn team_lines(team: &Team) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            display_name(&team.name).to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} pts", team.score),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            format_solves(team.solves),
            Style::default().fg(Color::Gray),
        )),
    ]
}

fn placeholder_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            "Awaiting team",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM),
        )),
    ]
}

pub fn format_solves(solves: u64) -> String {
    match solves {
        1 => "1 solve".to_string(),
        n => format!("{} solves", n),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
