// Feed widget: challenge counts per category, then the award list.

use std::collections::BTreeMap;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use ctfboard_core::model::{Award, Challenge};

use crate::tui::ViewState;

/// Render the feed panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let snapshot = &state.board.snapshot;
    let mut lines = Vec::new();

    lines.push(heading(format!("Challenges ({})", snapshot.challenges.len())));
    let counts = category_counts(&snapshot.challenges);
    if counts.is_empty() {
        lines.push(dim("  none visible"));
    }
    for (category, count) in counts {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", category), Style::default().fg(Color::White)),
            Span::styled(format!("{:>3}", count), Style::default().fg(Color::Cyan)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(heading(format!("Awards ({})", snapshot.awards.len())));
    if snapshot.awards.is_empty() {
        lines.push(dim("  none yet"));
    }
    for award in &snapshot.awards {
        lines.push(award_line(award));
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Feed"));
    frame.render_widget(paragraph, area);
}

/// Number of challenges per category, alphabetical. Blank categories are
/// counted as "uncategorized".
pub fn category_counts(challenges: &[Challenge]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for challenge in challenges {
        let category = match challenge.category.trim() {
            "" => "uncategorized",
            c => c,
        };
        *counts.entry(category).or_insert(0) += 1;
    }
    counts
}

/// "+50" / "-10" style value.
pub fn format_value(value: i64) -> String {
    format!("{:+}", value)
}

fn award_line(award: &Award) -> Line<'static> {
    let value_color = if award.value < 0 { Color::Red } else { Color::Green };
    let mut spans = vec![
        Span::styled(
            format!("  {:>5} ", format_value(award.value)),
            Style::default().fg(value_color),
        ),
        Span::styled(award.name.clone(), Style::default().fg(Color::White)),
    ];
    if let Some(description) = award.description.as_deref().filter(|d| !d.is_empty()) {
        spans.push(Span::styled(
            format!(" ({})", description),
            Style::default().fg(Color::Gray),
        ));
    }
    Line::from(spans)
}

fn heading(text: String) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

fn dim(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
