// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the leaderboard:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Error Banner (3 rows, only while a cycle failed)  |
// +--------------------------------------------------+
// | Podium (7 rows): #2 | #1 | #3                     |
// +-------------------------+------------------------+
// | Standings (60%)          | Feed (40%)             |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

const BANNER_HEIGHT: u16 = 3;
const PODIUM_HEIGHT: u16 = 7;

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: poll state, last update, cycle count, proxy.
    pub status_bar: Rect,
    /// Error from the last cycle. Zero-height when there is none.
    pub banner: Rect,
    /// Three podium slots, left to right: second, first, third.
    pub podium: [Rect; 3],
    /// Ranks 4-13.
    pub standings: Rect,
    /// Challenge categories and recent awards.
    pub feed: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the dashboard layout from the available terminal area.
pub fn build_layout(area: Rect, show_banner: bool) -> AppLayout {
    let banner_height = if show_banner { BANNER_HEIGHT } else { 0 };

    // Vertical: status(1) | banner(0/3) | podium(7) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Length(PODIUM_HEIGHT),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);

    let podium_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(vertical[2]);

    // Horizontal: standings (60%) | feed (40%)
    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(vertical[3]);

    AppLayout {
        status_bar: vertical[0],
        banner: vertical[1],
        podium: [podium_row[0], podium_row[1], podium_row[2]],
        standings: middle[0],
        feed: middle[1],
        help_bar: vertical[4],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
