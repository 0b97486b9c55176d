// TUI widget modules for each dashboard panel.

pub mod banner;
pub mod feed;
pub mod podium;
pub mod standings;
pub mod status_bar;
