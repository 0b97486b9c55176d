// Library root: scoring-platform access, team ranking, and the poll loop
// that keeps a leaderboard view current.

pub mod board;
pub mod endpoint;
pub mod error;
pub mod fallback;
pub mod model;
pub mod poller;
pub mod ranking;
pub mod source;
