// Library root: re-exports all modules so integration tests and the binary
// share one public API.

pub mod app;
pub mod config;
pub mod protocol;
pub mod proxy;
pub mod tui;
