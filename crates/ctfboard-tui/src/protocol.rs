// Message types passed between the app orchestrator and the TUI.

use std::sync::Arc;

use ctfboard_core::poller::BoardView;

/// Updates pushed from the app orchestrator to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// The poller published a new view.
    Board(Arc<BoardView>),
    /// The local proxy changed state.
    ProxyStatus(ProxyStatus),
}

/// State of the local HTTP proxy, shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProxyStatus {
    #[default]
    Disabled,
    Listening {
        port: u16,
    },
    Failed {
        message: String,
    },
}

/// Commands sent from the TUI to the app orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// Run an extra poll cycle now.
    Refresh,
    Quit,
}
