// Application orchestrator.
//
// Sits between the poller and the TUI: every view the poller publishes is
// forwarded as a `UiUpdate`, and user commands from the TUI are turned into
// poller actions.

use tokio::sync::mpsc;
use tracing::{info, warn};

use ctfboard_core::poller::PollHandle;

use crate::protocol::{ProxyStatus, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Everything the event loop owns. Dropping it stops the poller.
pub struct AppState {
    pub poller: PollHandle,
    /// Proxy status at startup. Later changes are sent by whoever runs the
    /// proxy task.
    pub proxy_status: ProxyStatus,
}

impl AppState {
    pub fn new(poller: PollHandle, proxy_status: ProxyStatus) -> Self {
        AppState {
            poller,
            proxy_status,
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two sources using `tokio::select!`:
/// 1. View changes published by the poller
/// 2. User commands from the TUI
///
/// Exits on `UserCommand::Quit`, when the command channel closes, or when the
/// TUI stops receiving updates. The poller is stopped on exit.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    let mut views = state.poller.subscribe();
    // Once the poller stops publishing, stop polling its channel so
    // tokio::select! never spins on a closed receiver.
    let mut views_open = true;

    // Seed the TUI with whatever is already known.
    let initial = views.borrow_and_update().clone();
    let _ = ui_tx
        .send(UiUpdate::ProxyStatus(state.proxy_status.clone()))
        .await;
    let _ = ui_tx.send(UiUpdate::Board(initial)).await;

    loop {
        tokio::select! {
            // --- Poller views ---
            changed = views.changed(), if views_open => {
                match changed {
                    Ok(()) => {
                        let view = views.borrow_and_update().clone();
                        if ui_tx.send(UiUpdate::Board(view)).await.is_err() {
                            info!("UI channel closed, shutting down");
                            break;
                        }
                    }
                    Err(_) => {
                        warn!("Poller stopped publishing");
                        views_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(UserCommand::Refresh) => {
                        info!("Manual refresh requested");
                        state.poller.refresh();
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.poller.stop();
    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
