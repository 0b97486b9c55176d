// Fixed-interval poll loop that keeps a `BoardView` current.
//
// The timer task fires a cycle immediately, then once per interval. Each
// cycle runs as its own task, so a slow cycle never delays the timer and
// nothing stops two cycles from overlapping. Finished cycles replace the
// published view wholesale; readers holding the previous `Arc<BoardView>`
// keep a complete, consistent copy.
//
// The timer is owned by `PollHandle`. Dropping the handle (or calling
// `stop`) aborts the timer; cycles already in flight still finish.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::board::{fetch_board, BoardSnapshot};
use crate::source::ScoreSource;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Published view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Idle,
    Fetching,
}

/// What consumers see between cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub state: PollState,
    /// Completed cycles, successful or not.
    pub cycles: u64,
    /// Cycles started but not yet finished.
    pub in_flight: usize,
    /// Last successful snapshot. Kept across failed cycles.
    pub snapshot: BoardSnapshot,
    /// Set when the most recent cycle could not rank teams.
    pub error: Option<String>,
}

impl Default for BoardView {
    fn default() -> Self {
        BoardView {
            state: PollState::Idle,
            cycles: 0,
            in_flight: 0,
            snapshot: BoardSnapshot::default(),
            error: None,
        }
    }
}

impl BoardView {
    fn started(&self) -> Self {
        BoardView {
            state: PollState::Fetching,
            in_flight: self.in_flight + 1,
            ..self.clone()
        }
    }

    fn finished(&self, outcome: Result<BoardSnapshot, String>) -> Self {
        let in_flight = self.in_flight.saturating_sub(1);
        let state = if in_flight == 0 {
            PollState::Idle
        } else {
            PollState::Fetching
        };
        let (snapshot, error) = match outcome {
            Ok(snapshot) => (snapshot, None),
            Err(message) => (self.snapshot.clone(), Some(message)),
        };
        BoardView {
            state,
            cycles: self.cycles + 1,
            in_flight,
            snapshot,
            error,
        }
    }
}

// ---------------------------------------------------------------------------
// PollHandle
// ---------------------------------------------------------------------------

/// Owns the poll timer. Dropping it stops polling.
pub struct PollHandle {
    views: watch::Receiver<Arc<BoardView>>,
    refresh_tx: mpsc::Sender<()>,
    timer: JoinHandle<()>,
}

impl PollHandle {
    /// Receiver that wakes whenever the view is replaced.
    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardView>> {
        self.views.clone()
    }

    /// The currently published view.
    pub fn current(&self) -> Arc<BoardView> {
        self.views.borrow().clone()
    }

    /// Ask for an extra cycle now. Does not move the regular schedule.
    pub fn refresh(&self) {
        if self.refresh_tx.try_send(()).is_err() {
            debug!("refresh already pending");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.timer.is_finished()
    }

    /// Stop the timer. Equivalent to dropping the handle.
    pub fn stop(self) {}
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Start polling `source` every `interval`, beginning immediately.
pub fn spawn<S>(source: Arc<S>, interval: Duration) -> PollHandle
where
    S: ScoreSource + ?Sized + 'static,
{
    let (views_tx, views_rx) = watch::channel(Arc::new(BoardView::default()));
    let views_tx = Arc::new(views_tx);
    let (refresh_tx, mut refresh_rx) = mpsc::channel::<()>(1);

    let timer = tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "poller started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut refresh_open = true;

        loop {
            tokio::select! {
                // The first tick completes immediately: the activation cycle.
                _ = ticker.tick() => {}
                request = refresh_rx.recv(), if refresh_open => {
                    if request.is_none() {
                        refresh_open = false;
                        continue;
                    }
                    debug!("manual refresh");
                }
            }
            tokio::spawn(run_cycle(source.clone(), views_tx.clone()));
        }
    });

    PollHandle {
        views: views_rx,
        refresh_tx,
        timer,
    }
}

async fn run_cycle<S>(source: Arc<S>, views: Arc<watch::Sender<Arc<BoardView>>>)
where
    S: ScoreSource + ?Sized,
{
    views.send_modify(|view| *view = Arc::new(view.started()));

    let outcome = fetch_board(source.as_ref()).await.map_err(|e| e.to_string());
    match &outcome {
        Ok(snapshot) => debug!(
            top = snapshot.top.len(),
            mid = snapshot.mid.len(),
            challenges = snapshot.challenges.len(),
            awards = snapshot.awards.len(),
            "poll cycle complete"
        ),
        Err(message) => warn!(error = %message, "poll cycle failed"),
    }

    views.send_modify(|view| *view = Arc::new(view.finished(outcome)));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
