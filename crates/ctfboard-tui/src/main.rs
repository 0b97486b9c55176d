// ctfboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the score source (live HTTP, optionally with placeholder fallback)
// 4. Bind the local proxy listener
// 5. Start the poller, then serve the proxy
// 6. Create mpsc channels and spawn the app logic task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use ctfboard_core::fallback::FallbackSource;
use ctfboard_core::poller;
use ctfboard_core::source::{HttpSource, Route, ScoreSource};
use ctfboard_tui::app;
use ctfboard_tui::config::{self, Config};
use ctfboard_tui::protocol::{ProxyStatus, UiUpdate};
use ctfboard_tui::proxy;
use ctfboard_tui::tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("ctfboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: base_url={}, route={:?}, auth={:?}, every {}s",
        config.ctfd.base_url, config.ctfd.route, config.ctfd.auth, config.poll.interval_secs
    );

    // 3. Build the score source
    let live = http_source(&config, config.route())?;
    let source: Arc<dyn ScoreSource> = if config.poll.fallback {
        info!("Placeholder fallback enabled");
        Arc::new(FallbackSource::new(live))
    } else {
        Arc::new(live)
    };

    // 4. Bind the local proxy listener; must precede the poller
    let listener = if config.proxy.enabled {
        let port = config.proxy.port;
        match proxy::bind(port).await {
            Ok(listener) => Ok(Some(listener)),
            Err(e) => {
                error!("Failed to bind proxy on port {}: {}", port, e);
                Err(ProxyStatus::Failed {
                    message: e.to_string(),
                })
            }
        }
    } else {
        info!("Proxy disabled");
        Ok(None)
    };

    // 5. Start the poller (first cycle runs immediately), then serve the proxy
    let poll_handle = poller::spawn(source, config.poll_interval());

    let (ui_tx, ui_rx) = mpsc::channel::<UiUpdate>(64);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let (proxy_status, proxy_handle) = match listener {
        Ok(Some(listener)) => {
            let state = proxy::ProxyState {
                upstream: Arc::new(http_source(&config, config.direct_route())?),
                views: poll_handle.subscribe(),
            };
            let status_tx = ui_tx.downgrade();
            let handle = tokio::spawn(async move {
                let shutdown = async move {
                    let _ = shutdown_rx.await;
                };
                if let Err(e) = proxy::serve(listener, state, shutdown).await {
                    error!("Proxy server error: {}", e);
                    if let Some(tx) = status_tx.upgrade() {
                        let status = ProxyStatus::Failed {
                            message: e.to_string(),
                        };
                        let _ = tx.send(UiUpdate::ProxyStatus(status)).await;
                    }
                }
            });
            let port = config.proxy.port;
            (ProxyStatus::Listening { port }, Some(handle))
        }
        Ok(None) => (ProxyStatus::Disabled, None),
        Err(status) => (status, None),
    };

    // 6. Spawn app logic task
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let app_state = app::AppState::new(poll_handle, proxy_status);
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. Run the TUI event loop (blocking until user quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {:#}", e);
    }

    // 8. Cleanup: wait for the app task, then stop the proxy
    let _ = tokio::time::timeout(Duration::from_secs(5), app_handle).await;

    let _ = shutdown_tx.send(());
    if let Some(handle) = proxy_handle {
        if tokio::time::timeout(Duration::from_secs(5), handle).await.is_err() {
            error!("Proxy did not shut down in time");
        }
    }

    info!("ctfboard shut down cleanly");
    Ok(())
}

/// HTTP source for `route` with the configured credentials and timeout.
fn http_source(config: &Config, route: Route) -> anyhow::Result<HttpSource> {
    match config.request_timeout() {
        Some(timeout) => HttpSource::with_timeout(route, config.auth(), timeout)
            .context("failed to build HTTP client"),
        None => Ok(HttpSource::new(route, config.auth())),
    }
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("ctfboard.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ctfboard=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
