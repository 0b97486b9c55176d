// Local HTTP proxy in front of the scoring platform.
//
// `GET /api/ctfd?endpoint=/users` forwards one request upstream with the
// configured credentials and relays the answer, so browser dashboards on the
// same host can read the platform without holding the session themselves.
// `GET /api/leaderboard` serves the poller's latest view as JSON.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use ctfboard_core::endpoint::{Endpoint, EndpointError};
use ctfboard_core::poller::BoardView;
use ctfboard_core::source::HttpSource;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

/// Path forwarded when the request names none or leaves it blank.
const DEFAULT_ENDPOINT: &str = "/users";

// ---------------------------------------------------------------------------
// State & errors
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ProxyState {
    /// Always a direct route; the proxy never forwards to itself.
    pub upstream: Arc<HttpSource>,
    pub views: watch::Receiver<Arc<BoardView>>,
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    BadEndpoint(#[from] EndpointError),

    #[error("Failed to fetch data from CTFd API")]
    Upstream,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::BadEndpoint(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CtfdQuery {
    endpoint: Option<String>,
}

async fn ctfd_handler(
    State(state): State<ProxyState>,
    Query(query): Query<CtfdQuery>,
) -> Result<Response, ProxyError> {
    let endpoint: Endpoint = query
        .endpoint
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or(DEFAULT_ENDPOINT)
        .parse()?;
    debug!(%endpoint, "proxying request");

    let upstream = state.upstream.relay(endpoint).await.map_err(|e| {
        warn!(%endpoint, error = %e, "proxy upstream unreachable");
        ProxyError::Upstream
    })?;

    if !upstream.is_success() {
        let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let body = json!({ "success": false, "error": upstream.status_message() });
        return Ok((status, Json(body)).into_response());
    }

    match upstream.body {
        Some(body) => Ok(Json(body).into_response()),
        None => {
            warn!(%endpoint, "proxy upstream returned a non-JSON body");
            Err(ProxyError::Upstream)
        }
    }
}

async fn leaderboard_handler(State(state): State<ProxyState>) -> Json<BoardView> {
    let view = state.views.borrow().clone();
    Json(BoardView::clone(&view))
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub fn router(state: ProxyState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/ctfd", get(ctfd_handler))
        .route("/api/leaderboard", get(leaderboard_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind the proxy's loopback listener. Connections made once this returns
/// queue until `serve` starts accepting them.
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(("127.0.0.1", port)).await
}

/// Serve the proxy on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: ProxyState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Proxy listening on {addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Proxy shut down");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
