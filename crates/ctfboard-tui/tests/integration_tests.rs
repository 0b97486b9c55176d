// Integration tests for ctfboard.
//
// These wire the real pieces together through the library crate's public
// API: an HTTP source polling an in-process stand-in for the scoring
// platform, the app orchestrator forwarding views, and the local proxy
// serving both the relayed API and the leaderboard JSON.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use ctfboard_core::fallback::FallbackSource;
use ctfboard_core::poller::{self, BoardView};
use ctfboard_core::source::{Auth, HttpSource, Route, ScoreSource};
use ctfboard_tui::app::{self, AppState};
use ctfboard_tui::protocol::{ProxyStatus, UiUpdate, UserCommand};
use ctfboard_tui::proxy::{self, ProxyState};

// ===========================================================================
// Test helpers
// ===========================================================================

const TOKEN: &str = "integration-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Token {TOKEN}"))
}

fn envelope(headers: &HeaderMap, data: Value) -> (StatusCode, Json<Value>) {
    if authorized(headers) {
        (StatusCode::OK, Json(json!({"success": true, "data": data})))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Authentication required"})),
        )
    }
}

/// Fourteen users across five affiliations plus one unaffiliated user.
fn users_data() -> Value {
    let mut users = Vec::new();
    let teams = ["Alpha", "Bravo", "Charlie", "Delta", "Echo"];
    for (i, team) in teams.iter().enumerate() {
        for member in 0..2 {
            let id = (i * 2 + member + 1) as u64;
            users.push(json!({
                "id": id,
                "name": format!("{team}-{member}"),
                "affiliation": team,
                "score": 100 * (5 - i as i64) + member as i64,
                "solves": 1
            }));
        }
    }
    users.push(json!({"id": 99, "name": "solo", "affiliation": "", "score": 10000}));
    Value::Array(users)
}

async fn spawn_upstream() -> SocketAddr {
    let router = Router::new()
        .route(
            "/api/v1/scoreboard",
            get(|h: HeaderMap| async move { envelope(&h, json!([])) }),
        )
        .route(
            "/api/v1/users",
            get(|h: HeaderMap| async move { envelope(&h, users_data()) }),
        )
        .route(
            "/api/v1/challenges",
            get(|h: HeaderMap| async move {
                envelope(
                    &h,
                    json!([
                        {"id": 1, "name": "Sanity", "category": "misc", "value": 10},
                        {"id": 2, "name": "SQLi", "category": "web", "value": 200}
                    ]),
                )
            }),
        )
        .route(
            "/api/v1/awards",
            get(|| async {
                Json(json!({
                    "message": "You don't have the permission to access the requested resource."
                }))
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn live_source(upstream: SocketAddr) -> HttpSource {
    HttpSource::new(
        Route::Direct {
            base_url: format!("http://{upstream}/api/v1"),
        },
        Auth::Token(TOKEN.into()),
    )
}

async fn next_board(
    ui_rx: &mut mpsc::Receiver<UiUpdate>,
    pred: impl Fn(&BoardView) -> bool,
) -> Arc<BoardView> {
    loop {
        let update = tokio::time::timeout(Duration::from_secs(10), ui_rx.recv())
            .await
            .expect("timed out waiting for a board update")
            .expect("app loop exited early");
        if let UiUpdate::Board(view) = update {
            if pred(&view) {
                return view;
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn live_board_flows_from_upstream_to_ui() {
    let upstream = spawn_upstream().await;
    let source: Arc<dyn ScoreSource> = Arc::new(live_source(upstream));
    let handle = poller::spawn(source, Duration::from_secs(30));

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (ui_tx, mut ui_rx) = mpsc::channel(64);
    let app_task = tokio::spawn(app::run(
        cmd_rx,
        ui_tx,
        AppState::new(handle, ProxyStatus::Disabled),
    ));

    let view = next_board(&mut ui_rx, |v| v.cycles >= 1).await;
    assert!(view.error.is_none());

    let podium: Vec<(&str, i64, u64)> = view
        .snapshot
        .top
        .iter()
        .map(|t| (t.name.as_str(), t.score, t.place))
        .collect();
    assert_eq!(
        podium,
        vec![("Alpha", 1001, 1), ("Bravo", 801, 2), ("Charlie", 601, 3)]
    );
    let mid: Vec<(&str, u64)> = view
        .snapshot
        .mid
        .iter()
        .map(|t| (t.name.as_str(), t.place))
        .collect();
    assert_eq!(mid, vec![("Delta", 4), ("Echo", 5)]);
    assert_eq!(view.snapshot.challenges.len(), 2);
    // Awards need more permissions than the token has.
    assert!(view.snapshot.awards.is_empty());

    cmd_tx.send(UserCommand::Quit).await.unwrap();
    assert!(app_task.await.unwrap().is_ok());
}

#[tokio::test]
async fn wrong_credentials_fall_back_to_placeholders() {
    let upstream = spawn_upstream().await;
    let source = FallbackSource::new(HttpSource::new(
        Route::Direct {
            base_url: format!("http://{upstream}/api/v1"),
        },
        Auth::Token("wrong".into()),
    ));
    let handle = poller::spawn(Arc::new(source), Duration::from_secs(30));

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (ui_tx, mut ui_rx) = mpsc::channel(64);
    let app_task = tokio::spawn(app::run(
        cmd_rx,
        ui_tx,
        AppState::new(handle, ProxyStatus::Disabled),
    ));

    let view = next_board(&mut ui_rx, |v| v.cycles >= 1).await;
    assert!(view.error.is_none());
    assert_eq!(view.snapshot.top[0].name, "Null Pointers");
    assert_eq!(view.snapshot.challenges.len(), 4);

    drop(cmd_tx);
    assert!(app_task.await.unwrap().is_ok());
}

#[tokio::test]
async fn proxy_serves_relay_and_leaderboard() {
    let upstream = spawn_upstream().await;
    let handle = poller::spawn(Arc::new(live_source(upstream)), Duration::from_secs(30));

    let mut views = handle.subscribe();
    loop {
        if views.borrow_and_update().cycles >= 1 {
            break;
        }
        views.changed().await.unwrap();
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = ProxyState {
        upstream: Arc::new(live_source(upstream)),
        views: handle.subscribe(),
    };
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(proxy::serve(listener, state, async move {
        let _ = shutdown_rx.await;
    }));

    let relayed: Value = reqwest::get(format!("http://{addr}/api/ctfd?endpoint=/challenges"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(relayed["success"], json!(true));
    assert_eq!(relayed["data"][1]["name"], json!("SQLi"));

    let board: Value = reqwest::get(format!("http://{addr}/api/leaderboard"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(board["cycles"], json!(1));
    assert_eq!(board["snapshot"]["top"][0]["name"], json!("Alpha"));
    assert_eq!(board["snapshot"]["mid"][1]["place"], json!(5));

    shutdown_tx.send(()).unwrap();
    assert!(server.await.unwrap().is_ok());
    handle.stop();
}

#[tokio::test]
async fn poller_routed_through_proxy_sees_live_data_on_first_cycle() {
    let upstream = spawn_upstream().await;

    // Listener first, as at startup; the server task starts afterwards.
    let listener = proxy::bind(0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routed = HttpSource::new(
        Route::Proxy {
            url: format!("http://{addr}/api/ctfd"),
        },
        Auth::None,
    );
    let handle = poller::spawn(Arc::new(routed), Duration::from_secs(30));

    let state = ProxyState {
        upstream: Arc::new(live_source(upstream)),
        views: handle.subscribe(),
    };
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(proxy::serve(listener, state, async move {
        let _ = shutdown_rx.await;
    }));

    let mut views = handle.subscribe();
    let view = loop {
        {
            let view = views.borrow_and_update();
            if view.cycles >= 1 {
                break view.clone();
            }
        }
        tokio::time::timeout(Duration::from_secs(10), views.changed())
            .await
            .expect("timed out waiting for the first cycle")
            .unwrap();
    };
    assert_eq!(view.cycles, 1);
    assert!(view.error.is_none());
    assert_eq!(view.snapshot.top[0].name, "Alpha");

    handle.stop();
    shutdown_tx.send(()).unwrap();
    assert!(server.await.unwrap().is_ok());
}
