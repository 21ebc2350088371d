//! Shared helpers: an in-process mock NLP backend and a relay bound to an ephemeral port.

#![allow(dead_code)]

use axum::{http::StatusCode, routing::post, Json, Router};
use relay::backend::{BackendRequest, BackendResponse};
use relay::config::Config;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

/// Every body the mock backend received, in order.
pub type Received = Arc<Mutex<Vec<BackendRequest>>>;

/// Mock backend routes:
/// - `/chat_api/chat` answers like the real backend (`ASK_ADMIN` for password questions).
/// - `/html` answers 200 with a non-JSON body.
/// - `/wrong-shape` answers JSON without `bot_response`.
/// - `/broken` answers 500 without `bot_response`.
/// - `/rejected` answers 422 with a `bot_response`.
/// - `/slow` answers after [`SLOW_DELAY`].
pub async fn spawn_mock_backend() -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));

    let chat_log = received.clone();
    let html_log = received.clone();
    let shape_log = received.clone();
    let broken_log = received.clone();
    let rejected_log = received.clone();
    let slow_log = received.clone();
    let app = Router::new()
        .route(
            "/chat_api/chat",
            post(move |Json(body): Json<BackendRequest>| async move {
                chat_log.lock().unwrap().push(body.clone());
                let bot_response = match body.query_text.as_deref() {
                    Some("hello") => "Hi there!".to_string(),
                    Some(q) if q.contains("password") => "ASK_ADMIN".to_string(),
                    Some(q) => format!("echo: {}", q),
                    None => "no question".to_string(),
                };
                Json(BackendResponse { bot_response })
            }),
        )
        .route(
            "/html",
            post(move |Json(body): Json<BackendRequest>| async move {
                html_log.lock().unwrap().push(body);
                "<html>oops</html>"
            }),
        )
        .route(
            "/wrong-shape",
            post(move |Json(body): Json<BackendRequest>| async move {
                shape_log.lock().unwrap().push(body);
                Json(serde_json::json!({ "answer": "hi" }))
            }),
        )
        .route(
            "/broken",
            post(move |Json(body): Json<BackendRequest>| async move {
                broken_log.lock().unwrap().push(body);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "detail": "model not loaded" })),
                )
            }),
        )
        .route(
            "/rejected",
            post(move |Json(body): Json<BackendRequest>| async move {
                rejected_log.lock().unwrap().push(body);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(BackendResponse {
                        bot_response: "Hi there!".to_string(),
                    }),
                )
            }),
        )
        .route(
            "/slow",
            post(move |Json(body): Json<BackendRequest>| async move {
                slow_log.lock().unwrap().push(body);
                tokio::time::sleep(SLOW_DELAY).await;
                Json(BackendResponse {
                    bot_response: "too late".to_string(),
                })
            }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock backend");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}", addr), received)
}

/// Start the relay forwarding to `backend_url`; returns the relay base URL.
/// The listener is bound before the task starts, so requests can be sent immediately.
pub async fn spawn_relay(backend_url: String) -> String {
    let mut config = Config::default();
    config.backend.url = backend_url;
    spawn_relay_with(config).await
}

/// Start the relay with the given config on an ephemeral loopback port; returns the relay base URL.
pub async fn spawn_relay_with(mut config: Config) -> String {
    config.server.bind = "127.0.0.1".to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind relay");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = relay::relay::serve(listener, config).await;
    });
    format!("http://{}", addr)
}

/// A URL on a port nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/chat_api/chat", port)
}
