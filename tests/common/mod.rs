//! In-process mock of the GiveHub API used by the integration tests.
//!
//! Serves the HTTP routes under `/v1` and the `/notifications` WebSocket on
//! an ephemeral port, and records what the client sent.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::broadcast;

use givehub_client::{ClientConfig, GiveHubClient};

/// Frame that makes the mock server close the socket.
pub const CLOSE_SOCKET: &str = "__close__";

/// Shared state of the mock server.
#[derive(Debug)]
pub struct MockState {
    /// Bearer token `/campaigns` currently accepts.
    pub valid_token: Mutex<String>,
    /// Whether `/auth/refresh` succeeds.
    pub refresh_ok: AtomicBool,
    /// Delay before `/auth/refresh` answers.
    pub refresh_delay: Mutex<Duration>,
    /// Number of `/auth/refresh` calls.
    pub refresh_calls: AtomicUsize,
    /// Refresh tokens received by `/auth/refresh`.
    pub refresh_tokens_seen: Mutex<Vec<String>>,
    /// Number of `/campaigns` and `/protected` calls.
    pub resource_calls: AtomicUsize,
    /// `Authorization` header of each resource call.
    pub auth_headers: Mutex<Vec<Option<String>>>,
    /// `X-API-Key` header of each resource call.
    pub api_keys: Mutex<Vec<Option<String>>>,
    /// Whether `/notifications` refuses the upgrade.
    pub reject_ws: AtomicBool,
    /// Number of accepted WebSocket upgrades.
    pub ws_connections: AtomicUsize,
    /// Text frames received from clients.
    pub ws_received: Mutex<Vec<String>>,
    /// Frames pushed to every connected socket.
    pub push: broadcast::Sender<String>,
}

impl MockState {
    fn new() -> Self {
        let (push, _) = broadcast::channel(64);
        Self {
            valid_token: Mutex::new("AT1".to_string()),
            refresh_ok: AtomicBool::new(true),
            refresh_delay: Mutex::new(Duration::ZERO),
            refresh_calls: AtomicUsize::new(0),
            refresh_tokens_seen: Mutex::new(Vec::new()),
            resource_calls: AtomicUsize::new(0),
            auth_headers: Mutex::new(Vec::new()),
            api_keys: Mutex::new(Vec::new()),
            reject_ws: AtomicBool::new(false),
            ws_connections: AtomicUsize::new(0),
            ws_received: Mutex::new(Vec::new()),
            push,
        }
    }

    /// Makes every token issued so far invalid.
    pub fn expire_tokens(&self) {
        *lock(&self.valid_token) = "EXPIRED".to_string();
    }

    /// Sets the delay before `/auth/refresh` answers.
    pub fn set_refresh_delay(&self, delay: Duration) {
        *lock(&self.refresh_delay) = delay;
    }

    /// Sends `frame` to every connected socket.
    pub fn push_frame(&self, frame: &str) {
        let _ = self.push.send(frame.to_string());
    }

    /// Number of `/auth/refresh` calls so far.
    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Number of resource calls so far.
    pub fn resource_count(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }

    /// `Authorization` headers seen on resource calls.
    pub fn auth_header_log(&self) -> Vec<Option<String>> {
        lock(&self.auth_headers).clone()
    }

    /// Text frames received over WebSocket.
    pub fn ws_frames(&self) -> Vec<String> {
        lock(&self.ws_received).clone()
    }
}

/// Locks a mutex, ignoring poisoning.
pub fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Running mock server.
#[derive(Debug)]
pub struct MockServer {
    /// Bound address.
    pub addr: SocketAddr,
    /// Shared state.
    pub state: Arc<MockState>,
}

impl MockServer {
    /// Base URL of the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A logged-out client pointing at this server.
    pub fn client(&self) -> GiveHubClient {
        let config = ClientConfig::new("test-key").with_base_url(self.base_url());
        match GiveHubClient::new(config) {
            Ok(client) => client,
            Err(e) => panic!("client should build: {e}"),
        }
    }

    /// A client logged in as AT1 / RT1.
    pub async fn logged_in_client(&self) -> GiveHubClient {
        let client = self.client();
        if let Err(e) = client.auth().login("a@b.com", "pw").await {
            panic!("login should succeed: {e}");
        }
        client
    }
}

/// Starts the mock server on an ephemeral port.
pub async fn start() -> MockServer {
    let state = Arc::new(MockState::new());
    let app = Router::new()
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/refresh", post(refresh))
        .route("/v1/campaigns", get(campaigns))
        .route("/v1/campaigns/missing", get(missing))
        .route("/v1/campaigns/{id}/media", post(media))
        .route("/v1/protected", get(always_unauthorized))
        .route("/v1/notifications", get(notification_history))
        .route("/notifications", get(ws_upgrade))
        .with_state(Arc::clone(&state));

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(e) => panic!("bind failed: {e}"),
    };
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(e) => panic!("local_addr failed: {e}"),
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockServer { addr, state }
}

/// Polls `condition` until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Runs `fut` with a five second ceiling.
pub async fn within<T>(fut: impl Future<Output = T>) -> T {
    match tokio::time::timeout(Duration::from_secs(5), fut).await {
        Ok(value) => value,
        Err(_) => panic!("operation timed out"),
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

fn record_resource_call(state: &MockState, headers: &HeaderMap) {
    state.resource_calls.fetch_add(1, Ordering::SeqCst);
    lock(&state.auth_headers).push(header(headers, "authorization"));
    lock(&state.api_keys).push(header(headers, "x-api-key"));
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");
    match password {
        "pw" => Json(json!({
            "success": true,
            "tokens": { "accessToken": "AT1", "refreshToken": "RT1" },
            "user": { "username": "ada" }
        })),
        "partial" => Json(json!({
            "success": true,
            "tokens": { "accessToken": "AT1" }
        })),
        _ => Json(json!({ "success": false, "message": "invalid credentials" })),
    }
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> impl IntoResponse {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let token = body
        .get("refreshToken")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    lock(&state.refresh_tokens_seen).push(token);

    let delay = *lock(&state.refresh_delay);
    tokio::time::sleep(delay).await;

    if state.refresh_ok.load(Ordering::SeqCst) {
        *lock(&state.valid_token) = "AT2".to_string();
        (
            StatusCode::OK,
            Json(json!({ "success": true, "accessToken": "AT2" })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "invalid refresh token" })),
        )
    }
}

async fn campaigns(State(state): State<Arc<MockState>>, headers: HeaderMap) -> impl IntoResponse {
    record_resource_call(&state, &headers);
    let expected = format!("Bearer {}", lock(&state.valid_token));
    if header(&headers, "authorization").as_deref() == Some(expected.as_str()) {
        (
            StatusCode::OK,
            Json(json!({ "data": [{ "id": "c1", "title": "Clean Water Project" }] })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "token expired" })),
        )
    }
}

async fn missing() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Campaign not found" })),
    )
}

async fn always_unauthorized(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    record_resource_call(&state, &headers);
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "forbidden resource" })),
    )
}

async fn media(Path(id): Path<String>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    Json(json!({
        "campaignId": id,
        "contentType": header(&headers, "content-type"),
        "apiKey": header(&headers, "x-api-key"),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn notification_history() -> impl IntoResponse {
    Json(json!({ "data": [] }))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<MockState>>) -> Response {
    if state.reject_ws.load(Ordering::SeqCst) {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    state.ws_connections.fetch_add(1, Ordering::SeqCst);
    let push_rx = state.push.subscribe();
    ws.on_upgrade(move |socket| serve_socket(socket, state, push_rx))
}

async fn serve_socket(
    socket: WebSocket,
    state: Arc<MockState>,
    mut push_rx: broadcast::Receiver<String>,
) {
    let (mut tx, mut rx) = socket.split();
    loop {
        tokio::select! {
            msg = rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    lock(&state.ws_received).push(text.as_str().to_string());
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
            frame = push_rx.recv() => match frame {
                Ok(frame) if frame == CLOSE_SOCKET => {
                    let _ = tx.send(Message::Close(None)).await;
                    break;
                }
                Ok(frame) => {
                    if tx.send(Message::text(frame)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}
