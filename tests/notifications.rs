//! Notification channel against the mock socket: auth handshake, typed
//! dispatch, listener removal and lifecycle.

#![allow(clippy::panic)]

mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use givehub_client::ws::DONATION_RECEIVED;
use givehub_client::{ChannelState, ClientError, NotificationEvent};
use serde_json::Value;
use tokio_test::assert_ok;

use common::{CLOSE_SOCKET, MockServer, lock, wait_until, within};

const WAIT: Duration = Duration::from_secs(3);

fn recorder() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Waits until the server saw the auth frame of the current connection.
async fn wait_for_handshake(server: &MockServer, frames: usize) {
    let state = Arc::clone(&server.state);
    assert!(
        wait_until(WAIT, || state.ws_frames().len() >= frames).await,
        "auth frame never reached the server"
    );
}

#[tokio::test]
async fn connect_sends_auth_frame_with_access_token() {
    let server = common::start().await;
    let client = server.logged_in_client().await;

    assert_ok!(within(client.notifications().connect()).await);
    assert_eq!(client.notifications().state(), ChannelState::Open);
    wait_for_handshake(&server, 1).await;

    let frames = server.state.ws_frames();
    let Some(first) = frames.first() else {
        panic!("no frame received");
    };
    let Ok(auth) = serde_json::from_str::<Value>(first) else {
        panic!("auth frame should be json");
    };
    assert_eq!(auth["type"], "auth");
    assert_eq!(auth["token"], "AT1");

    client.notifications().disconnect().await;
}

#[tokio::test]
async fn connect_without_login_requires_auth() {
    let server = common::start().await;
    let client = server.client();

    let result = within(client.notifications().connect()).await;
    assert_eq!(result, Err(ClientError::AuthRequired));
    assert_eq!(client.notifications().state(), ChannelState::Disconnected);
    assert_eq!(server.state.ws_connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn connect_after_logout_requires_auth() {
    let server = common::start().await;
    let client = server.logged_in_client().await;
    client.auth().logout();

    let result = within(client.notifications().connect()).await;
    assert_eq!(result, Err(ClientError::AuthRequired));
    assert_eq!(server.state.ws_connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn listeners_fire_in_registration_order_until_removed() {
    let server = common::start().await;
    let client = server.logged_in_client().await;
    let notifications = client.notifications();

    let seen = recorder();
    let (first_log, second_log) = (Arc::clone(&seen), Arc::clone(&seen));
    let first = notifications.on(DONATION_RECEIVED, move |event: &NotificationEvent| {
        let amount = event.get("amount").map(ToString::to_string).unwrap_or_default();
        lock(&first_log).push(format!("first:{amount}"));
    });
    let _second = notifications.on(DONATION_RECEIVED, move |event: &NotificationEvent| {
        let amount = event.get("amount").map(ToString::to_string).unwrap_or_default();
        lock(&second_log).push(format!("second:{amount}"));
    });

    assert_ok!(within(notifications.connect()).await);
    wait_for_handshake(&server, 1).await;

    server
        .state
        .push_frame(r#"{"type":"donation_received","amount":50}"#);
    let log = Arc::clone(&seen);
    assert!(wait_until(WAIT, || lock(&log).len() == 2).await);
    assert_eq!(
        lock(&seen).clone(),
        vec!["first:50".to_string(), "second:50".to_string()]
    );

    assert!(notifications.off(&first));
    assert!(!notifications.off(&first));
    server
        .state
        .push_frame(r#"{"type":"donation_received","amount":75}"#);
    let log = Arc::clone(&seen);
    assert!(wait_until(WAIT, || lock(&log).len() == 3).await);
    assert_eq!(
        lock(&seen).last().map(String::as_str),
        Some("second:75")
    );

    notifications.disconnect().await;
}

#[tokio::test]
async fn malformed_and_unmatched_frames_are_ignored() {
    let server = common::start().await;
    let client = server.logged_in_client().await;
    let notifications = client.notifications();

    let seen = recorder();
    let log = Arc::clone(&seen);
    let _handle = notifications.on(DONATION_RECEIVED, move |event: &NotificationEvent| {
        lock(&log).push(event.event_type.clone());
    });

    assert_ok!(within(notifications.connect()).await);
    wait_for_handshake(&server, 1).await;

    server.state.push_frame("not json at all");
    server.state.push_frame(r#"{"amount":10}"#);
    server
        .state
        .push_frame(r#"{"type":"milestone_completed","milestoneId":"m1"}"#);
    server.state.push_frame(r#"{"type":"donation_received"}"#);

    let log = Arc::clone(&seen);
    assert!(wait_until(WAIT, || !lock(&log).is_empty()).await);
    assert_eq!(lock(&seen).clone(), vec![DONATION_RECEIVED.to_string()]);
    assert_eq!(notifications.state(), ChannelState::Open);

    notifications.disconnect().await;
}

#[tokio::test]
async fn disconnect_is_idempotent_and_reconnect_keeps_listeners() {
    let server = common::start().await;
    let client = server.logged_in_client().await;
    let notifications = client.notifications();

    let seen = recorder();
    let log = Arc::clone(&seen);
    let _handle = notifications.on(DONATION_RECEIVED, move |_: &NotificationEvent| {
        lock(&log).push("hit".to_string());
    });

    assert_ok!(within(notifications.connect()).await);
    wait_for_handshake(&server, 1).await;
    notifications.disconnect().await;
    assert_eq!(notifications.state(), ChannelState::Closed);
    notifications.disconnect().await;
    assert_eq!(notifications.state(), ChannelState::Closed);

    assert_ok!(within(notifications.connect()).await);
    assert_eq!(notifications.state(), ChannelState::Open);
    wait_for_handshake(&server, 2).await;
    assert_eq!(server.state.ws_connections.load(Ordering::SeqCst), 2);

    server.state.push_frame(r#"{"type":"donation_received"}"#);
    let log = Arc::clone(&seen);
    assert!(wait_until(WAIT, || lock(&log).len() == 1).await);

    notifications.disconnect().await;
}

#[tokio::test]
async fn second_connect_reuses_open_socket() {
    let server = common::start().await;
    let client = server.logged_in_client().await;

    assert_ok!(within(client.notifications().connect()).await);
    assert_ok!(within(client.notifications().connect()).await);
    assert_eq!(server.state.ws_connections.load(Ordering::SeqCst), 1);

    client.notifications().disconnect().await;
}

#[tokio::test]
async fn server_close_moves_channel_to_closed() {
    let server = common::start().await;
    let client = server.logged_in_client().await;

    assert_ok!(within(client.notifications().connect()).await);
    wait_for_handshake(&server, 1).await;

    server.state.push_frame(CLOSE_SOCKET);
    let notifications = client.notifications();
    assert!(wait_until(WAIT, || notifications.state() == ChannelState::Closed).await);

    // Disconnect after a transport close is still safe.
    notifications.disconnect().await;
    assert_eq!(notifications.state(), ChannelState::Closed);
}

#[tokio::test]
async fn refused_upgrade_leaves_channel_disconnected() {
    let server = common::start().await;
    let client = server.logged_in_client().await;
    server.state.reject_ws.store(true, Ordering::SeqCst);

    let result = within(client.notifications().connect()).await;
    assert!(matches!(result, Err(ClientError::Network(_))));
    assert_eq!(client.notifications().state(), ChannelState::Disconnected);

    server.state.reject_ws.store(false, Ordering::SeqCst);
    assert_ok!(within(client.notifications().connect()).await);
    assert_eq!(client.notifications().state(), ChannelState::Open);
    client.notifications().disconnect().await;
}

#[tokio::test]
async fn panicking_listener_keeps_channel_open() {
    let server = common::start().await;
    let client = server.logged_in_client().await;
    let notifications = client.notifications();

    let _boom = notifications.on("boom", |event: &NotificationEvent| {
        if event.event_type == "boom" {
            panic!("listener failure");
        }
    });
    let seen = recorder();
    let log = Arc::clone(&seen);
    let _handle = notifications.on(DONATION_RECEIVED, move |_: &NotificationEvent| {
        lock(&log).push("hit".to_string());
    });

    assert_ok!(within(notifications.connect()).await);
    wait_for_handshake(&server, 1).await;

    server.state.push_frame(r#"{"type":"boom"}"#);
    server.state.push_frame(r#"{"type":"donation_received"}"#);
    let log = Arc::clone(&seen);
    assert!(wait_until(WAIT, || lock(&log).len() == 1).await);
    assert_eq!(notifications.state(), ChannelState::Open);

    notifications.disconnect().await;
    assert_eq!(notifications.state(), ChannelState::Closed);
}
