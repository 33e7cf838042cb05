//! Notification socket dispatch loop.
//!
//! Owns the socket of one open channel, decodes inbound frames and invokes
//! matching listeners, until the transport closes or a shutdown is
//! requested.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::channel::ChannelState;
use super::messages::NotificationEvent;
use super::subscription::ListenerRegistry;

/// Client socket type produced by `tokio_tungstenite::connect_async`.
pub(crate) type NotificationSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Marks the channel closed when the read loop ends, however it ends.
struct ClosedOnExit(Arc<Mutex<ChannelState>>);

impl Drop for ClosedOnExit {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = ChannelState::Closed;
        tracing::debug!("notification socket closed");
    }
}

/// Runs the read loop for an authenticated socket.
///
/// - Dispatches every inbound event to its listeners on this task.
/// - On `shutdown`, sends a close frame and returns.
/// - On exit for any reason, including an aborted or panicked task, marks
///   the channel [`ChannelState::Closed`].
pub(crate) async fn run_connection(
    socket: NotificationSocket,
    listeners: Arc<Mutex<ListenerRegistry>>,
    state: Arc<Mutex<ChannelState>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let _closed = ClosedOnExit(state);
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            // Local disconnect
            _ = &mut shutdown => {
                if let Err(e) = ws_tx.send(Message::Close(None)).await {
                    tracing::debug!(error = %e, "close frame not delivered");
                }
                break;
            }
            // Inbound frame
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_message(text.as_str(), &listeners);
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            handle_text_message(text, &listeners);
                        }
                        Err(_) => tracing::warn!(len = bytes.len(), "dropping non-utf8 binary frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        tracing::debug!(?frame, "server closed notification socket");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed | WsError::Io(_))) | None => {
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "notification socket error");
                    }
                }
            }
        }
    }
}

/// Decodes one text frame and invokes the listeners for its type, in
/// registration order.
///
/// Returns the number of listeners invoked. Malformed frames are logged
/// and dropped. A listener that panics is logged and skipped; the rest
/// still run.
pub(crate) fn handle_text_message(text: &str, listeners: &Mutex<ListenerRegistry>) -> usize {
    let event = match NotificationEvent::parse(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "dropping malformed notification frame");
            return 0;
        }
    };

    // Snapshot so callbacks can call `on`/`off` without deadlocking.
    let targets = listeners
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .listeners_for(&event.event_type);

    tracing::debug!(event_type = %event.event_type, listeners = targets.len(), "dispatching notification");
    for listener in &targets {
        if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
            tracing::warn!(event_type = %event.event_type, "notification listener panicked");
        }
    }
    targets.len()
}
