//! Notification channel: socket lifecycle and listener registration.
//!
//! [`NotificationChannel`] owns at most one socket at a time. The state
//! machine is:
//!
//! ```text
//! Disconnected ──connect()──► Connecting ──socket open──► Authenticating
//!      ▲                          │                             │ auth frame sent
//!      └──── connect failed ──────┘                             ▼
//!                                   Closed ◄──disconnect() / transport close── Open
//!                                     │
//!                                     └──connect()──► Connecting ...
//! ```
//!
//! The handshake is optimistic: the channel is `Open` as soon as the auth
//! frame is written. A server acknowledgement is just another event.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::SinkExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::connection::run_connection;
use super::listener_id::ListenerHandle;
use super::messages::{AuthFrame, NotificationEvent};
use super::subscription::ListenerRegistry;
use crate::error::ClientError;
use crate::session::Session;

/// Path of the notification socket, relative to the API host.
pub const NOTIFICATIONS_PATH: &str = "/notifications";

/// Lifecycle state of a [`NotificationChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    /// Never connected.
    #[default]
    Disconnected,
    /// Opening the socket.
    Connecting,
    /// Socket open, auth frame being sent.
    Authenticating,
    /// Dispatching inbound events.
    Open,
    /// Socket closed, locally or by the transport.
    Closed,
}

impl ChannelState {
    /// Returns `true` while a socket is owned by the channel.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Authenticating | Self::Open)
    }
}

/// Live socket owned by the channel.
#[derive(Debug)]
struct ConnectionHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Real-time notification multiplexer for one session.
///
/// Listeners can be registered at any time, connected or not; they stay
/// registered across reconnects until removed with
/// [`NotificationChannel::off`].
#[derive(Debug)]
pub struct NotificationChannel {
    session: Arc<Session>,
    state: Arc<Mutex<ChannelState>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
    connection: tokio::sync::Mutex<Option<ConnectionHandle>>,
}

impl NotificationChannel {
    /// Creates a disconnected channel reading tokens from `session`.
    #[must_use]
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            state: Arc::new(Mutex::new(ChannelState::Disconnected)),
            listeners: Arc::new(Mutex::new(ListenerRegistry::new())),
            connection: tokio::sync::Mutex::new(None),
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens the socket, sends the auth frame and starts dispatching.
    ///
    /// A no-op if a socket is already connecting or open.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthRequired`] if no access token is held; no
    ///   socket operation is attempted.
    /// - [`ClientError::Config`] if the base URL is not http(s).
    /// - [`ClientError::Network`] if the socket cannot be opened or the
    ///   auth frame cannot be sent; the channel is left `Disconnected`.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let token = self
            .session
            .access_token()
            .ok_or(ClientError::AuthRequired)?;
        let url = notifications_url(self.session.base_url())?;
        // Encoded before any state change so a failure leaves the state as is.
        let frame = auth_frame_text(token)?;

        let mut connection = self.connection.lock().await;
        if self.state().is_active() {
            tracing::debug!("notification channel already connected");
            return Ok(());
        }

        self.set_state(ChannelState::Connecting);
        let mut socket = match connect_async(url.as_str()).await {
            Ok((socket, _response)) => socket,
            Err(e) => {
                tracing::warn!(%url, error = %e, "notification socket connect failed");
                self.set_state(ChannelState::Disconnected);
                return Err(e.into());
            }
        };

        self.set_state(ChannelState::Authenticating);
        if let Err(e) = socket.send(Message::text(frame)).await {
            tracing::warn!(error = %e, "notification auth frame not delivered");
            self.set_state(ChannelState::Disconnected);
            return Err(e.into());
        }
        self.set_state(ChannelState::Open);

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_connection(
            socket,
            Arc::clone(&self.listeners),
            Arc::clone(&self.state),
            shutdown_rx,
        ));
        *connection = Some(ConnectionHandle { shutdown, task });

        tracing::info!(%url, "notification channel open");
        Ok(())
    }

    /// Closes the socket and moves to [`ChannelState::Closed`].
    ///
    /// Safe to call on a closed or never-connected channel.
    pub async fn disconnect(&self) {
        let mut connection = self.connection.lock().await;
        let Some(handle) = connection.take() else {
            tracing::debug!("disconnect on idle notification channel");
            return;
        };

        // The receiver is gone if the transport already closed.
        let _ = handle.shutdown.send(());
        if let Err(e) = handle.task.await {
            tracing::warn!(error = %e, "notification task ended abnormally");
        }
        self.set_state(ChannelState::Closed);
        tracing::info!("notification channel closed");
    }

    /// Registers `callback` for events of `event_type`.
    ///
    /// Callbacks run on the channel's dispatch task, in registration order.
    pub fn on<F>(&self, event_type: &str, callback: F) -> ListenerHandle
    where
        F: Fn(&NotificationEvent) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .register(event_type, Arc::new(callback))
    }

    /// Removes the registration behind `handle`. Other listeners for the
    /// same event type are unaffected.
    ///
    /// Returns `false` if it was already removed.
    pub fn off(&self, handle: &ListenerHandle) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unregister(handle)
    }

    /// Returns the number of listeners registered for `event_type`.
    #[must_use]
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count(event_type)
    }

    fn set_state(&self, next: ChannelState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::trace!(from = ?*state, to = ?next, "notification channel state");
        *state = next;
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        if let Some(handle) = self.connection.get_mut().take() {
            handle.task.abort();
        }
    }
}

/// Encodes the first frame of a connection.
fn auth_frame_text(token: String) -> Result<String, ClientError> {
    serde_json::to_string(&AuthFrame::new(token)).map_err(|e| ClientError::Protocol(e.to_string()))
}

/// Maps the API host to the notification socket URL
/// (`http` → `ws`, `https` → `wss`).
///
/// # Errors
///
/// Returns [`ClientError::Config`] for any other scheme.
pub fn notifications_url(base_url: &str) -> Result<String, ClientError> {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}{NOTIFICATIONS_PATH}"));
    }
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}{NOTIFICATIONS_PATH}"));
    }
    Err(ClientError::Config(format!(
        "cannot derive notification url from {base_url}"
    )))
}
