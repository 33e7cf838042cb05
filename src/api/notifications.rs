//! Notification history endpoint and access to the live channel.

use serde_json::Value;

use super::dto::QueryParams;
use super::send;
use crate::dispatch::{RequestDispatcher, RequestSpec};
use crate::error::ClientError;
use crate::ws::{ChannelState, ListenerHandle, NotificationChannel, NotificationEvent};

/// `/notifications` endpoints plus the real-time channel.
#[derive(Debug, Clone, Copy)]
pub struct NotificationsApi<'a> {
    dispatcher: &'a RequestDispatcher,
    channel: &'a NotificationChannel,
}

impl<'a> NotificationsApi<'a> {
    /// Wraps `dispatcher` and `channel`.
    #[must_use]
    pub const fn new(dispatcher: &'a RequestDispatcher, channel: &'a NotificationChannel) -> Self {
        Self {
            dispatcher,
            channel,
        }
    }

    /// `GET /notifications`: past notifications of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] without a network call when
    /// logged out, and any other dispatcher error.
    pub async fn list(&self, params: QueryParams<'_>) -> Result<Value, ClientError> {
        let spec = RequestSpec::get("/notifications")
            .with_query(params.iter().copied())
            .require_auth();
        send(self.dispatcher, spec).await
    }

    /// Opens the live channel. See [`NotificationChannel::connect`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] when logged out, or the
    /// connect failure.
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.channel.connect().await
    }

    /// Closes the live channel. Idempotent.
    pub async fn disconnect(&self) {
        self.channel.disconnect().await;
    }

    /// Registers `callback` for `event_type`.
    pub fn on<F>(&self, event_type: &str, callback: F) -> ListenerHandle
    where
        F: Fn(&NotificationEvent) + Send + Sync + 'static,
    {
        self.channel.on(event_type, callback)
    }

    /// Removes one registration.
    pub fn off(&self, handle: &ListenerHandle) -> bool {
        self.channel.off(handle)
    }

    /// Current channel state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.channel.state()
    }
}
