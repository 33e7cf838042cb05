//! WebSocket layer: notification channel, frames, listener registry.
//!
//! The socket at `<host>/notifications` pushes server events. The first
//! client frame authenticates the connection; every inbound frame after
//! that is dispatched to the listeners registered for its `type`.

pub mod channel;
pub mod connection;
pub mod listener_id;
pub mod messages;
pub mod subscription;

pub use channel::{ChannelState, NOTIFICATIONS_PATH, NotificationChannel, notifications_url};
pub use listener_id::{ListenerHandle, ListenerId};
pub use messages::{
    AuthFrame, DONATION_RECEIVED, IMPACT_VERIFIED, MILESTONE_COMPLETED, NotificationEvent,
};
pub use subscription::{Listener, ListenerRegistry};
