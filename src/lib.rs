//! # givehub-client
//!
//! Async Rust client for the GiveHub campaign crowdfunding API.
//!
//! Endpoint methods are thin wrappers; the two stateful pieces are the
//! request dispatcher, which injects credentials and recovers from an
//! expired access token with one refresh and one retry, and the
//! notification channel, which keeps one authenticated WebSocket open and
//! fans server events out to listeners by type.
//!
//! ## Architecture
//!
//! ```text
//! GiveHubClient
//!     │
//!     ├── Endpoint modules (api/)
//!     │       │
//!     │       └── RequestDispatcher (dispatch/) ──► HTTPS  /<version>/...
//!     │
//!     ├── NotificationChannel (ws/) ─────────────► WSS    /notifications
//!     │       └── ListenerRegistry
//!     │
//!     └── Session (tokens, shared by Arc)
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod ws;

pub use client::GiveHubClient;
pub use config::ClientConfig;
pub use dispatch::{MediaUpload, Method, RequestDispatcher, RequestSpec};
pub use error::ClientError;
pub use session::Session;
pub use ws::{ChannelState, ListenerHandle, NotificationChannel, NotificationEvent};
