//! Notification socket frames: the auth handshake and inbound events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event type emitted when a campaign receives a donation.
pub const DONATION_RECEIVED: &str = "donation_received";

/// Event type emitted when a campaign milestone is completed.
pub const MILESTONE_COMPLETED: &str = "milestone_completed";

/// Event type emitted when impact metrics are verified.
pub const IMPACT_VERIFIED: &str = "impact_verified";

/// First client → server frame on every connection.
///
/// ```json
/// { "type": "auth", "token": "<access token>" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFrame {
    /// Always `"auth"`.
    #[serde(rename = "type")]
    pub frame_type: String,
    /// Current access token.
    pub token: String,
}

impl AuthFrame {
    /// Creates the handshake frame for `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            frame_type: "auth".to_string(),
            token: token.into(),
        }
    }
}

/// Server-pushed notification.
///
/// The wire shape is a flat JSON object with a `type` discriminator; every
/// other field lands in [`NotificationEvent::payload`].
///
/// ```json
/// { "type": "donation_received", "campaignId": "c1", "amount": 25 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Event type used as the listener registry key.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Remaining fields of the frame.
    #[serde(flatten)]
    pub payload: Map<String, Value>,

    /// Local time the frame was decoded.
    #[serde(skip, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the frame is not a JSON object with
    /// a string `type` field.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Returns the payload field `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}
