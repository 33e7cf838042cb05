//! Client error types with HTTP status mapping.
//!
//! [`ClientError`] is the single error type every public operation returns.
//! A caller of any endpoint method sees either the parsed success payload or
//! exactly one of these variants; transport errors from `reqwest` and
//! `tokio-tungstenite` never leak past the dispatcher or the channel.

use serde::Deserialize;

/// Client-side error enum.
///
/// The enum is `Clone` because a single refresh outcome is shared by every
/// request waiting on the same in-flight refresh.
///
/// # Recovery
///
/// | Variant         | Retried by the dispatcher            | Status |
/// |-----------------|--------------------------------------|--------|
/// | `Network`       | never                                | none   |
/// | `AuthRequired`  | never (no network call is made)      | none   |
/// | `Api` (401)     | once, after a successful refresh     | 401    |
/// | `Api` (other)   | never                                | status |
/// | `Protocol`      | never                                | none   |
/// | `RefreshFailed` | never; treat as logged out           | 401    |
/// | `Config`        | never                                | none   |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The transport failed before any response was received.
    #[error("network error: {0}")]
    Network(String),

    /// An operation that needs an access token was attempted without one.
    #[error("authentication required")]
    AuthRequired,

    /// The API answered with a non-success status.
    #[error("api error {status}: {message}")]
    Api {
        /// HTTP status code of the final attempt.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// A success response was missing contractually required fields or was
    /// not valid JSON.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The refresh endpoint rejected the stored refresh token.
    #[error("refresh failed: {0}")]
    RefreshFailed(String),

    /// The client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the HTTP status associated with this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RefreshFailed(_) => Some(401),
            Self::Network(_) | Self::AuthRequired | Self::Protocol(_) | Self::Config(_) => None,
        }
    }

    /// Returns `true` when the caller should consider the session logged out.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired | Self::RefreshFailed(_) | Self::Api { status: 401, .. }
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for ClientError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::Config(format!("invalid header value: {err}"))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Error body shapes the API is known to return.
///
/// ```json
/// { "success": false, "message": "Campaign not found" }
/// { "error": "invalid api key" }
/// ```
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Extracts a human-readable message from a failed response body.
///
/// Prefers the JSON `message` field, then `error`, then the raw body text,
/// and finally the canonical reason phrase for `status`.
pub(crate) fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
    parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        })
}
