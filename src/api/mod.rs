//! Endpoint modules: thin call-sites over the request dispatcher.
//!
//! Each method builds a [`RequestSpec`] from a path, method and payload,
//! hands it to [`RequestDispatcher::send`] and returns the parsed body.
//! All paths are relative to `<base_url>/<api_version>`.

pub mod auth;
pub mod campaigns;
pub mod donations;
pub mod dto;
pub mod impact;
pub mod notifications;
pub mod updates;

use serde::Serialize;
use serde_json::Value;

use crate::dispatch::{RequestDispatcher, RequestSpec};
use crate::error::ClientError;

pub use auth::AuthApi;
pub use campaigns::CampaignsApi;
pub use donations::DonationsApi;
pub use impact::ImpactApi;
pub use notifications::NotificationsApi;
pub use updates::UpdatesApi;

/// Form field name used by every media upload endpoint.
pub const MEDIA_FIELD: &str = "media";

/// Serializes a caller payload into a JSON body.
fn encode_body<T: Serialize + ?Sized>(body: &T) -> Result<Value, ClientError> {
    serde_json::to_value(body)
        .map_err(|e| ClientError::Protocol(format!("could not encode request body: {e}")))
}

/// Sends `spec` through `dispatcher`.
async fn send(dispatcher: &RequestDispatcher, spec: RequestSpec) -> Result<Value, ClientError> {
    dispatcher.send(&spec).await
}
