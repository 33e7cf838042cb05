//! Impact metric endpoints.

use serde::Serialize;
use serde_json::{Map, Value};

use super::dto::QueryParams;
use super::{encode_body, send};
use crate::dispatch::{RequestDispatcher, RequestSpec};
use crate::error::ClientError;

/// `/impact/*` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct ImpactApi<'a> {
    dispatcher: &'a RequestDispatcher,
}

impl<'a> ImpactApi<'a> {
    /// Wraps `dispatcher`.
    #[must_use]
    pub const fn new(dispatcher: &'a RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// `POST /impact/metrics` with `{ campaignId, ..metrics }`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Protocol`] if `metrics` does not serialize to
    /// a JSON object, and any dispatcher error.
    pub async fn create_metrics<T: Serialize + ?Sized>(
        &self,
        campaign_id: &str,
        metrics: &T,
    ) -> Result<Value, ClientError> {
        let body = with_campaign_id(campaign_id, encode_body(metrics)?)?;
        send(self.dispatcher, RequestSpec::post("/impact/metrics").with_json(body)).await
    }

    /// `PUT /impact/metrics/{metric_id}`
    ///
    /// # Errors
    ///
    /// Returns any [`ClientError`] from the dispatcher.
    pub async fn update_metrics<T: Serialize + ?Sized>(
        &self,
        metric_id: &str,
        changes: &T,
    ) -> Result<Value, ClientError> {
        let spec = RequestSpec::put(format!("/impact/metrics/{metric_id}"))
            .with_json(encode_body(changes)?);
        send(self.dispatcher, spec).await
    }

    /// `GET /impact/metrics/{campaign_id}?…`
    ///
    /// # Errors
    ///
    /// Returns any [`ClientError`] from the dispatcher.
    pub async fn metrics(
        &self,
        campaign_id: &str,
        params: QueryParams<'_>,
    ) -> Result<Value, ClientError> {
        let spec = RequestSpec::get(format!("/impact/metrics/{campaign_id}"))
            .with_query(params.iter().copied());
        send(self.dispatcher, spec).await
    }

    /// `POST /impact/metrics/{metric_id}/verify`
    ///
    /// # Errors
    ///
    /// Returns any [`ClientError`] from the dispatcher.
    pub async fn verify_metric<T: Serialize + ?Sized>(
        &self,
        metric_id: &str,
        verification: &T,
    ) -> Result<Value, ClientError> {
        let spec = RequestSpec::post(format!("/impact/metrics/{metric_id}/verify"))
            .with_json(encode_body(verification)?);
        send(self.dispatcher, spec).await
    }
}

/// Prepends `campaignId` to an object body. Fields of `body` win on
/// collision.
fn with_campaign_id(campaign_id: &str, body: Value) -> Result<Value, ClientError> {
    let Value::Object(fields) = body else {
        return Err(ClientError::Protocol(
            "impact metrics must serialize to a JSON object".to_string(),
        ));
    };
    let mut merged = Map::new();
    merged.insert("campaignId".to_string(), Value::from(campaign_id));
    merged.extend(fields);
    Ok(Value::Object(merged))
}
