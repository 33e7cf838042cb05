//! Donation endpoints, one-time and recurring.

use serde::Serialize;
use serde_json::Value;

use super::dto::QueryParams;
use super::{encode_body, send};
use crate::dispatch::{RequestDispatcher, RequestSpec};
use crate::error::ClientError;

/// `/donations/*` endpoints.
///
/// # Errors
///
/// Every method returns the [`ClientError`] produced by the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct DonationsApi<'a> {
    dispatcher: &'a RequestDispatcher,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> DonationsApi<'a> {
    /// Wraps `dispatcher`.
    #[must_use]
    pub const fn new(dispatcher: &'a RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// `POST /donations`
    pub async fn create<T: Serialize + ?Sized>(&self, donation: &T) -> Result<Value, ClientError> {
        let spec = RequestSpec::post("/donations").with_json(encode_body(donation)?);
        send(self.dispatcher, spec).await
    }

    /// `GET /donations?…`
    pub async fn list(&self, params: QueryParams<'_>) -> Result<Value, ClientError> {
        let spec = RequestSpec::get("/donations").with_query(params.iter().copied());
        send(self.dispatcher, spec).await
    }

    /// `GET /donations/transactions/{tx_id}`
    pub async fn transaction(&self, tx_id: &str) -> Result<Value, ClientError> {
        let spec = RequestSpec::get(format!("/donations/transactions/{tx_id}"));
        send(self.dispatcher, spec).await
    }

    /// `POST /donations/recurring`
    pub async fn create_recurring<T: Serialize + ?Sized>(
        &self,
        donation: &T,
    ) -> Result<Value, ClientError> {
        let spec = RequestSpec::post("/donations/recurring").with_json(encode_body(donation)?);
        send(self.dispatcher, spec).await
    }

    /// `DELETE /donations/recurring/{subscription_id}`
    pub async fn cancel_recurring(&self, subscription_id: &str) -> Result<Value, ClientError> {
        let spec = RequestSpec::delete(format!("/donations/recurring/{subscription_id}"));
        send(self.dispatcher, spec).await
    }
}
