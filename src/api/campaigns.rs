//! Campaign endpoints.

use serde::Serialize;
use serde_json::Value;

use super::dto::QueryParams;
use super::{MEDIA_FIELD, encode_body, send};
use crate::dispatch::{MediaUpload, RequestDispatcher, RequestSpec};
use crate::error::ClientError;

/// `/campaigns/*` endpoints.
///
/// # Errors
///
/// Every method returns the [`ClientError`] produced by the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct CampaignsApi<'a> {
    dispatcher: &'a RequestDispatcher,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> CampaignsApi<'a> {
    /// Wraps `dispatcher`.
    #[must_use]
    pub const fn new(dispatcher: &'a RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// `POST /campaigns`
    pub async fn create<T: Serialize + ?Sized>(&self, campaign: &T) -> Result<Value, ClientError> {
        let spec = RequestSpec::post("/campaigns").with_json(encode_body(campaign)?);
        send(self.dispatcher, spec).await
    }

    /// `GET /campaigns/{id}`
    pub async fn get(&self, campaign_id: &str) -> Result<Value, ClientError> {
        send(self.dispatcher, RequestSpec::get(format!("/campaigns/{campaign_id}"))).await
    }

    /// `GET /campaigns?…`
    pub async fn list(&self, params: QueryParams<'_>) -> Result<Value, ClientError> {
        let spec = RequestSpec::get("/campaigns").with_query(params.iter().copied());
        send(self.dispatcher, spec).await
    }

    /// `PUT /campaigns/{id}`
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        campaign_id: &str,
        changes: &T,
    ) -> Result<Value, ClientError> {
        let spec = RequestSpec::put(format!("/campaigns/{campaign_id}"))
            .with_json(encode_body(changes)?);
        send(self.dispatcher, spec).await
    }

    /// `POST /campaigns/{id}/media` as `multipart/form-data`.
    pub async fn upload_media(
        &self,
        campaign_id: &str,
        file: MediaUpload,
    ) -> Result<Value, ClientError> {
        let spec = RequestSpec::post(format!("/campaigns/{campaign_id}/media"))
            .with_multipart(MEDIA_FIELD, file);
        send(self.dispatcher, spec).await
    }

    /// `GET /campaigns/{id}/milestones`
    pub async fn milestones(&self, campaign_id: &str) -> Result<Value, ClientError> {
        let spec = RequestSpec::get(format!("/campaigns/{campaign_id}/milestones"));
        send(self.dispatcher, spec).await
    }

    /// `PUT /campaigns/{id}/milestones/{milestone_id}`
    pub async fn update_milestone<T: Serialize + ?Sized>(
        &self,
        campaign_id: &str,
        milestone_id: &str,
        changes: &T,
    ) -> Result<Value, ClientError> {
        let spec = RequestSpec::put(format!(
            "/campaigns/{campaign_id}/milestones/{milestone_id}"
        ))
        .with_json(encode_body(changes)?);
        send(self.dispatcher, spec).await
    }
}
