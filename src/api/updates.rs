//! Campaign update endpoints.

use serde::Serialize;
use serde_json::Value;

use super::dto::QueryParams;
use super::{MEDIA_FIELD, encode_body, send};
use crate::dispatch::{MediaUpload, RequestDispatcher, RequestSpec};
use crate::error::ClientError;

/// `/updates/*` endpoints.
///
/// # Errors
///
/// Every method returns the [`ClientError`] produced by the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct UpdatesApi<'a> {
    dispatcher: &'a RequestDispatcher,
}

#[allow(clippy::missing_errors_doc)]
impl<'a> UpdatesApi<'a> {
    /// Wraps `dispatcher`.
    #[must_use]
    pub const fn new(dispatcher: &'a RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// `POST /updates`
    pub async fn create<T: Serialize + ?Sized>(&self, update: &T) -> Result<Value, ClientError> {
        let spec = RequestSpec::post("/updates").with_json(encode_body(update)?);
        send(self.dispatcher, spec).await
    }

    /// `GET /updates?…`
    pub async fn list(&self, params: QueryParams<'_>) -> Result<Value, ClientError> {
        let spec = RequestSpec::get("/updates").with_query(params.iter().copied());
        send(self.dispatcher, spec).await
    }

    /// `POST /updates/{id}/media` as `multipart/form-data`.
    pub async fn upload_media(
        &self,
        update_id: &str,
        file: MediaUpload,
    ) -> Result<Value, ClientError> {
        let spec = RequestSpec::post(format!("/updates/{update_id}/media"))
            .with_multipart(MEDIA_FIELD, file);
        send(self.dispatcher, spec).await
    }
}
