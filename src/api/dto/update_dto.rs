//! Campaign update DTOs.

use serde::Serialize;

/// Request body for `POST /updates`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUpdate {
    /// Campaign the update belongs to.
    pub campaign_id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Update category (e.g. `"milestone"`).
    #[serde(rename = "type")]
    pub kind: String,
}
