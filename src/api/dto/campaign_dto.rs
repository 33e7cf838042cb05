//! Campaign and milestone DTOs.

use serde::{Deserialize, Serialize};

/// A funding milestone within a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneDto {
    /// What the milestone funds.
    pub description: String,
    /// Amount required to reach it.
    pub amount: f64,
}

/// Request body for `POST /campaigns`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    /// Campaign title.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Funding goal.
    pub target_amount: f64,
    /// Category slug (e.g. `"water"`).
    pub category: String,
    /// Planned milestones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<MilestoneDto>,
}
