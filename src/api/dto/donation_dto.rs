//! Donation DTOs.

use serde::Serialize;

use super::Money;

/// Whether a donation is charged once or on a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DonationKind {
    /// Single charge.
    OneTime,
    /// Scheduled charge.
    Recurring,
}

/// Schedule of a recurring donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
    /// Every year.
    Yearly,
}

/// Request body for `POST /donations` and `POST /donations/recurring`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    /// Campaign receiving the donation.
    pub campaign_id: String,
    /// Amount donated.
    pub amount: Money,
    /// One-time or recurring.
    #[serde(rename = "type")]
    pub kind: DonationKind,
    /// Schedule, for recurring donations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
}

impl NewDonation {
    /// A one-time donation to `campaign_id`.
    #[must_use]
    pub fn one_time(campaign_id: impl Into<String>, amount: Money) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            amount,
            kind: DonationKind::OneTime,
            frequency: None,
        }
    }

    /// A recurring donation to `campaign_id`.
    #[must_use]
    pub fn recurring(campaign_id: impl Into<String>, amount: Money, frequency: Frequency) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            amount,
            kind: DonationKind::Recurring,
            frequency: Some(frequency),
        }
    }
}
