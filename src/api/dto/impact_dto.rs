//! Impact metric DTOs.

use serde::{Deserialize, Serialize};

/// One measured outcome of a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    /// Metric name (e.g. `"People Helped"`).
    pub name: String,
    /// Measured value.
    pub value: f64,
    /// Unit of `value` (e.g. `"liters/day"`).
    pub unit: String,
}

/// Metrics payload for `POST /impact/metrics`; the campaign id is added by
/// the endpoint method.
#[derive(Debug, Clone, Serialize)]
pub struct NewMetrics {
    /// Metrics being reported.
    pub metrics: Vec<MetricEntry>,
}
