//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};

/// Monetary amount in a given currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in major units (e.g. dollars).
    pub value: f64,
    /// ISO-4217 currency code (e.g. `"USD"`).
    pub currency: String,
}

impl Money {
    /// Creates an amount in `currency`.
    #[must_use]
    pub fn new(value: f64, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }
}

/// Query-string pairs for list endpoints, sent in order.
///
/// Pagination and filtering keys are passed through untouched
/// (e.g. `page`, `limit`, `status`, `from`, `to`).
pub type QueryParams<'a> = &'a [(&'a str, &'a str)];
