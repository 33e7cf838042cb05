//! Data Transfer Objects for request bodies.
//!
//! Every endpoint method accepts any `Serialize` body, so these types are a
//! convenience for the shapes the API documents. Field names are sent in
//! camelCase.

pub mod auth_dto;
pub mod campaign_dto;
pub mod common_dto;
pub mod donation_dto;
pub mod impact_dto;
pub mod update_dto;

pub use auth_dto::*;
pub use campaign_dto::*;
pub use common_dto::*;
pub use donation_dto::*;
pub use impact_dto::*;
pub use update_dto::*;
