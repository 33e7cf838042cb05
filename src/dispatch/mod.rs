//! HTTP dispatch layer: request specs, auth headers, refresh and retry.
//!
//! Endpoint modules describe a call with a [`RequestSpec`] and hand it to
//! [`RequestDispatcher::send`]. The dispatcher is the only component that
//! writes session tokens.

pub mod credentials;
pub mod dispatcher;
pub mod request;

pub use dispatcher::{API_KEY_HEADER, RequestDispatcher};
pub use request::{MediaUpload, Method, RequestBody, RequestSpec};
