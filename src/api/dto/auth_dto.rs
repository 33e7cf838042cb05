//! Account registration DTOs.

use serde::Serialize;

/// Request body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// Request body for `POST /auth/verify`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailRequest {
    /// Email being verified.
    pub email: String,
    /// Code sent to that address.
    pub code: String,
}
