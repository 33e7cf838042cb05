//! Wire shapes of the login and refresh endpoints.

use serde::{Deserialize, Serialize};

/// Path of the login endpoint.
pub const LOGIN_PATH: &str = "/auth/login";

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// `POST /auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Account email.
    pub email: &'a str,
    /// Account password.
    pub password: &'a str,
}

/// `POST /auth/refresh` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    /// The stored refresh token.
    pub refresh_token: &'a str,
}

/// Token pair returned by a successful login.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairDto {
    /// New access token.
    pub access_token: Option<String>,
    /// New refresh token.
    pub refresh_token: Option<String>,
}

/// `POST /auth/login` response.
///
/// ```json
/// { "success": true, "tokens": { "accessToken": "..", "refreshToken": ".." }, "user": { .. } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Whether the credentials were accepted.
    #[serde(default)]
    pub success: bool,
    /// Token pair, present on success.
    pub tokens: Option<TokenPairDto>,
}

/// `POST /auth/refresh` response.
///
/// ```json
/// { "success": true, "accessToken": ".." }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// Whether the refresh token was accepted.
    #[serde(default)]
    pub success: bool,
    /// New access token, present on success.
    pub access_token: Option<String>,
}
