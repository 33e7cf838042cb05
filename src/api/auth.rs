//! Account endpoints: login, registration, verification, token lifecycle.

use serde_json::Value;

use super::dto::{RegisterRequest, VerifyEmailRequest};
use super::{encode_body, send};
use crate::dispatch::{RequestDispatcher, RequestSpec};
use crate::error::ClientError;

/// `/auth/*` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    dispatcher: &'a RequestDispatcher,
}

impl<'a> AuthApi<'a> {
    /// Wraps `dispatcher`.
    #[must_use]
    pub const fn new(dispatcher: &'a RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// `POST /auth/login`: stores both tokens on success.
    ///
    /// # Errors
    ///
    /// See [`RequestDispatcher::login`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        self.dispatcher.login(email, password).await
    }

    /// `POST /auth/register`: creates an account.
    ///
    /// # Errors
    ///
    /// Returns any [`ClientError`] from the dispatcher.
    pub async fn register(&self, user: &RegisterRequest) -> Result<Value, ClientError> {
        let spec = RequestSpec::post("/auth/register").with_json(encode_body(user)?);
        send(self.dispatcher, spec).await
    }

    /// `POST /auth/verify`: confirms an email address with a code.
    ///
    /// # Errors
    ///
    /// Returns any [`ClientError`] from the dispatcher.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<Value, ClientError> {
        let body = VerifyEmailRequest {
            email: email.to_string(),
            code: code.to_string(),
        };
        let spec = RequestSpec::post("/auth/verify").with_json(encode_body(&body)?);
        send(self.dispatcher, spec).await
    }

    /// `POST /auth/refresh`: replaces the access token.
    ///
    /// # Errors
    ///
    /// See [`RequestDispatcher::refresh`].
    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.dispatcher.refresh().await
    }

    /// Forgets both tokens locally.
    pub fn logout(&self) {
        self.dispatcher.logout();
    }
}
