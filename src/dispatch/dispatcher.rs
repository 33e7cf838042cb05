//! Authenticated request dispatcher with transparent token refresh.
//!
//! Every API call goes through [`RequestDispatcher::send`]:
//!
//! ```text
//! send(spec)
//!   │
//!   ├── FirstAttempt ──► 2xx ─────────────────────────► Ok(json)
//!   │        │
//!   │        ├── 401 + refresh token ──► shared refresh ──► RetriedAfterRefresh ──► final
//!   │        ├── 401, no refresh token ─────────────────► Err(Api 401)
//!   │        └── other status ──────────────────────────► Err(Api status)
//!   │
//!   └── transport failure at any point ─────────────────► Err(Network)
//! ```
//!
//! Concurrent 401s attach to one in-flight refresh instead of each
//! starting their own.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::credentials::{
    LOGIN_PATH, LoginRequest, LoginResponse, REFRESH_PATH, RefreshRequest, RefreshResponse,
};
use super::request::{RequestBody, RequestSpec};
use crate::error::{ClientError, error_message};
use crate::session::Session;

/// Name of the API key header.
pub const API_KEY_HEADER: &str = "x-api-key";

type RefreshFuture = Shared<BoxFuture<'static, Result<String, ClientError>>>;

/// Which attempt of a request is being made. At most one retry follows a
/// refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    FirstAttempt,
    RetriedAfterRefresh,
}

/// Classified result of one HTTP round trip.
#[derive(Debug)]
enum AttemptOutcome {
    Success(Value),
    Unauthorized(String),
    Failure { status: u16, message: String },
}

/// Sends requests on behalf of one [`Session`].
///
/// Cheap to clone; clones share the HTTP connection pool, the session and
/// the refresh slot.
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    http: reqwest::Client,
    session: Arc<Session>,
    refresh_slot: Mutex<Option<RefreshFuture>>,
}

impl fmt::Debug for DispatcherInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let refresh_in_flight = self
            .refresh_slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("DispatcherInner")
            .field("session", &self.session)
            .field("refresh_in_flight", &refresh_in_flight)
            .finish_non_exhaustive()
    }
}

impl RequestDispatcher {
    /// Creates a dispatcher for `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the HTTP client cannot be built.
    pub fn new(session: Arc<Session>, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            inner: Arc::new(DispatcherInner {
                http,
                session,
                refresh_slot: Mutex::new(None),
            }),
        })
    }

    /// Returns the session this dispatcher writes tokens into.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    /// Sends `spec` and returns the parsed JSON body of the final attempt.
    ///
    /// A single 401 is recovered by one refresh followed by one replay of
    /// the same spec; the replay's outcome is final.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthRequired`] if the spec requires auth and no
    ///   access token is held (no network call is made).
    /// - [`ClientError::Network`] if no response was received.
    /// - [`ClientError::RefreshFailed`] if the refresh triggered by a 401
    ///   failed, or the session was logged out or replaced while it ran;
    ///   tokens are left untouched.
    /// - [`ClientError::AuthRequired`] if the session was cleared before the
    ///   replay could be sent.
    /// - [`ClientError::Api`] for any other non-success final status.
    /// - [`ClientError::Protocol`] if a success body is not JSON.
    pub async fn send(&self, spec: &RequestSpec) -> Result<Value, ClientError> {
        if spec.requires_auth() && !self.inner.session.is_authenticated() {
            return Err(ClientError::AuthRequired);
        }

        let mut attempt = Attempt::FirstAttempt;
        loop {
            let (outcome, sent_with) = self.execute(spec, attempt).await?;
            match outcome {
                AttemptOutcome::Success(value) => return Ok(value),
                AttemptOutcome::Unauthorized(message) => {
                    if attempt == Attempt::RetriedAfterRefresh
                        || self.inner.session.refresh_token().is_none()
                    {
                        return Err(ClientError::Api {
                            status: 401,
                            message,
                        });
                    }
                    // Another request may have refreshed while this one was in flight.
                    if self.inner.session.access_token() == sent_with {
                        self.refresh_shared()
                            .await
                            .map_err(into_refresh_failure)?;
                    }
                    if !self.inner.session.is_authenticated() {
                        tracing::debug!("session cleared before replay");
                        return Err(ClientError::AuthRequired);
                    }
                    attempt = Attempt::RetriedAfterRefresh;
                }
                AttemptOutcome::Failure { status, message } => {
                    return Err(ClientError::Api { status, message });
                }
            }
        }
    }

    /// Logs in and stores both tokens on success.
    ///
    /// Returns the full response body. When the server answers
    /// `success: false` the body is returned as-is and the session is not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Protocol`] if a successful login does not
    /// carry both `tokens.accessToken` and `tokens.refreshToken`, and any
    /// error from [`RequestDispatcher::send`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        let body = serde_json::to_value(LoginRequest { email, password })
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        let response = self
            .send(&RequestSpec::post(LOGIN_PATH).with_json(body))
            .await?;

        let parsed: LoginResponse = serde_json::from_value(response.clone())
            .map_err(|e| ClientError::Protocol(format!("unexpected login response: {e}")))?;
        if !parsed.success {
            tracing::info!(email, "login rejected by server");
            return Ok(response);
        }

        let tokens = parsed.tokens.unwrap_or_default();
        let (Some(access_token), Some(refresh_token)) = (tokens.access_token, tokens.refresh_token)
        else {
            return Err(ClientError::Protocol(
                "login response must carry both accessToken and refreshToken".to_string(),
            ));
        };
        self.inner.session.store_login(access_token, refresh_token);

        tracing::info!(email, "logged in");
        Ok(response)
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// Joins the refresh already in flight, if any. Only the access token is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AuthRequired`] if no refresh token is held.
    /// - [`ClientError::RefreshFailed`] if the endpoint rejected the token,
    ///   or a logout or new login happened while the refresh was in flight.
    /// - [`ClientError::Protocol`] if a success response lacks `accessToken`.
    /// - [`ClientError::Network`] if no response was received.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.refresh_shared().await.map(|_| ())
    }

    /// Clears both tokens. No network call is made.
    pub fn logout(&self) {
        self.inner.session.clear();
        tracing::info!("logged out");
    }

    /// Attaches to the in-flight refresh or starts a new one.
    async fn refresh_shared(&self) -> Result<String, ClientError> {
        let refresh = {
            let mut slot = self
                .inner
                .refresh_slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(in_flight) if in_flight.peek().is_none() => {
                    tracing::debug!("joining in-flight token refresh");
                    in_flight.clone()
                }
                _ => {
                    let dispatcher = self.clone();
                    let refresh = async move { dispatcher.perform_refresh().await }
                        .boxed()
                        .shared();
                    *slot = Some(refresh.clone());
                    refresh
                }
            }
        };

        let result = refresh.clone().await;

        let mut slot = self
            .inner
            .refresh_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&refresh)) {
            *slot = None;
        }
        result
    }

    /// Performs one refresh round trip. Never triggers a nested refresh.
    async fn perform_refresh(&self) -> Result<String, ClientError> {
        let grant = self
            .inner
            .session
            .refresh_grant()
            .ok_or(ClientError::AuthRequired)?;
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: &grant.refresh_token,
        })
        .map_err(|e| ClientError::Protocol(e.to_string()))?;
        let spec = RequestSpec::post(REFRESH_PATH).with_json(body);

        tracing::debug!("refreshing access token");
        let (outcome, _) = self.execute(&spec, Attempt::FirstAttempt).await?;
        let response = match outcome {
            AttemptOutcome::Success(value) => value,
            AttemptOutcome::Unauthorized(message) | AttemptOutcome::Failure { message, .. } => {
                tracing::warn!(%message, "token refresh rejected");
                return Err(ClientError::RefreshFailed(message));
            }
        };

        let parsed: RefreshResponse = serde_json::from_value(response)
            .map_err(|e| ClientError::Protocol(format!("unexpected refresh response: {e}")))?;
        if !parsed.success {
            tracing::warn!("token refresh answered success=false");
            return Err(ClientError::RefreshFailed(
                "refresh token rejected".to_string(),
            ));
        }
        let access_token = parsed.access_token.ok_or_else(|| {
            ClientError::Protocol("refresh response missing accessToken".to_string())
        })?;

        if !self
            .inner
            .session
            .store_refreshed(&grant, access_token.clone())
        {
            tracing::warn!("session changed during token refresh; discarding new token");
            return Err(ClientError::RefreshFailed(
                "session changed during refresh".to_string(),
            ));
        }
        tracing::info!("access token refreshed");
        Ok(access_token)
    }

    /// Performs one HTTP round trip for `spec` with the current token.
    ///
    /// Returns the classified outcome and the access token the request was
    /// sent with.
    async fn execute(
        &self,
        spec: &RequestSpec,
        attempt: Attempt,
    ) -> Result<(AttemptOutcome, Option<String>), ClientError> {
        let session = &self.inner.session;
        let access_token = session.access_token();
        let url = session.endpoint_url(spec.path());
        let headers = build_headers(session.api_key(), access_token.as_deref(), spec)?;

        let mut request = self
            .inner
            .http
            .request(spec.method().into(), &url)
            .headers(headers);
        if !spec.query().is_empty() {
            request = request.query(spec.query());
        }
        request = match spec.body() {
            Some(RequestBody::Json(value)) => request.json(value),
            Some(RequestBody::Multipart { field, upload }) => {
                request.multipart(RequestBody::to_form(field, upload)?)
            }
            None => request,
        };

        tracing::debug!(method = ?spec.method(), %url, ?attempt, "sending request");
        let response = request.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(%url, status = status.as_u16(), "received response");

        let outcome = if status == StatusCode::UNAUTHORIZED {
            AttemptOutcome::Unauthorized(error_message(status, &text))
        } else if !status.is_success() {
            AttemptOutcome::Failure {
                status: status.as_u16(),
                message: error_message(status, &text),
            }
        } else if text.trim().is_empty() {
            AttemptOutcome::Success(Value::Null)
        } else {
            let value = serde_json::from_str(&text)
                .map_err(|e| ClientError::Protocol(format!("response is not JSON: {e}")))?;
            AttemptOutcome::Success(value)
        };
        Ok((outcome, access_token))
    }
}

/// Converts any refresh error into the failure a waiting request reports.
fn into_refresh_failure(err: ClientError) -> ClientError {
    match err {
        ClientError::RefreshFailed(_) => err,
        other => ClientError::RefreshFailed(other.to_string()),
    }
}

/// Composes the headers for one attempt.
///
/// Defaults first, caller headers last so they win.
fn build_headers(
    api_key: &str,
    access_token: Option<&str>,
    spec: &RequestSpec,
) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    if !spec.is_multipart() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    headers.insert(
        HeaderName::from_static(API_KEY_HEADER),
        HeaderValue::from_str(api_key)?,
    );
    if let Some(token) = access_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    for (name, value) in spec.headers() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::Config(format!("invalid header name {name}: {e}")))?;
        headers.insert(name, HeaderValue::from_str(value)?);
    }
    Ok(headers)
}
