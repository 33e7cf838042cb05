//! Top-level client owning the session, the dispatcher and the channel.

use std::sync::Arc;

use crate::api::{AuthApi, CampaignsApi, DonationsApi, ImpactApi, NotificationsApi, UpdatesApi};
use crate::config::ClientConfig;
use crate::dispatch::RequestDispatcher;
use crate::error::ClientError;
use crate::session::Session;
use crate::ws::NotificationChannel;

/// GiveHub API client.
///
/// Holds one [`Session`] shared by the [`RequestDispatcher`] (sole token
/// writer) and the [`NotificationChannel`] (token reader). Endpoint modules
/// are borrowed views and cost nothing to create.
///
/// ```no_run
/// # async fn demo() -> Result<(), givehub_client::ClientError> {
/// use givehub_client::{ClientConfig, GiveHubClient};
///
/// let client = GiveHubClient::new(ClientConfig::new("your-api-key"))?;
/// client.auth().login("user@example.com", "password123").await?;
/// let campaigns = client.campaigns().list(&[("status", "active")]).await?;
/// # let _ = campaigns;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GiveHubClient {
    session: Arc<Session>,
    dispatcher: RequestDispatcher,
    channel: NotificationChannel,
}

impl GiveHubClient {
    /// Builds a logged-out client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the configuration is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let session = Arc::new(Session::new(&config));
        let dispatcher = RequestDispatcher::new(Arc::clone(&session), config.request_timeout)?;
        let channel = NotificationChannel::new(Arc::clone(&session));

        tracing::debug!(base_url = %session.base_url(), version = %session.api_version(), "client created");
        Ok(Self {
            session,
            dispatcher,
            channel,
        })
    }

    /// Builds a client from `GIVEHUB_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`] and [`GiveHubClient::new`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Session shared by all components.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Request dispatcher, for calls not covered by an endpoint module.
    #[must_use]
    pub const fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Real-time notification channel.
    #[must_use]
    pub const fn channel(&self) -> &NotificationChannel {
        &self.channel
    }

    /// Account endpoints.
    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.dispatcher)
    }

    /// Campaign endpoints.
    #[must_use]
    pub const fn campaigns(&self) -> CampaignsApi<'_> {
        CampaignsApi::new(&self.dispatcher)
    }

    /// Donation endpoints.
    #[must_use]
    pub const fn donations(&self) -> DonationsApi<'_> {
        DonationsApi::new(&self.dispatcher)
    }

    /// Impact metric endpoints.
    #[must_use]
    pub const fn impact(&self) -> ImpactApi<'_> {
        ImpactApi::new(&self.dispatcher)
    }

    /// Campaign update endpoints.
    #[must_use]
    pub const fn updates(&self) -> UpdatesApi<'_> {
        UpdatesApi::new(&self.dispatcher)
    }

    /// Notification history and the live channel.
    #[must_use]
    pub const fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi::new(&self.dispatcher, &self.channel)
    }
}
