//! Client configuration.
//!
//! Settings can be built in code with [`ClientConfig::new`] and the `with_*`
//! setters, or loaded 12-factor style from environment variables (or a
//! `.env` file via `dotenvy`) with [`ClientConfig::from_env`].

use std::time::Duration;

use crate::error::ClientError;

/// Production API host used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.thegivehub.com";

/// API version segment used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and host of the API, without a trailing slash
    /// (e.g. `https://api.thegivehub.com`).
    pub base_url: String,

    /// Version segment inserted between the host and every request path.
    pub api_version: String,

    /// Value sent in the `X-API-Key` header on every request.
    pub api_key: String,

    /// Optional per-request timeout. `None` waits for the transport.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a configuration for the production API with the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_key: api_key.into(),
            request_timeout: None,
        }
    }

    /// Overrides the API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the API version segment.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Sets a bounded timeout applied to each HTTP request.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// | Variable                       | Default                       |
    /// |--------------------------------|-------------------------------|
    /// | `GIVEHUB_API_KEY`              | required                      |
    /// | `GIVEHUB_BASE_URL`             | `https://api.thegivehub.com`  |
    /// | `GIVEHUB_API_VERSION`          | `v1`                          |
    /// | `GIVEHUB_REQUEST_TIMEOUT_SECS` | `0` (no timeout)              |
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `GIVEHUB_API_KEY` is unset, a
    /// numeric variable does not parse, or the resulting configuration fails
    /// [`ClientConfig::validate`].
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("GIVEHUB_API_KEY")
            .map_err(|_| ClientError::Config("GIVEHUB_API_KEY is not set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("GIVEHUB_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        if let Ok(version) = std::env::var("GIVEHUB_API_VERSION") {
            config = config.with_api_version(version);
        }
        let timeout_secs: u64 = parse_env("GIVEHUB_REQUEST_TIMEOUT_SECS", 0)?;
        if timeout_secs > 0 {
            config = config.with_request_timeout(Duration::from_secs(timeout_secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the base URL is an `http` or `https` URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] for any other scheme, since the
    /// notification socket URL is derived from it.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.base_url.starts_with("http://") || self.base_url.starts_with("https://") {
            Ok(())
        } else {
            Err(ClientError::Config(format!(
                "base url must start with http:// or https://, got {}",
                self.base_url
            )))
        }
    }
}

/// Parses an environment variable as `T`, returning `default` when it is
/// unset.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ClientError> {
    parse_value(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_value<T: std::str::FromStr>(
    key: &str,
    raw: Option<&str>,
    default: T,
) -> Result<T, ClientError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ClientError::Config(format!("{key} has an invalid value: {value}"))),
    }
}
