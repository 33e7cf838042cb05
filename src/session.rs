//! In-memory session shared by the dispatcher and the notification channel.
//!
//! [`Session`] holds the connection parameters and the current token pair.
//! It is created once per client and shared by `Arc`. Tokens live together
//! behind one lock so a login writes both or neither.
//!
//! Every login and logout starts a new token generation. A refresh records
//! the generation it started in and may only write back into that same
//! generation, so a slow refresh can never resurrect a logged-out session
//! or overwrite the tokens of a newer login.

use std::sync::{PoisonError, RwLock};

use crate::config::ClientConfig;

/// The tokens a session currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Bearer token sent with every request.
    pub access_token: Option<String>,
    /// Token exchanged for a new access token on 401.
    pub refresh_token: Option<String>,
}

/// Refresh token captured at the start of a refresh, tagged with the
/// generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RefreshGrant {
    pub(crate) refresh_token: String,
    pub(crate) generation: u64,
}

#[derive(Debug, Default)]
struct TokenState {
    tokens: Tokens,
    generation: u64,
}

/// Connection parameters plus the current auth tokens of one client.
///
/// Token fields are only mutated through [`Session::store_login`],
/// [`Session::store_refreshed`] and [`Session::clear`], which the
/// dispatcher calls from login, refresh and logout.
#[derive(Debug)]
pub struct Session {
    base_url: String,
    api_version: String,
    api_key: String,
    state: RwLock<TokenState>,
}

impl Session {
    /// Creates a logged-out session from the client configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            api_key: config.api_key.clone(),
            state: RwLock::new(TokenState::default()),
        }
    }

    /// Returns the API host, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the API version segment.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Composes `base_url + "/" + api_version + path`.
    #[must_use]
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}{}", self.base_url, self.api_version, path)
    }

    /// Returns a snapshot of both tokens.
    #[must_use]
    pub fn tokens(&self) -> Tokens {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .clone()
    }

    /// Returns the current access token, if logged in.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tokens().access_token
    }

    /// Returns the current refresh token, if logged in.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.tokens().refresh_token
    }

    /// Returns `true` if an access token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .access_token
            .is_some()
    }

    /// Returns the refresh token and its generation, if one is held.
    pub(crate) fn refresh_grant(&self) -> Option<RefreshGrant> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.tokens.refresh_token.clone().map(|refresh_token| RefreshGrant {
            refresh_token,
            generation: state.generation,
        })
    }

    /// Replaces both tokens in one write and starts a new generation.
    pub(crate) fn store_login(&self, access_token: String, refresh_token: String) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.generation = state.generation.wrapping_add(1);
        state.tokens = Tokens {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
        };
    }

    /// Overwrites the access token if `grant` still describes the current
    /// session. The refresh token is not rotated.
    ///
    /// Returns `false`, leaving the session untouched, when a logout or a
    /// newer login happened since `grant` was taken.
    pub(crate) fn store_refreshed(&self, grant: &RefreshGrant, access_token: String) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let current = state.generation == grant.generation
            && state.tokens.refresh_token.as_deref() == Some(grant.refresh_token.as_str());
        if current {
            state.tokens.access_token = Some(access_token);
        }
        current
    }

    /// Drops both tokens and starts a new generation.
    pub(crate) fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.generation = state.generation.wrapping_add(1);
        state.tokens = Tokens::default();
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&ClientConfig::new("key").with_base_url("https://api.example.com/"))
    }

    #[test]
    fn endpoint_url_joins_version_and_path() {
        let s = session();
        assert_eq!(
            s.endpoint_url("/campaigns"),
            "https://api.example.com/v1/campaigns"
        );
    }

    #[test]
    fn new_session_is_logged_out() {
        let s = session();
        assert!(!s.is_authenticated());
        assert_eq!(s.tokens(), Tokens::default());
    }

    #[test]
    fn store_login_sets_both_tokens() {
        let s = session();
        s.store_login("AT1".to_string(), "RT1".to_string());
        assert_eq!(s.access_token().as_deref(), Some("AT1"));
        assert_eq!(s.refresh_token().as_deref(), Some("RT1"));
    }

    #[test]
    fn store_refreshed_keeps_refresh_token() {
        let s = session();
        s.store_login("AT1".to_string(), "RT1".to_string());
        let Some(grant) = s.refresh_grant() else {
            panic!("grant should exist after login");
        };
        assert!(s.store_refreshed(&grant, "AT2".to_string()));
        assert_eq!(s.access_token().as_deref(), Some("AT2"));
        assert_eq!(s.refresh_token().as_deref(), Some("RT1"));
    }

    #[test]
    fn refresh_after_logout_is_discarded() {
        let s = session();
        s.store_login("AT1".to_string(), "RT1".to_string());
        let Some(grant) = s.refresh_grant() else {
            panic!("grant should exist after login");
        };
        s.clear();
        assert!(!s.store_refreshed(&grant, "AT2".to_string()));
        assert_eq!(s.tokens(), Tokens::default());
    }

    #[test]
    fn refresh_across_relogin_is_discarded() {
        let s = session();
        s.store_login("AT1".to_string(), "RT1".to_string());
        let Some(grant) = s.refresh_grant() else {
            panic!("grant should exist after login");
        };
        s.clear();
        // Same refresh token string, newer login.
        s.store_login("AT3".to_string(), "RT1".to_string());
        assert!(!s.store_refreshed(&grant, "AT2".to_string()));
        assert_eq!(s.access_token().as_deref(), Some("AT3"));
    }

    #[test]
    fn logged_out_session_has_no_grant() {
        assert!(session().refresh_grant().is_none());
    }

    #[test]
    fn clear_drops_both_tokens() {
        let s = session();
        s.store_login("AT1".to_string(), "RT1".to_string());
        s.clear();
        assert!(!s.is_authenticated());
        assert!(s.refresh_token().is_none());
    }
}
