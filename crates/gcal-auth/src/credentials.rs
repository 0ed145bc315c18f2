//! Credential Manager: the single owner of client configuration and the
//! access-token cache.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use tokio::sync::Mutex;

use crate::error::AuthError;
use crate::google::GoogleOAuth2Provider;
use crate::oauth::OAuth2Config;
use crate::token::TokenSet;

/// Where the credentials stand. An unconfigured manager cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// Client configured, no refresh token: only the auth URL is available.
    Configured,
    /// Refresh token present: calendar calls may be authenticated.
    Authorized,
}

pub struct CredentialManager {
    provider: GoogleOAuth2Provider,
    refresh_token: Option<String>,
    cached: Mutex<Option<TokenSet>>,
    http: reqwest::Client,
}

impl CredentialManager {
    /// Fails when the client ID or secret is missing or an endpoint is malformed.
    pub fn new(config: OAuth2Config) -> Result<Self, AuthError> {
        let provider = GoogleOAuth2Provider::new(&config)?;
        let manager = Self {
            provider,
            refresh_token: config.refresh_token,
            cached: Mutex::new(None),
            http: reqwest::Client::new(),
        };
        tracing::debug!("Credential manager ready ({:?})", manager.state());
        Ok(manager)
    }

    pub fn state(&self) -> CredentialState {
        if self.refresh_token.is_some() {
            CredentialState::Authorized
        } else {
            CredentialState::Configured
        }
    }

    /// See [`GoogleOAuth2Provider::authorization_url`]. Available in any state.
    pub fn authorization_url(&self, scopes: &[&str]) -> String {
        self.provider.authorization_url(scopes)
    }

    /// A client bound to these credentials. Every request made through it
    /// carries a valid access token.
    pub fn authenticated_client(self: &Arc<Self>) -> Result<AuthorizedClient, AuthError> {
        if self.state() != CredentialState::Authorized {
            return Err(AuthError::AuthorizationRequired);
        }
        Ok(AuthorizedClient {
            http: self.http.clone(),
            credentials: Arc::clone(self),
        })
    }

    /// Current access token, refreshed when missing or close to expiry.
    ///
    /// The lock is held across the refresh so one expiry triggers one
    /// token request.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let refresh_token = self
            .refresh_token
            .as_deref()
            .ok_or(AuthError::AuthorizationRequired)?;

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| !t.needs_refresh()) {
            return Ok(token.access_token.clone());
        }

        tracing::debug!("Refreshing Google access token");
        let token = self.provider.refresh_token(refresh_token).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drop the cached access token so the next call refreshes.
    pub async fn invalidate(&self) {
        if self.cached.lock().await.take().is_some() {
            tracing::debug!("Discarded cached access token");
        }
    }

    /// Trade an authorization code for tokens. Does not touch the cache or
    /// the configured refresh token.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenSet, AuthError> {
        self.provider.exchange_code(code).await
    }
}

/// HTTP client handle that authenticates each request.
#[derive(Clone)]
pub struct AuthorizedClient {
    http: reqwest::Client,
    credentials: Arc<CredentialManager>,
}

impl AuthorizedClient {
    /// Start a request with a bearer token attached.
    pub async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, AuthError> {
        let token = self.credentials.access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// The remote rejected our token; forget it.
    pub async fn invalidate_token(&self) {
        self.credentials.invalidate().await;
    }
}
