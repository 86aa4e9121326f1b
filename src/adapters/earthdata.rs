//! Earthdata session for granule downloads
//!
//! Builds the HTTP client used for transfers and attaches credentials to
//! each download request: HTTP basic credentials when a username and
//! password are configured, and the CMR token as `Echo-Token`.

use crate::config::{EarthdataConfig, SecretString};
use crate::domain::{Result, SyncError};
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, RequestBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("granule-sync/", env!("CARGO_PKG_VERSION"));

/// Header carrying the CMR token on downloads
pub const ECHO_TOKEN_HEADER: &str = "Echo-Token";

/// Authenticated HTTP session for granule downloads
#[derive(Clone)]
pub struct EarthdataSession {
    client: Client,
    username: Option<String>,
    password: Option<SecretString>,
    token: Option<SecretString>,
}

impl EarthdataSession {
    /// Create a session
    ///
    /// `timeout` bounds each transfer request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &EarthdataConfig,
        token: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        if config.username.is_none() {
            tracing::debug!("No Earthdata username configured, downloading anonymously");
        }

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
            token: token.filter(|t| !t.expose_secret().is_empty()),
        })
    }

    /// The underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Build an authenticated GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.get(url))
    }

    /// Attach the session credentials to a request
    pub fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(auth) = self.auth_header_value() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        if let Some(token) = &self.token {
            request = request.header(ECHO_TOKEN_HEADER, token.expose_secret().as_ref());
        }
        request
    }

    /// Build the basic authorization header value
    fn auth_header_value(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                let credentials = format!("{username}:{}", password.expose_secret().as_ref());
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(format!("Basic {encoded}"))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for EarthdataSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EarthdataSession")
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .field("has_token", &self.token.is_some())
            .finish()
    }
}
