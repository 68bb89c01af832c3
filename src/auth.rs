//! Refresh-token authentication for the Dropbox API.

use std::fmt;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::{DropboxError, Result};
use crate::models::TokenResponse;

/// Dropbox OAuth2 token endpoint.
const TOKEN_URI: &str = "https://api.dropbox.com/oauth2/token";

/// Long-lived app credentials, supplied once at start-up.
#[derive(Clone)]
pub struct Credentials {
    app_key: String,
    app_secret: String,
    refresh_token: String,
}

impl Credentials {
    /// Create credentials, rejecting absent or blank values.
    ///
    /// Each value is paired with the name of the setting it came from so
    /// the error can say which one is missing.
    pub fn new(
        app_key: Option<String>,
        app_secret: Option<String>,
        refresh_token: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            app_key: required("DROPBOX_APP_KEY", app_key)?,
            app_secret: required("DROPBOX_APP_SECRET", app_secret)?,
            refresh_token: required("DROPBOX_REFRESH_TOKEN", refresh_token)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

fn required(name: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(DropboxError::MissingConfiguration(name.to_string())),
    }
}

/// Short-lived bearer token. Never persisted or logged.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchanges the refresh token for an access token.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Credentials,
    client: Client,
    token_uri: String,
}

impl Authenticator {
    /// Create a new authenticator against the production token endpoint.
    pub fn new(credentials: Credentials, client: Client) -> Self {
        Self::with_token_uri(credentials, client, TOKEN_URI)
    }

    /// Create a new authenticator against a custom token endpoint.
    pub fn with_token_uri(
        credentials: Credentials,
        client: Client,
        token_uri: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            client,
            token_uri: token_uri.into(),
        }
    }

    /// Fetch a fresh access token.
    ///
    /// One token is fetched per run; there is no caching and no retry.
    #[instrument(skip(self), fields(app_key = %self.credentials.app_key))]
    pub async fn get_access_token(&self) -> Result<AccessToken> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.credentials.refresh_token.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_uri)
            .basic_auth(&self.credentials.app_key, Some(&self.credentials.app_secret))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DropboxError::AuthenticationFailed {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let token_response: TokenResponse = serde_json::from_str(&body)?;
        debug!(
            expires_in = ?token_response.expires_in,
            "Obtained access token"
        );

        Ok(AccessToken::new(token_response.access_token))
    }
}
