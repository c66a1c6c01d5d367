//! OAuth application strategy.
//!
//! Exchanges the application's client credentials for a delegated token and
//! caches it until it comes within the configured margin of expiry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use secrecy::ExposeSecret;
use serde::Deserialize;

use super::basic::encode_basic;
use super::routes::requires_client_auth;
use super::{AuthStrategy, StrategyKind};
use crate::auth::{
    AuthKind, AuthOptions, AuthRequest, AuthScheme, Clock, Credential, CredentialCache,
    CredentialKind, OAuthAppConfig, TokenType,
};
use crate::transport::{HttpRequest, HttpTransport};
use crate::{Error, Result};

const MECHANISM: &str = "oauth-app";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

/// OAuth application strategy.
#[derive(Debug)]
pub struct OAuthAppStrategy {
    config: OAuthAppConfig,
    client_credential: Credential,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    cache: CredentialCache<()>,
}

impl OAuthAppStrategy {
    pub fn new(
        config: OAuthAppConfig,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let client_credential = Credential::new(
            CredentialKind::OAuthApp,
            AuthScheme::Basic,
            encode_basic(&config.client_id, config.client_secret.expose_secret()),
        );
        let cache = CredentialCache::new(clock.clone(), config.cache_expiry_margin);

        Ok(Self {
            config,
            client_credential,
            transport,
            clock,
            cache,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    /// The application's own identity, sent as basic auth.
    pub fn client_credential(&self) -> &Credential {
        &self.client_credential
    }

    async fn exchange(&self) -> Result<Credential> {
        tracing::debug!(
            client_id = %self.config.client_id,
            token_url = %self.config.token_url,
            "exchanging OAuth client credentials"
        );

        let request = HttpRequest::post(&self.config.token_url)
            .header("accept", "application/json")
            .json(serde_json::json!({
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret.expose_secret(),
                "grant_type": "client_credentials",
            }));

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(error = %e, "OAuth token exchange failed");
            Error::authentication_with(MECHANISM, "token exchange request failed", e)
        })?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "OAuth token exchange rejected");
            return Err(Error::http_status(MECHANISM, response.status, &response.body));
        }

        let body: TokenResponse = response.json().map_err(|e| {
            Error::authentication_with(MECHANISM, "invalid token exchange response", e)
        })?;

        if let Some(error) = body.error {
            tracing::warn!(%error, "OAuth token exchange returned an error");
            let message = match body.error_description {
                Some(description) => format!("{}: {}", error, description),
                None => error,
            };
            return Err(Error::authentication(MECHANISM, message));
        }

        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::authentication(MECHANISM, "response has no access_token"))?;

        let mut credential = Credential::new(CredentialKind::OAuthApp, AuthScheme::Token, &token)
            .with_token_type(TokenType::detect(&token));
        if let Some(secs) = body.expires_in {
            let expires_at = TimeDelta::try_seconds(secs)
                .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
                .ok_or_else(|| Error::authentication(MECHANISM, "expires_in out of range"))?;
            credential = credential.with_expiry(expires_at);
        }
        Ok(credential)
    }
}

#[async_trait]
impl AuthStrategy for OAuthAppStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::OAuthApp
    }

    async fn authenticate(&self, options: &AuthOptions) -> Result<Credential> {
        if matches!(options.kind, Some(AuthKind::OAuthApp | AuthKind::App)) {
            return Ok(self.client_credential.clone());
        }
        self.cache
            .get_or_refresh((), options.refresh, || self.exchange())
            .await
    }

    async fn hook(&self, request: &AuthRequest, options: &AuthOptions) -> Result<AuthRequest> {
        if requires_client_auth(&request.path()) {
            return request.with_credential(&self.client_credential);
        }
        let credential = self.authenticate(options).await?;
        request.with_credential(&credential)
    }
}
