//! App strategy: self-signed JWTs and installation access tokens.
//!
//! Two caches are kept. The app JWT has a single entry and is reminted
//! locally when it nears expiry. Installation tokens are keyed by
//! installation id and requested scope, and each key is exchanged
//! independently using the current JWT.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;

use super::routes::requires_app_auth;
use super::{AuthStrategy, StrategyKind};
use crate::auth::{
    AppClaims, AppConfig, AuthKind, AuthOptions, AuthRequest, AuthScheme, Clock, Credential,
    CredentialCache, CredentialKind, JwtSigner, RsaJwtSigner, TokenType,
};
use crate::transport::{HttpRequest, HttpTransport};
use crate::{Error, Result};

const MECHANISM: &str = "app";

/// Cache key for an installation token: the id plus its normalised scope.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct InstallationKey {
    installation_id: u64,
    repository_ids: Vec<u64>,
    repository_names: Vec<String>,
    permissions: Vec<(String, String)>,
}

impl InstallationKey {
    fn new(installation_id: u64, options: &AuthOptions) -> Self {
        let mut repository_ids = options.repository_ids.clone();
        repository_ids.sort_unstable();
        repository_ids.dedup();

        let mut repository_names = options.repository_names.clone();
        repository_names.sort();
        repository_names.dedup();

        Self {
            installation_id,
            repository_ids,
            repository_names,
            permissions: options
                .permissions
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    fn request_body(&self) -> Option<serde_json::Value> {
        if self.repository_ids.is_empty()
            && self.repository_names.is_empty()
            && self.permissions.is_empty()
        {
            return None;
        }

        let mut body = serde_json::Map::new();
        if !self.repository_ids.is_empty() {
            body.insert("repository_ids".into(), self.repository_ids.clone().into());
        }
        if !self.repository_names.is_empty() {
            body.insert("repositories".into(), self.repository_names.clone().into());
        }
        if !self.permissions.is_empty() {
            let permissions: serde_json::Map<String, serde_json::Value> = self
                .permissions
                .iter()
                .map(|(k, v)| (k.clone(), v.clone().into()))
                .collect();
            body.insert("permissions".into(), permissions.into());
        }
        Some(body.into())
    }
}

#[derive(Debug, Deserialize)]
struct InstallationTokenResponse {
    token: String,
    expires_at: DateTime<Utc>,
    #[serde(default)]
    permissions: BTreeMap<String, String>,
    #[serde(default)]
    repository_selection: Option<String>,
}

/// App strategy.
#[derive(Debug)]
pub struct AppStrategy {
    config: AppConfig,
    signer: Arc<dyn JwtSigner>,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    jwt_cache: CredentialCache<()>,
    installation_cache: CredentialCache<InstallationKey>,
}

impl AppStrategy {
    /// Build with the default RS256 signer. A malformed private key fails here.
    pub fn new(
        config: AppConfig,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let signer = RsaJwtSigner::from_pem(config.private_key.expose_secret())?;
        Self::with_signer(config, Arc::new(signer), transport, clock)
    }

    /// Build with a caller-supplied signer.
    pub fn with_signer(
        config: AppConfig,
        signer: Arc<dyn JwtSigner>,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let jwt_cache = CredentialCache::new(clock.clone(), config.cache_expiry_margin);
        let installation_cache = CredentialCache::new(clock.clone(), config.cache_expiry_margin);

        Ok(Self {
            config,
            signer,
            transport,
            clock,
            jwt_cache,
            installation_cache,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    pub fn installation_id(&self) -> Option<u64> {
        self.config.installation_id
    }

    fn mint_jwt(&self) -> Result<Credential> {
        let claims = AppClaims::new(
            self.config.app_id.clone(),
            self.clock.now().timestamp(),
            self.config.jwt_ttl,
        );
        let token = self.signer.sign(&claims)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| Error::authentication(MECHANISM, "JWT expiry out of range"))?;

        tracing::debug!(app_id = %self.config.app_id, exp = claims.exp, "minted app JWT");

        Ok(
            Credential::new(CredentialKind::App, AuthScheme::Bearer, token)
                .with_token_type(TokenType::App)
                .with_expiry(expires_at),
        )
    }

    async fn jwt(&self, force: bool) -> Result<Credential> {
        self.jwt_cache
            .get_or_refresh((), force, || async { self.mint_jwt() })
            .await
    }

    async fn installation_token(&self, key: InstallationKey, force: bool) -> Result<Credential> {
        self.installation_cache
            .get_or_refresh(key.clone(), force, || self.exchange(key))
            .await
    }

    async fn exchange(&self, key: InstallationKey) -> Result<Credential> {
        let jwt = self.jwt(false).await?;
        let url = format!(
            "{}/app/installations/{}/access_tokens",
            self.config.base_url.trim_end_matches('/'),
            key.installation_id
        );

        tracing::debug!(
            installation_id = key.installation_id,
            scoped = key.request_body().is_some(),
            "exchanging app JWT for installation token"
        );

        let mut request = HttpRequest::post(url)
            .header("authorization", jwt.header_value())
            .header("accept", "application/vnd.github+json");
        if let Some(body) = key.request_body() {
            request = request.json(body);
        }

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(installation_id = key.installation_id, error = %e, "installation token exchange failed");
            Error::authentication_with(MECHANISM, "installation token request failed", e)
        })?;

        if !response.is_success() {
            tracing::warn!(
                installation_id = key.installation_id,
                status = response.status,
                "installation token exchange rejected"
            );
            return Err(Error::http_status(MECHANISM, response.status, &response.body));
        }

        let body: InstallationTokenResponse = response.json().map_err(|e| {
            Error::authentication_with(MECHANISM, "invalid installation token response", e)
        })?;

        Ok(
            Credential::new(CredentialKind::Installation, AuthScheme::Token, body.token)
                .with_token_type(TokenType::Installation)
                .with_installation(key.installation_id)
                .with_expiry(body.expires_at)
                .with_permissions(body.permissions)
                .with_repository_selection(body.repository_selection),
        )
    }

    /// Request path relative to the configured API root.
    fn route<'a>(&self, path: &'a str) -> &'a str {
        let prefix = url::Url::parse(&self.config.base_url)
            .map(|u| u.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        if prefix.is_empty() {
            return path;
        }
        match path.strip_prefix(prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

#[async_trait]
impl AuthStrategy for AppStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::App
    }

    async fn authenticate(&self, options: &AuthOptions) -> Result<Credential> {
        match options.kind {
            Some(AuthKind::App) => return self.jwt(options.refresh).await,
            Some(AuthKind::OAuthApp) => {
                return Err(Error::configuration(
                    Some(MECHANISM),
                    "oauth-app credentials are not available from the app strategy",
                ));
            }
            _ => {}
        }

        match options.installation_id.or(self.config.installation_id) {
            Some(id) => {
                self.installation_token(InstallationKey::new(id, options), options.refresh)
                    .await
            }
            None if options.kind == Some(AuthKind::Installation) || options.has_scope() => {
                Err(Error::configuration(
                    Some(MECHANISM),
                    "installation token requested but no installation id is configured",
                ))
            }
            None => self.jwt(options.refresh).await,
        }
    }

    async fn hook(&self, request: &AuthRequest, options: &AuthOptions) -> Result<AuthRequest> {
        let path = request.path();
        let credential = if requires_app_auth(self.route(&path)) {
            self.jwt(false).await?
        } else {
            self.authenticate(options).await?
        };
        request.with_credential(&credential)
    }
}
