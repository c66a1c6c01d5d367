//! Strategy configuration.
//!
//! One configuration type per mechanism, plus [`StrategyConfig`] which tags
//! them for the registry and for loading from configuration sources.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use super::DEFAULT_EXPIRY_MARGIN;
use super::jwt::DEFAULT_JWT_TTL;
use super::strategy::StrategyKind;
use crate::{Error, Result};

/// Default REST API root used for installation token exchange.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default OAuth token endpoint.
pub const DEFAULT_OAUTH_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

fn required(mechanism: &'static str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::configuration(
            Some(mechanism),
            format!("{} must not be empty", field),
        ));
    }
    Ok(())
}

fn default_margin() -> Duration {
    DEFAULT_EXPIRY_MARGIN
}

fn default_jwt_ttl() -> Duration {
    DEFAULT_JWT_TTL
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_OAUTH_TOKEN_URL.to_string()
}

fn duration_secs<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Duration, D::Error> {
    u64::deserialize(d).map(Duration::from_secs)
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Static token configuration.
#[derive(Clone, Deserialize)]
pub struct TokenConfig {
    pub token: SecretString,
}

impl TokenConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        required("token", "token", self.token.expose_secret())
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("token", &"[redacted]")
            .finish()
    }
}

/// Username / password configuration.
#[derive(Clone, Deserialize)]
pub struct BasicConfig {
    pub username: String,
    pub password: SecretString,
}

impl BasicConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        required("basic", "username", &self.username)?;
        required("basic", "password", self.password.expose_secret())?;
        if self.username.contains(':') {
            return Err(Error::configuration(
                Some("basic"),
                "username must not contain ':'",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for BasicConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicConfig")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// OAuth application configuration.
#[derive(Clone, Deserialize)]
pub struct OAuthAppConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(
        rename = "cache_expiry_margin_secs",
        default = "default_margin",
        deserialize_with = "duration_secs"
    )]
    pub cache_expiry_margin: Duration,
}

impl OAuthAppConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            token_url: default_token_url(),
            cache_expiry_margin: DEFAULT_EXPIRY_MARGIN,
        }
    }

    /// Override the token exchange endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_cache_expiry_margin(mut self, margin: Duration) -> Self {
        self.cache_expiry_margin = margin;
        self
    }

    pub fn validate(&self) -> Result<()> {
        required("oauth-app", "client_id", &self.client_id)?;
        required("oauth-app", "client_secret", self.client_secret.expose_secret())?;
        url::Url::parse(&self.token_url).map_err(|e| {
            Error::configuration(Some("oauth-app"), format!("invalid token_url: {}", e))
        })?;
        Ok(())
    }
}

impl fmt::Debug for OAuthAppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthAppConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("token_url", &self.token_url)
            .field("cache_expiry_margin", &self.cache_expiry_margin)
            .finish()
    }
}

/// App (JWT signing) configuration.
#[derive(Clone, Deserialize)]
pub struct AppConfig {
    #[serde(deserialize_with = "string_or_number")]
    pub app_id: String,
    pub private_key: SecretString,
    #[serde(default)]
    pub installation_id: Option<u64>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(
        rename = "jwt_ttl_secs",
        default = "default_jwt_ttl",
        deserialize_with = "duration_secs"
    )]
    pub jwt_ttl: Duration,
    #[serde(
        rename = "cache_expiry_margin_secs",
        default = "default_margin",
        deserialize_with = "duration_secs"
    )]
    pub cache_expiry_margin: Duration,
}

impl AppConfig {
    pub fn new(app_id: impl ToString, private_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.to_string(),
            private_key: SecretString::from(private_key.into()),
            installation_id: None,
            base_url: default_base_url(),
            jwt_ttl: DEFAULT_JWT_TTL,
            cache_expiry_margin: DEFAULT_EXPIRY_MARGIN,
        }
    }

    /// Default installation used when a call does not name one.
    pub fn with_installation(mut self, installation_id: u64) -> Self {
        self.installation_id = Some(installation_id);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_jwt_ttl(mut self, ttl: Duration) -> Self {
        self.jwt_ttl = ttl;
        self
    }

    pub fn with_cache_expiry_margin(mut self, margin: Duration) -> Self {
        self.cache_expiry_margin = margin;
        self
    }

    pub fn validate(&self) -> Result<()> {
        required("app", "app_id", &self.app_id)?;
        required("app", "private_key", self.private_key.expose_secret())?;
        if self.jwt_ttl.is_zero() || self.jwt_ttl > DEFAULT_JWT_TTL {
            return Err(Error::configuration(
                Some("app"),
                format!(
                    "jwt_ttl must be between 1 and {} seconds",
                    DEFAULT_JWT_TTL.as_secs()
                ),
            ));
        }
        if self.cache_expiry_margin >= self.jwt_ttl {
            return Err(Error::configuration(
                Some("app"),
                "cache_expiry_margin must be shorter than jwt_ttl",
            ));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration(Some("app"), format!("invalid base_url: {}", e))
        })?;
        Ok(())
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_id", &self.app_id)
            .field("private_key", &"[redacted]")
            .field("installation_id", &self.installation_id)
            .field("base_url", &self.base_url)
            .field("jwt_ttl", &self.jwt_ttl)
            .field("cache_expiry_margin", &self.cache_expiry_margin)
            .finish()
    }
}

/// Configuration for any mechanism, tagged by `strategy`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "strategy")]
pub enum StrategyConfig {
    #[serde(rename = "token")]
    Token(TokenConfig),
    #[serde(rename = "basic")]
    Basic(BasicConfig),
    #[serde(rename = "oauth-app")]
    OAuthApp(OAuthAppConfig),
    #[serde(rename = "app")]
    App(AppConfig),
    /// Ambient credentials; nothing to configure.
    #[serde(rename = "action")]
    Action,
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::Token(_) => StrategyKind::Token,
            StrategyConfig::Basic(_) => StrategyKind::Basic,
            StrategyConfig::OAuthApp(_) => StrategyKind::OAuthApp,
            StrategyConfig::App(_) => StrategyKind::App,
            StrategyConfig::Action => StrategyKind::Action,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            StrategyConfig::Token(c) => c.validate(),
            StrategyConfig::Basic(c) => c.validate(),
            StrategyConfig::OAuthApp(c) => c.validate(),
            StrategyConfig::App(c) => c.validate(),
            StrategyConfig::Action => Ok(()),
        }
    }
}

impl From<TokenConfig> for StrategyConfig {
    fn from(config: TokenConfig) -> Self {
        StrategyConfig::Token(config)
    }
}

impl From<BasicConfig> for StrategyConfig {
    fn from(config: BasicConfig) -> Self {
        StrategyConfig::Basic(config)
    }
}

impl From<OAuthAppConfig> for StrategyConfig {
    fn from(config: OAuthAppConfig) -> Self {
        StrategyConfig::OAuthApp(config)
    }
}

impl From<AppConfig> for StrategyConfig {
    fn from(config: AppConfig) -> Self {
        StrategyConfig::App(config)
    }
}
