//! # forge-auth
//!
//! Pluggable request authentication for forge API clients.
//!
//! Every mechanism is exposed through the same [`Authenticator`] facade, so a
//! generic HTTP client can accept any of them interchangeably:
//!
//! - **Token**: a static personal access / OAuth / installation token
//! - **Basic**: username and password
//! - **OAuth app**: client id + secret exchanged for a delegated token
//! - **App**: self-signed RS256 JWT, optionally exchanged for installation tokens
//! - **Action**: ambient token provided by the CI execution environment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use forge_auth::{AuthOptions, AuthRequest, Authenticator, TokenConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), forge_auth::Error> {
//!     let auth = Authenticator::token(TokenConfig::new("ghp_example"))?;
//!
//!     let credential = auth.authenticate(AuthOptions::default()).await?;
//!     println!("{}", credential.kind());
//!
//!     let request = AuthRequest::get("https://api.github.com/user");
//!     let signed = auth.hook(&request, None).await?;
//!     assert!(signed.authorization().is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## App installations
//!
//! ```rust,no_run
//! use forge_auth::{AppConfig, AuthOptions, Authenticator};
//!
//! # async fn example(pem: String) -> Result<(), forge_auth::Error> {
//! let auth = Authenticator::app(AppConfig::new(12345, pem).with_installation(678))?;
//!
//! // Installation token for the configured installation.
//! let token = auth.authenticate(AuthOptions::default()).await?;
//!
//! // Same authenticator, another installation: cached independently.
//! let other = auth.authenticate(AuthOptions::new().installation(910)).await?;
//! # let _ = (token, other);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod config;
pub mod prelude;
pub mod transport;

pub use auth::{
    ActionStrategy, AppClaims, AppConfig, AppStrategy, AuthDeps, AuthKind, AuthOptions,
    AuthRequest, AuthScheme, AuthStrategy, Authenticator, BasicConfig, BasicStrategy, Clock,
    Credential, CredentialCache, CredentialKind, EnvSource, JwtSigner, ManualClock, MapEnv,
    OAuthAppConfig, OAuthAppStrategy, ProcessEnv, RsaJwtSigner, StrategyConfig, StrategyKind,
    SystemClock, TokenConfig, TokenStrategy, TokenType,
};
pub use config::{
    CompositeConfigProvider, ConfigError, ConfigProvider, ConfigProviderExt, EnvConfigProvider,
    FileConfigProvider, MemoryConfigProvider,
};
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, NetworkConfig, ProxyConfig, ReqwestTransport,
    TransportError,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for forge-auth operations.
///
/// There are two kinds callers need to distinguish: configuration problems,
/// which only a fix to the supplied settings can resolve, and authentication
/// failures raised while minting or exchanging a credential.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid caller-supplied configuration.
    #[error("{}configuration error: {message}", mechanism.map(|m| format!("[{m}] ")).unwrap_or_default())]
    Configuration {
        mechanism: Option<&'static str>,
        message: String,
    },

    /// Minting, signing, or exchanging a credential failed.
    #[error("[{mechanism}] authentication failed: {message}")]
    Authentication {
        mechanism: &'static str,
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Not retryable without changing configuration
    Configuration,
    /// Upstream exchange failed; the caller may retry
    Authentication,
}

impl Error {
    pub fn configuration(mechanism: Option<&'static str>, message: impl Into<String>) -> Self {
        Error::Configuration {
            mechanism,
            message: message.into(),
        }
    }

    pub fn authentication(mechanism: &'static str, message: impl Into<String>) -> Self {
        Error::Authentication {
            mechanism,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Authentication failure chaining the upstream cause.
    pub fn authentication_with(
        mechanism: &'static str,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::Authentication {
            mechanism,
            message: message.into(),
            status: None,
            source: Some(source.into()),
        }
    }

    /// Authentication failure caused by an unsuccessful HTTP status.
    pub fn http_status(mechanism: &'static str, status: u16, body: &str) -> Self {
        let detail = body.trim();
        let message = if detail.is_empty() {
            format!("exchange endpoint returned HTTP {status}")
        } else {
            format!(
                "exchange endpoint returned HTTP {status}: {}",
                truncate(detail, 200)
            )
        };
        Error::Authentication {
            mechanism,
            message,
            status: Some(status),
            source: None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Configuration { .. } => ErrorCategory::Configuration,
            Error::Authentication { .. } => ErrorCategory::Authentication,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_authentication_error(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }

    /// Mechanism that raised the error, when known.
    pub fn mechanism(&self) -> Option<&'static str> {
        match self {
            Error::Configuration { mechanism, .. } => *mechanism,
            Error::Authentication { mechanism, .. } => Some(mechanism),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. } => *status,
            Error::Configuration { .. } => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401))
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound { key } => {
                Error::configuration(None, format!("key not found: {}", key))
            }
            config::ConfigError::InvalidValue { key, message } => {
                Error::configuration(None, format!("invalid value for {}: {}", key, message))
            }
            other => Error::configuration(None, other.to_string()),
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pub type Result<T> = std::result::Result<T, Error>;
