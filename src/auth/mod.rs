//! Authentication module.
//!
//! Provides multiple authentication strategies behind one facade:
//! - **Token**: static token via `Authorization: token ...`
//! - **Basic**: username and password via `Authorization: basic ...`
//! - **OAuth app**: client credentials exchanged for a delegated token
//! - **App**: RS256-signed app JWT and per-installation access tokens
//! - **Action**: ambient token from the CI environment

mod authenticator;
mod cache;
mod clock;
mod config;
mod credential;
mod jwt;
mod options;
mod request;
mod strategy;

pub use authenticator::{AuthDeps, Authenticator};
pub use cache::{CredentialCache, DEFAULT_EXPIRY_MARGIN};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    AppConfig, BasicConfig, DEFAULT_API_BASE_URL, DEFAULT_OAUTH_TOKEN_URL, OAuthAppConfig,
    StrategyConfig, TokenConfig,
};
pub use credential::{AuthScheme, Credential, CredentialKind, TokenType};
pub use jwt::{AppClaims, DEFAULT_JWT_TTL, JwtSigner, RsaJwtSigner};
pub use options::{AuthKind, AuthOptions};
pub use request::AuthRequest;
pub use strategy::{
    ActionStrategy, AppStrategy, AuthStrategy, BasicStrategy, EnvSource, MapEnv,
    OAuthAppStrategy, ProcessEnv, StrategyKind, TokenStrategy, requires_app_auth,
    requires_client_auth,
};
