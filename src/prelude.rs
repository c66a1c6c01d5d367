//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits
//! for authenticating forge API requests.
//!
//! # Usage
//!
//! ```rust
//! use forge_auth::prelude::*;
//! ```

// Core types
pub use crate::Error;
pub use crate::Result;

// Facade
pub use crate::Authenticator;
pub use crate::{AuthOptions, AuthRequest};

// Credentials
pub use crate::{Credential, CredentialKind};

// Strategy configuration
pub use crate::{AppConfig, BasicConfig, OAuthAppConfig, StrategyConfig, TokenConfig};

// Strategies
pub use crate::{AuthStrategy, StrategyKind};

// Injectables
pub use crate::{Clock, EnvSource, HttpTransport, JwtSigner};
