//! Pluggable configuration sources for strategy settings.
//!
//! ```rust,no_run
//! use forge_auth::config::ConfigBuilder;
//! use forge_auth::{AuthDeps, Authenticator, StrategyConfig};
//!
//! # async fn example() -> Result<(), forge_auth::Error> {
//! let config = ConfigBuilder::new()
//!     .env_with_prefix("FORGE_AUTH_")
//!     .file("forge-auth.json")
//!     .build();
//!
//! let strategy = StrategyConfig::load(&config).await?;
//! let auth = Authenticator::from_config(strategy, AuthDeps::default())?;
//! # let _ = auth;
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod file;
mod loader;
pub mod memory;
pub mod provider;

pub use composite::CompositeConfigProvider;
pub use env::EnvConfigProvider;
pub use file::FileConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};

use thiserror::Error;

/// Errors that can occur in configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key not found
    #[error("Key not found: {key}")]
    NotFound {
        /// The key that was not found
        key: String,
    },

    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// Provider error
    #[error("Provider error: {message}")]
    Provider {
        /// Error message
        message: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Configuration builder for fluent API
#[derive(Default)]
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add environment variable provider
    pub fn env(mut self) -> Self {
        self.providers.push(Box::new(EnvConfigProvider::new()));
        self
    }

    /// Add environment variable provider with prefix
    pub fn env_with_prefix(mut self, prefix: &str) -> Self {
        self.providers
            .push(Box::new(EnvConfigProvider::prefixed(prefix)));
        self
    }

    /// Add JSON file provider
    pub fn file(mut self, path: impl AsRef<std::path::Path>) -> Self {
        self.providers.push(Box::new(FileConfigProvider::new(
            path.as_ref().to_path_buf(),
        )));
        self
    }

    pub fn memory(mut self, provider: MemoryConfigProvider) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Add a custom provider
    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Chain the providers; earlier ones take priority.
    pub fn build(self) -> CompositeConfigProvider {
        self.providers
            .into_iter()
            .fold(CompositeConfigProvider::new(), |composite, provider| {
                composite.provider(provider)
            })
    }
}

impl std::fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("providers", &self.providers.len())
            .finish()
    }
}
