//! Basic (username / password) authentication strategy.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::ExposeSecret;

use super::{AuthStrategy, StrategyKind};
use crate::Result;
use crate::auth::{AuthOptions, AuthScheme, BasicConfig, Credential, CredentialKind};

/// Basic authentication strategy.
#[derive(Debug, Clone)]
pub struct BasicStrategy {
    username: String,
    credential: Credential,
}

impl BasicStrategy {
    /// Fails with a configuration error if either field is empty.
    pub fn new(config: BasicConfig) -> Result<Self> {
        config.validate()?;

        let encoded = encode_basic(&config.username, config.password.expose_secret());
        Ok(Self {
            username: config.username,
            credential: Credential::new(CredentialKind::Basic, AuthScheme::Basic, encoded),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

pub(crate) fn encode_basic(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}

#[async_trait]
impl AuthStrategy for BasicStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Basic
    }

    async fn authenticate(&self, _options: &AuthOptions) -> Result<Credential> {
        Ok(self.credential.clone())
    }
}
