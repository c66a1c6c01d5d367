//! Static token authentication strategy.

use async_trait::async_trait;
use secrecy::ExposeSecret;

use super::{AuthStrategy, StrategyKind};
use crate::Result;
use crate::auth::{AuthOptions, Credential, CredentialKind, TokenConfig, TokenType};

/// Static token strategy.
///
/// The configured value is the credential; it never expires and no I/O is
/// ever performed.
#[derive(Debug, Clone)]
pub struct TokenStrategy {
    credential: Credential,
}

impl TokenStrategy {
    pub fn new(config: TokenConfig) -> Result<Self> {
        config.validate()?;

        let token = strip_scheme(config.token.expose_secret());
        let token_type = TokenType::detect(token);
        let credential = Credential::new(CredentialKind::Token, token_type.scheme(), token)
            .with_token_type(token_type);

        Ok(Self { credential })
    }

    pub fn token_type(&self) -> TokenType {
        self.credential.token_type().unwrap_or(TokenType::OAuth)
    }
}

/// Drop a leading `token ` / `bearer ` the caller may have pasted along.
fn strip_scheme(token: &str) -> &str {
    let trimmed = token.trim();
    for scheme in ["token ", "bearer "] {
        if trimmed.len() > scheme.len()
            && trimmed.is_char_boundary(scheme.len())
            && trimmed[..scheme.len()].eq_ignore_ascii_case(scheme)
        {
            return trimmed[scheme.len()..].trim_start();
        }
    }
    trimmed
}

#[async_trait]
impl AuthStrategy for TokenStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Token
    }

    async fn authenticate(&self, _options: &AuthOptions) -> Result<Credential> {
        Ok(self.credential.clone())
    }
}
