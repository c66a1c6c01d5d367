//! Ambient credentials provided by a CI workflow runner.

use std::sync::Arc;

use async_trait::async_trait;

use super::env::{env_opt, env_with_fallbacks};
use super::{AuthStrategy, EnvSource, ProcessEnv, StrategyKind};
use crate::auth::{AuthOptions, Credential, CredentialKind, TokenType};
use crate::{Error, Result};

const MECHANISM: &str = "action";

const TOKEN_VARS: &[&str] = &["INPUT_GITHUB_TOKEN", "INPUT_TOKEN", "GITHUB_TOKEN"];
const API_URL_VAR: &str = "GITHUB_API_URL";

/// Reads the workflow token and API URL from the environment on every call.
#[derive(Debug, Clone)]
pub struct ActionStrategy {
    env: Arc<dyn EnvSource>,
}

impl Default for ActionStrategy {
    fn default() -> Self {
        Self::new(Arc::new(ProcessEnv))
    }
}

impl ActionStrategy {
    pub fn new(env: Arc<dyn EnvSource>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl AuthStrategy for ActionStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Action
    }

    async fn authenticate(&self, _options: &AuthOptions) -> Result<Credential> {
        let env = self.env.as_ref();

        if env_opt(env, "INPUT_GITHUB_TOKEN").is_some() && env_opt(env, "INPUT_TOKEN").is_some() {
            return Err(Error::configuration(
                Some(MECHANISM),
                "both INPUT_GITHUB_TOKEN and INPUT_TOKEN are set; use only one",
            ));
        }

        let token = env_with_fallbacks(env, TOKEN_VARS);
        let base_url = env_opt(env, API_URL_VAR);
        let (Some(token), Some(base_url)) = (token, base_url) else {
            return Err(Error::configuration(
                Some(MECHANISM),
                "missing ambient credentials: expected GITHUB_TOKEN and GITHUB_API_URL",
            ));
        };

        let token = token.trim().to_string();
        let token_type = TokenType::detect(&token);
        tracing::debug!(?token_type, %base_url, "using ambient workflow token");

        Ok(
            Credential::new(CredentialKind::Action, token_type.scheme(), token)
                .with_token_type(token_type)
                .with_base_url(base_url),
        )
    }
}
