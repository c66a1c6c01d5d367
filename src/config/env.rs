//! Environment Variable Configuration Provider
//!
//! Key `a.b` with prefix `FORGE_AUTH_` reads `FORGE_AUTH_A_B`.

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult};

/// Read-only environment variable configuration provider.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    prefix: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment provider with no prefix
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Create an environment provider with a prefix
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, key: &str) -> String {
        let key = key.to_uppercase().replace(['.', '-'], "_");
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, key),
            None => key,
        }
    }

    fn key_from_env(&self, env_name: &str) -> Option<String> {
        let rest = match &self.prefix {
            Some(prefix) => env_name.strip_prefix(prefix.as_str())?,
            None => env_name,
        };
        Some(rest.to_lowercase())
    }
}

#[async_trait::async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        let env_key = self.env_key(key);
        match std::env::var(&env_key) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>> {
        let env_prefix = self.env_key(prefix);
        let keys = std::env::vars()
            .filter(|(k, _)| k.starts_with(&env_prefix))
            .filter_map(|(k, _)| self.key_from_env(&k))
            .collect();
        Ok(keys)
    }
}
