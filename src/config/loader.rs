//! Building a [`StrategyConfig`] from a configuration source.

use std::time::Duration;

use super::{ConfigError, ConfigProvider, ConfigProviderExt, ConfigResult};
use crate::Result;
use crate::auth::{
    AppConfig, BasicConfig, OAuthAppConfig, StrategyConfig, StrategyKind, TokenConfig,
};

async fn optional(provider: &dyn ConfigProvider, key: &str) -> ConfigResult<Option<String>> {
    Ok(provider
        .get_raw(key)
        .await?
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

async fn required(provider: &dyn ConfigProvider, key: &str) -> ConfigResult<String> {
    optional(provider, key)
        .await?
        .ok_or_else(|| ConfigError::NotFound {
            key: key.to_string(),
        })
}

async fn seconds(provider: &dyn ConfigProvider, key: &str) -> ConfigResult<Option<Duration>> {
    Ok(provider.parse::<u64>(key).await?.map(Duration::from_secs))
}

/// Inline `private_key`, or the contents of `private_key_path`.
async fn private_key(provider: &dyn ConfigProvider) -> ConfigResult<String> {
    if let Some(key) = optional(provider, "private_key").await? {
        return Ok(key);
    }

    let path = optional(provider, "private_key_path")
        .await?
        .ok_or_else(|| ConfigError::NotFound {
            key: "private_key".to_string(),
        })?;
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ConfigError::InvalidValue {
            key: "private_key_path".to_string(),
            message: format!("{}: {}", path, e),
        })
}

impl StrategyConfig {
    /// Read the `strategy` key and the settings of the mechanism it names.
    ///
    /// Values are read as plain strings so environment variables, memory
    /// maps and JSON files are interchangeable. The result is validated
    /// before it is returned.
    pub async fn load(provider: &dyn ConfigProvider) -> Result<Self> {
        let kind: StrategyKind = required(provider, "strategy").await?.parse()?;

        let config: StrategyConfig = match kind {
            StrategyKind::Token => TokenConfig::new(required(provider, "token").await?).into(),
            StrategyKind::Basic => BasicConfig::new(
                required(provider, "username").await?,
                required(provider, "password").await?,
            )
            .into(),
            StrategyKind::OAuthApp => {
                let mut config = OAuthAppConfig::new(
                    required(provider, "client_id").await?,
                    required(provider, "client_secret").await?,
                );
                if let Some(url) = optional(provider, "token_url").await? {
                    config = config.with_token_url(url);
                }
                if let Some(margin) = seconds(provider, "cache_expiry_margin_secs").await? {
                    config = config.with_cache_expiry_margin(margin);
                }
                config.into()
            }
            StrategyKind::App => {
                let mut config =
                    AppConfig::new(required(provider, "app_id").await?, private_key(provider).await?);
                if let Some(id) = provider.parse::<u64>("installation_id").await? {
                    config = config.with_installation(id);
                }
                if let Some(url) = optional(provider, "base_url").await? {
                    config = config.with_base_url(url);
                }
                if let Some(ttl) = seconds(provider, "jwt_ttl_secs").await? {
                    config = config.with_jwt_ttl(ttl);
                }
                if let Some(margin) = seconds(provider, "cache_expiry_margin_secs").await? {
                    config = config.with_cache_expiry_margin(margin);
                }
                config.into()
            }
            StrategyKind::Action => StrategyConfig::Action,
        };

        config.validate()?;
        tracing::debug!(provider = provider.name(), strategy = %kind, "loaded strategy configuration");
        Ok(config)
    }
}
