//! Network configuration for proxy, certificate and timeout settings.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::TransportError;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("forge-auth/", env!("CARGO_PKG_VERSION"));
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Network configuration for the default transport.
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    /// Proxy configuration
    pub proxy: Option<ProxyConfig>,
    /// Custom CA certificate file path
    pub ca_cert: Option<PathBuf>,
    /// Whole-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            ca_cert: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Proxy server configuration.
#[derive(Clone, Debug, Default)]
pub struct ProxyConfig {
    /// HTTPS proxy URL
    pub https: Option<String>,
    /// HTTP proxy URL
    pub http: Option<String>,
    /// Hosts that bypass the proxy
    pub no_proxy: Vec<String>,
}

impl NetworkConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self {
            proxy: ProxyConfig::from_env(),
            ca_cert: env::var("SSL_CERT_FILE").ok().map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Check if anything beyond the defaults is set.
    pub fn is_configured(&self) -> bool {
        self.proxy.is_some() || self.ca_cert.is_some()
    }

    /// Apply configuration to a reqwest `ClientBuilder`.
    pub async fn apply_to_builder(
        &self,
        mut builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder, TransportError> {
        builder = builder
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str());

        if let Some(ref proxy) = self.proxy {
            builder = proxy.apply_to_builder(builder)?;
        }

        if let Some(ref ca_path) = self.ca_cert {
            let cert_data = tokio::fs::read(ca_path).await.map_err(|e| {
                TransportError::Setup(format!("reading {}: {}", ca_path.display(), e))
            })?;
            let cert = reqwest::Certificate::from_pem(&cert_data).map_err(|e| {
                TransportError::Setup(format!("invalid CA certificate {}: {}", ca_path.display(), e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        Ok(builder)
    }
}

impl ProxyConfig {
    /// Create from `HTTPS_PROXY` / `HTTP_PROXY` / `NO_PROXY`.
    pub fn from_env() -> Option<Self> {
        let https = env::var("HTTPS_PROXY")
            .ok()
            .or_else(|| env::var("https_proxy").ok());
        let http = env::var("HTTP_PROXY")
            .ok()
            .or_else(|| env::var("http_proxy").ok());

        if https.is_none() && http.is_none() {
            return None;
        }

        let no_proxy = env::var("NO_PROXY")
            .ok()
            .or_else(|| env::var("no_proxy").ok())
            .map(|s| parse_no_proxy(&s))
            .unwrap_or_default();

        Some(Self {
            https,
            http,
            no_proxy,
        })
    }

    pub fn https(url: impl Into<String>) -> Self {
        Self {
            https: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn http(mut self, url: impl Into<String>) -> Self {
        self.http = Some(url.into());
        self
    }

    pub fn no_proxy(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.no_proxy.extend(patterns);
        self
    }

    fn apply_to_builder(
        &self,
        mut builder: reqwest::ClientBuilder,
    ) -> Result<reqwest::ClientBuilder, TransportError> {
        let no_proxy = reqwest::NoProxy::from_string(&self.no_proxy.join(","));

        if let Some(ref url) = self.https {
            let proxy = reqwest::Proxy::https(url)
                .map_err(|e| TransportError::Setup(format!("invalid HTTPS proxy: {}", e)))?;
            builder = builder.proxy(proxy.no_proxy(no_proxy.clone()));
        }
        if let Some(ref url) = self.http {
            let proxy = reqwest::Proxy::http(url)
                .map_err(|e| TransportError::Setup(format!("invalid HTTP proxy: {}", e)))?;
            builder = builder.proxy(proxy.no_proxy(no_proxy));
        }
        Ok(builder)
    }
}

fn parse_no_proxy(value: &str) -> Vec<String> {
    value
        .split([',', ' '])
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NetworkConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.user_agent.starts_with("forge-auth/"));
    }

    #[test]
    fn test_builder() {
        let config = NetworkConfig::default()
            .proxy(ProxyConfig::https("http://proxy:8080").http("http://proxy:8081"))
            .ca_cert("/etc/ssl/custom.pem")
            .timeout(Duration::from_secs(5));

        assert!(config.is_configured());
        let proxy = config.proxy.as_ref().unwrap();
        assert_eq!(proxy.https.as_deref(), Some("http://proxy:8080"));
        assert_eq!(proxy.http.as_deref(), Some("http://proxy:8081"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_no_proxy() {
        assert_eq!(
            parse_no_proxy("localhost, 127.0.0.1 .internal"),
            vec!["localhost", "127.0.0.1", ".internal"]
        );
        assert!(parse_no_proxy("  ").is_empty());
    }

    #[tokio::test]
    async fn test_missing_ca_cert_is_setup_error() {
        let config = NetworkConfig::default().ca_cert("/nonexistent/forge-auth-ca.pem");
        let result = config.apply_to_builder(reqwest::Client::builder()).await;
        assert!(matches!(result, Err(TransportError::Setup(_))));
    }

    #[tokio::test]
    async fn test_apply_proxy() {
        let config = NetworkConfig::default().proxy(
            ProxyConfig::https("http://proxy.local:3128").no_proxy(vec!["localhost".to_string()]),
        );
        let builder = config
            .apply_to_builder(reqwest::Client::builder())
            .await
            .unwrap();
        assert!(builder.build().is_ok());
    }
}
