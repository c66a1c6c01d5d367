//! The facade callers interact with.

use std::sync::Arc;

use super::{
    ActionStrategy, AppConfig, AppStrategy, AuthOptions, AuthRequest, AuthStrategy, BasicConfig,
    BasicStrategy, Clock, Credential, EnvSource, JwtSigner, OAuthAppConfig, OAuthAppStrategy,
    ProcessEnv, StrategyConfig, StrategyKind, SystemClock, TokenConfig, TokenStrategy,
};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::{Error, Result};

/// Optional injectables shared by the constructors.
///
/// Anything left unset falls back to the real implementation: a default
/// `reqwest` transport, the system clock, the process environment, and an
/// RS256 signer built from the configured private key.
#[derive(Clone, Debug, Default)]
pub struct AuthDeps {
    pub transport: Option<Arc<dyn HttpTransport>>,
    pub clock: Option<Arc<dyn Clock>>,
    pub env: Option<Arc<dyn EnvSource>>,
    pub signer: Option<Arc<dyn JwtSigner>>,
}

impl AuthDeps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.env = Some(env);
        self
    }

    pub fn signer(mut self, signer: Arc<dyn JwtSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    fn resolve_transport(&self) -> Result<Arc<dyn HttpTransport>> {
        match self.transport {
            Some(ref transport) => Ok(transport.clone()),
            None => {
                let transport = ReqwestTransport::new().map_err(|e| {
                    Error::configuration(None, format!("failed to build HTTP client: {}", e))
                })?;
                Ok(Arc::new(transport))
            }
        }
    }

    fn resolve_clock(&self) -> Arc<dyn Clock> {
        self.clock.clone().unwrap_or_else(|| Arc::new(SystemClock))
    }

    fn resolve_env(&self) -> Arc<dyn EnvSource> {
        self.env.clone().unwrap_or_else(|| Arc::new(ProcessEnv))
    }
}

/// Uniform `authenticate` / `hook` surface over any strategy.
///
/// Cloning is cheap and clones share the strategy, including its cache.
#[derive(Clone, Debug)]
pub struct Authenticator {
    strategy: Arc<dyn AuthStrategy>,
}

impl Authenticator {
    /// Build the strategy named by `config`.
    pub fn from_config(config: StrategyConfig, deps: AuthDeps) -> Result<Self> {
        let kind = config.kind();
        tracing::debug!(strategy = %kind, "building authenticator");

        let strategy: Arc<dyn AuthStrategy> = match config {
            StrategyConfig::Token(config) => Arc::new(TokenStrategy::new(config)?),
            StrategyConfig::Basic(config) => Arc::new(BasicStrategy::new(config)?),
            StrategyConfig::OAuthApp(config) => Arc::new(OAuthAppStrategy::new(
                config,
                deps.resolve_transport()?,
                deps.resolve_clock(),
            )?),
            StrategyConfig::App(config) => {
                let transport = deps.resolve_transport()?;
                let clock = deps.resolve_clock();
                let strategy = match deps.signer {
                    Some(ref signer) => {
                        AppStrategy::with_signer(config, signer.clone(), transport, clock)?
                    }
                    None => AppStrategy::new(config, transport, clock)?,
                };
                Arc::new(strategy)
            }
            StrategyConfig::Action => Arc::new(ActionStrategy::new(deps.resolve_env())),
        };

        Ok(Self { strategy })
    }

    /// Wrap an already-built strategy.
    pub fn from_strategy(strategy: impl AuthStrategy + 'static) -> Self {
        Self {
            strategy: Arc::new(strategy),
        }
    }

    pub fn token(config: TokenConfig) -> Result<Self> {
        Self::from_config(config.into(), AuthDeps::default())
    }

    pub fn basic(config: BasicConfig) -> Result<Self> {
        Self::from_config(config.into(), AuthDeps::default())
    }

    pub fn oauth_app(config: OAuthAppConfig) -> Result<Self> {
        Self::from_config(config.into(), AuthDeps::default())
    }

    pub fn app(config: AppConfig) -> Result<Self> {
        Self::from_config(config.into(), AuthDeps::default())
    }

    pub fn action() -> Result<Self> {
        Self::from_config(StrategyConfig::Action, AuthDeps::default())
    }

    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn strategy(&self) -> &dyn AuthStrategy {
        self.strategy.as_ref()
    }

    /// Current valid credential, minting or exchanging one if needed.
    pub async fn authenticate(&self, options: AuthOptions) -> Result<Credential> {
        self.strategy.authenticate(&options).await
    }

    /// Copy of `request` with the `Authorization` header set.
    pub async fn hook(
        &self,
        request: &AuthRequest,
        options: Option<AuthOptions>,
    ) -> Result<AuthRequest> {
        let options = options.unwrap_or_default();
        self.strategy.hook(request, &options).await
    }
}
