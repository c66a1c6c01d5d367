//! Authentication strategy trait.

use std::fmt::Debug;

use async_trait::async_trait;

use super::StrategyKind;
use crate::Result;
use crate::auth::{AuthOptions, AuthRequest, Credential};

/// Authentication strategy interface.
///
/// `authenticate()` returns a cached credential while it stays valid and
/// mints a new one otherwise. Implementations never retry internally and
/// never fall back to a stale credential after a failed refresh.
#[async_trait]
pub trait AuthStrategy: Send + Sync + Debug {
    /// Mechanism this strategy implements.
    fn kind(&self) -> StrategyKind;

    /// Returns the strategy name for logging/debugging.
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Produce a credential valid for at least the strategy's expiry margin.
    async fn authenticate(&self, options: &AuthOptions) -> Result<Credential>;

    /// Return a copy of `request` with the `Authorization` header set.
    async fn hook(&self, request: &AuthRequest, options: &AuthOptions) -> Result<AuthRequest> {
        let credential = self.authenticate(options).await?;
        request.with_credential(&credential)
    }
}
