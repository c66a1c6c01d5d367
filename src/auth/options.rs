//! Per-call authentication options.

use std::collections::BTreeMap;

/// Explicit credential kind requested from a strategy.
///
/// Strategies that mint only one kind of credential ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthKind {
    /// The app's own identity: app JWT, or OAuth client credentials.
    App,
    /// An installation access token.
    Installation,
    /// OAuth app client credentials (`basic client_id:client_secret`).
    OAuthApp,
    /// The delegated token a strategy normally returns.
    Token,
}

/// Options accepted by `authenticate()` and `hook()`.
///
/// Values given here override the strategy's configured defaults for one call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthOptions {
    pub kind: Option<AuthKind>,
    pub installation_id: Option<u64>,
    pub repository_ids: Vec<u64>,
    pub repository_names: Vec<String>,
    pub permissions: BTreeMap<String, String>,
    /// Bypass a still-valid cached credential.
    pub refresh: bool,
}

impl AuthOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: AuthKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn installation(mut self, installation_id: u64) -> Self {
        self.installation_id = Some(installation_id);
        self
    }

    pub fn repository_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.repository_ids.extend(ids);
        self
    }

    pub fn repository_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.repository_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn permission(mut self, name: impl Into<String>, access: impl Into<String>) -> Self {
        self.permissions.insert(name.into(), access.into());
        self
    }

    pub fn refresh(mut self) -> Self {
        self.refresh = true;
        self
    }

    /// Whether any installation scoping beyond the id was requested.
    pub fn has_scope(&self) -> bool {
        !self.repository_ids.is_empty()
            || !self.repository_names.is_empty()
            || !self.permissions.is_empty()
    }
}
