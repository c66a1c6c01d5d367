//! Credential types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Mechanism that produced a credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialKind {
    Token,
    Basic,
    #[serde(rename = "oauth-app")]
    OAuthApp,
    App,
    Installation,
    Action,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Token => "token",
            CredentialKind::Basic => "basic",
            CredentialKind::OAuthApp => "oauth-app",
            CredentialKind::App => "app",
            CredentialKind::Installation => "installation",
            CredentialKind::Action => "action",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of token a static or ambient value appears to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenType {
    #[serde(rename = "oauth")]
    OAuth,
    Installation,
    UserToServer,
    App,
}

impl TokenType {
    /// Detect the token type from its shape.
    ///
    /// `ghs_` marks installation tokens, `ghu_` user-to-server tokens, and a
    /// three-segment dotted value an app JWT. Anything else is treated as an
    /// OAuth / personal access token.
    pub fn detect(token: &str) -> Self {
        if token.starts_with("ghs_") {
            TokenType::Installation
        } else if token.starts_with("ghu_") {
            TokenType::UserToServer
        } else if token.split('.').count() == 3 {
            TokenType::App
        } else {
            TokenType::OAuth
        }
    }

    /// Scheme the token is presented with.
    pub fn scheme(&self) -> AuthScheme {
        match self {
            TokenType::App => AuthScheme::Bearer,
            _ => AuthScheme::Token,
        }
    }
}

/// Authorization header scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    Token,
    Bearer,
    Basic,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Token => "token",
            AuthScheme::Bearer => "bearer",
            AuthScheme::Basic => "basic",
        }
    }
}

/// Authenticated request-signing material.
///
/// Immutable once built: a refresh produces a new `Credential` that replaces
/// the cached one.
#[derive(Clone)]
pub struct Credential {
    kind: CredentialKind,
    scheme: AuthScheme,
    secret: SecretString,
    expires_at: Option<DateTime<Utc>>,
    token_type: Option<TokenType>,
    installation_id: Option<u64>,
    permissions: BTreeMap<String, String>,
    repository_selection: Option<String>,
    base_url: Option<String>,
}

impl Credential {
    pub fn new(kind: CredentialKind, scheme: AuthScheme, secret: impl Into<String>) -> Self {
        Self {
            kind,
            scheme,
            secret: SecretString::from(secret.into()),
            expires_at: None,
            token_type: None,
            installation_id: None,
            permissions: BTreeMap::new(),
            repository_selection: None,
            base_url: None,
        }
    }

    pub(crate) fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub(crate) fn with_token_type(mut self, token_type: TokenType) -> Self {
        self.token_type = Some(token_type);
        self
    }

    pub(crate) fn with_installation(mut self, installation_id: u64) -> Self {
        self.installation_id = Some(installation_id);
        self
    }

    pub(crate) fn with_permissions(mut self, permissions: BTreeMap<String, String>) -> Self {
        self.permissions = permissions;
        self
    }

    pub(crate) fn with_repository_selection(mut self, selection: Option<String>) -> Self {
        self.repository_selection = selection;
        self
    }

    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Raw secret without the scheme prefix.
    pub fn secret(&self) -> &str {
        self.secret.expose_secret()
    }

    /// Value for the `Authorization` header, e.g. `token ghp_...`.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme.as_str(), self.secret.expose_secret())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn token_type(&self) -> Option<TokenType> {
        self.token_type
    }

    pub fn installation_id(&self) -> Option<u64> {
        self.installation_id
    }

    pub fn permissions(&self) -> &BTreeMap<String, String> {
        &self.permissions
    }

    pub fn repository_selection(&self) -> Option<&str> {
        self.repository_selection.as_deref()
    }

    /// API base URL supplied alongside an ambient credential.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Check if the credential has passed its expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }

    /// Check if the credential is usable for at least `margin` more.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, margin: TimeDelta) -> bool {
        match self.expires_at {
            None => true,
            Some(exp) => exp
                .checked_sub_signed(margin)
                .map(|deadline| now < deadline)
                .unwrap_or(false),
        }
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.scheme == other.scheme
            && self.secret.expose_secret() == other.secret.expose_secret()
            && self.expires_at == other.expires_at
            && self.token_type == other.token_type
            && self.installation_id == other.installation_id
            && self.permissions == other.permissions
            && self.repository_selection == other.repository_selection
            && self.base_url == other.base_url
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("scheme", &self.scheme)
            .field("secret", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .field("token_type", &self.token_type)
            .field("installation_id", &self.installation_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        let cred = Credential::new(CredentialKind::Token, AuthScheme::Token, "ghp_abc");
        assert_eq!(cred.header_value(), "token ghp_abc");
        assert_eq!(cred.secret(), "ghp_abc");

        let cred = Credential::new(CredentialKind::App, AuthScheme::Bearer, "a.b.c");
        assert_eq!(cred.header_value(), "bearer a.b.c");
    }

    #[test]
    fn test_token_type_detection() {
        assert_eq!(TokenType::detect("ghs_123"), TokenType::Installation);
        assert_eq!(TokenType::detect("ghu_123"), TokenType::UserToServer);
        assert_eq!(TokenType::detect("header.payload.sig"), TokenType::App);
        assert_eq!(TokenType::detect("ghp_123"), TokenType::OAuth);
        assert_eq!(TokenType::App.scheme(), AuthScheme::Bearer);
        assert_eq!(TokenType::OAuth.scheme(), AuthScheme::Token);
    }

    #[test]
    fn test_expiry() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let cred = Credential::new(CredentialKind::Installation, AuthScheme::Token, "ghs_x")
            .with_expiry(now + TimeDelta::seconds(3600));

        assert!(!cred.is_expired_at(now));
        assert!(cred.is_fresh_at(now, TimeDelta::seconds(60)));
        assert!(!cred.is_fresh_at(now + TimeDelta::seconds(3540), TimeDelta::seconds(60)));
        assert!(cred.is_expired_at(now + TimeDelta::seconds(3600)));
    }

    #[test]
    fn test_non_expiring() {
        let cred = Credential::new(CredentialKind::Basic, AuthScheme::Basic, "dXNlcjpwdw==");
        assert!(cred.expires_at().is_none());
        assert!(cred.is_fresh_at(DateTime::<Utc>::MAX_UTC, TimeDelta::seconds(60)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let cred = Credential::new(CredentialKind::Token, AuthScheme::Token, "ghp_secret");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(CredentialKind::OAuthApp.to_string(), "oauth-app");
        assert_eq!(CredentialKind::Installation.to_string(), "installation");
    }
}
